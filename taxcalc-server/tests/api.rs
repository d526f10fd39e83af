//! End-to-end tests of the REST surface over the seeded in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use taxcalc_core::calculations::ThresholdTiers;
use taxcalc_core::db::{InMemoryEmployeeProfiles, InMemoryRateRepository, InMemoryTransactionSource};
use taxcalc_core::{EmployeeProfile, SupplyKind, TaxEngine, TransactionKind, VatTransaction};
use taxcalc_server::{AppState, router};
use tower::ServiceExt;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ledger() -> Vec<VatTransaction> {
    vec![
        VatTransaction {
            date: date(2024, 4, 10),
            kind: TransactionKind::Income,
            amount: 1_000_000,
            vat_rate: 2000,
            supply: SupplyKind::Domestic,
        },
        VatTransaction {
            date: date(2024, 5, 2),
            kind: TransactionKind::Expense,
            amount: 250_000,
            vat_rate: 2000,
            supply: SupplyKind::Domestic,
        },
    ]
}

async fn test_app() -> Router {
    let profiles = InMemoryEmployeeProfiles::new().with_profile(
        "E042",
        EmployeeProfile {
            personal_allowance: Some(0),
            ni_exempt: true,
        },
    );
    let engine = TaxEngine::new(
        Arc::new(InMemoryRateRepository::seeded().await.unwrap()),
        Arc::new(profiles),
        Arc::new(InMemoryTransactionSource::new(ledger())),
        ThresholdTiers::default(),
    );
    router(AppState::new(engine))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

fn rate_id(rates: &Value, category: &str, name: &str, rate_type: &str) -> i64 {
    rates["rates"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["category"] == category && r["name"] == name && r["rateType"] == rate_type)
        .and_then(|r| r["id"].as_i64())
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_app().await;

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn lists_known_and_available_years() {
    let app = test_app().await;

    let (status, body) = get(&app, "/tax-rates/years").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "taxYears": ["2024-25"], "availableYears": ["2025-26"] })
    );
}

#[tokio::test]
async fn lists_rates_for_year() {
    let app = test_app().await;

    let (status, body) = get(&app, "/tax-rates?taxYear=2024-25").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rates"].as_array().unwrap().len(), 24);

    let id = rate_id(&body, "income_tax", "personal_allowance", "threshold");
    let (status, rate) = get(&app, &format!("/tax-rates/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rate["value"], 1_257_000);
    assert_eq!(rate["taxYear"], "2024-25");
    assert_eq!(rate["effectiveFrom"], "2024-04-06");
}

#[tokio::test]
async fn unknown_year_and_id_are_not_found() {
    let app = test_app().await;

    let (status, body) = get(&app, "/tax-rates?taxYear=2030-31").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);

    let (status, _) = get(&app, "/tax-rates/999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_tax_year_is_rejected() {
    let app = test_app().await;

    let (status, body) = get(&app, "/tax-rates?taxYear=2024-26").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn malformed_input_uses_error_body() {
    let app = test_app().await;

    let (status, body) = get(&app, "/tax-rates/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    let (status, body) = get(&app, "/vat/threshold-status?asOf=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    // Missing required field
    let (status, body) = post(&app, "/income-tax/calculate", json!({ "taxYear": "2024-25" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    let request = Request::builder()
        .method("POST")
        .uri("/corporation-tax/calculate")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn rate_edit_changes_next_calculation() {
    let app = test_app().await;
    let (_, rates) = get(&app, "/tax-rates?taxYear=2024-25").await;
    let id = rate_id(&rates, "corporation_tax", "main", "rate");

    let uri = format!("/tax-rates/{id}");
    let (status, updated) = send(&app, "PUT", &uri, Some(json!({ "value": 3000 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["value"], 3000);

    let (status, result) = post(
        &app,
        "/corporation-tax/calculate",
        json!({ "profit": 30_000_000, "taxYear": "2024-25" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["tax"], 9_000_000);
    assert_eq!(result["regime"], "main");
}

#[tokio::test]
async fn out_of_range_rate_is_bad_request() {
    let app = test_app().await;
    let (_, rates) = get(&app, "/tax-rates?taxYear=2024-25").await;
    let id = rate_id(&rates, "vat", "standard", "rate");

    let uri = format!("/tax-rates/{id}");
    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "value": 10_001 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, rate) = get(&app, &format!("/tax-rates/{id}")).await;
    assert_eq!(rate["value"], 2000);
}

#[tokio::test]
async fn copy_year_creates_rows_then_conflicts() {
    let app = test_app().await;
    let body = json!({
        "fromYear": "2024-25",
        "toYear": "2025-26",
        "effectiveFrom": "2025-04-06",
        "effectiveTo": "2026-04-05",
    });

    let (status, rows) = post(&app, "/tax-rates/copy-year", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 24);
    assert!(rows.iter().all(|r| r["taxYear"] == "2025-26"));

    let (status, _) = post(&app, "/tax-rates/copy-year", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn copy_year_with_inverted_dates_is_bad_request() {
    let app = test_app().await;

    let (status, _) = post(
        &app,
        "/tax-rates/copy-year",
        json!({
            "fromYear": "2024-25",
            "toYear": "2025-26",
            "effectiveFrom": "2026-04-05",
            "effectiveTo": "2025-04-06",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_next_year_defaults_to_latest() {
    let app = test_app().await;

    let (status, rows) = post(&app, "/tax-rates/years", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rows[0]["taxYear"], "2025-26");
    assert_eq!(rows[0]["effectiveFrom"], "2025-04-06");

    let (_, years) = get(&app, "/tax-rates/years").await;
    assert_eq!(years["taxYears"], json!(["2025-26", "2024-25"]));
    assert_eq!(years["availableYears"], json!(["2026-27"]));
}

#[tokio::test]
async fn payroll_contract() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/payroll/calculate",
        json!({ "employeeId": "E001", "grossPay": 6_000_000, "taxYear": "2024-25" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "grossPay": 6_000_000,
            "incomeTax": 1_143_200,
            "employeeNI": 321_060,
            "employerNI": 702_420,
            "netPay": 4_535_740,
        })
    );
}

#[tokio::test]
async fn payroll_with_unrepresentable_pay_is_bad_request() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/payroll/calculate",
        json!({
            "employeeId": "E001",
            "grossPay": i64::MAX / 10,
            "frequency": "weekly",
            "taxYear": "2024-25",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn payroll_uses_employee_profile() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/payroll/calculate",
        json!({
            "employeeId": "E042",
            "grossPay": 3_000_000,
            "taxYear": "2024-25",
            "taxCode": "employee_profile",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["incomeTax"], 600_000);
    assert_eq!(body["employeeNI"], 0);
    assert_eq!(body["netPay"], 2_400_000);

    let (status, _) = post(
        &app,
        "/payroll/calculate",
        json!({
            "employeeId": "E404",
            "grossPay": 3_000_000,
            "taxYear": "2024-25",
            "taxCode": "employee_profile",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn income_tax_breakdown_and_errors() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/income-tax/calculate",
        json!({ "income": 6_000_000, "taxYear": "2024-25" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1_143_200);
    assert_eq!(body["personalAllowance"], 1_257_000);
    assert_eq!(body["bands"].as_array().unwrap().len(), 2);

    let (status, _) = post(
        &app,
        "/income-tax/calculate",
        json!({ "income": -1, "taxYear": "2024-25" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/income-tax/calculate",
        json!({ "income": 100, "taxYear": "2030-31" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn national_insurance_per_period() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/national-insurance/calculate",
        json!({ "pay": 300_000, "frequency": "monthly", "taxYear": "2024-25" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employeeNI"], 15_620);
    assert_eq!(body["employerNI"], 30_935);
}

#[tokio::test]
async fn corporation_tax_marginal_relief() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/corporation-tax/calculate",
        json!({ "profit": 10_000_000, "taxYear": "2024-25" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["regime"], "marginal_relief");
    assert_eq!(body["marginalRelief"], 225_000);
    assert_eq!(body["tax"], 2_275_000);
}

#[tokio::test]
async fn vat_return_from_ledger() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/vat/returns",
        json!({ "periodStart": "2024-04-01", "periodEnd": "2024-06-30" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "box1": 200_000,
            "box2": 0,
            "box3": 200_000,
            "box4": 50_000,
            "box5": 150_000,
            "box6": 1_000_000,
            "box7": 250_000,
            "box8": 0,
            "box9": 0,
            "periodStart": "2024-04-01",
            "periodEnd": "2024-06-30",
            "status": "draft",
        })
    );
}

#[tokio::test]
async fn vat_return_from_supplied_transactions() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/vat/returns",
        json!({
            "periodStart": "2024-04-01",
            "periodEnd": "2024-06-30",
            "transactions": [
                { "date": "2024-05-01", "type": "income", "amount": 1_000_000, "vatRate": 2000 },
                { "date": "2024-05-03", "type": "expense", "amount": 250_000, "vatRate": 2000 },
                { "date": "2024-05-04", "type": "expense", "amount": 1_000_000, "vatRate": 2000 },
            ],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["box5"], -50_000);

    let (status, _) = post(
        &app,
        "/vat/returns",
        json!({ "periodStart": "2024-06-30", "periodEnd": "2024-04-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn threshold_status_contract() {
    let app = test_app().await;

    let (status, body) = get(
        &app,
        "/vat/threshold-status?taxYear=2024-25&asOf=2024-06-30&turnover=8100000",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "turnover": { "rolling12Month": 8_100_000 },
            "threshold": { "registrationAmount": 9_000_000 },
            "warning": { "level": "approaching", "remainingUntilThreshold": 900_000 },
        })
    );
}

#[tokio::test]
async fn threshold_status_defaults_to_ledger_turnover() {
    let app = test_app().await;

    let (status, body) = get(&app, "/vat/threshold-status?asOf=2024-06-30").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turnover"]["rolling12Month"], 1_000_000);
    assert_eq!(body["warning"]["level"], "ok");
}

#[tokio::test]
async fn dashboard_summary_contract() {
    let app = test_app().await;

    let (status, body) = get(&app, "/vat/dashboard-summary?from=2024-04-01&to=2024-06-30").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "outputVat": 200_000, "inputVat": 50_000, "vatBalance": 150_000 })
    );
}
