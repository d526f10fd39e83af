//! The REST surface. Money is integer pence, rates are percent × 100, and
//! every body is camelCase JSON. A missing `taxYear` means the year
//! containing today.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use taxcalc_core::calculations::{
    CorporationTaxResult, IncomeTaxResult, NationalInsuranceResult, ThresholdStatus, VatReturn,
    VatSummary,
};
use taxcalc_core::{
    PayFrequency, PayrollCalculationResult, PayrollRequest, RepositoryError, TaxCodeBasis, TaxRate,
    TaxYear, VatTransaction,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiResult;
use crate::extract::{extract_json, extract_path, extract_query};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tax-rates", get(list_rates))
        .route("/tax-rates/years", get(list_years).post(create_year))
        .route("/tax-rates/copy-year", post(copy_year))
        .route("/tax-rates/{id}", get(get_rate).put(update_rate))
        .route("/payroll/calculate", post(calculate_payroll))
        .route("/income-tax/calculate", post(calculate_income_tax))
        .route("/national-insurance/calculate", post(calculate_national_insurance))
        .route("/corporation-tax/calculate", post(calculate_corporation_tax))
        .route("/vat/returns", post(create_vat_return))
        .route("/vat/threshold-status", get(threshold_status))
        .route("/vat/dashboard-summary", get(dashboard_summary))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn year_or_current(tax_year: Option<TaxYear>) -> TaxYear {
    tax_year.unwrap_or_else(|| TaxYear::from_date(today()))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── rate administration ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaxYearQuery {
    tax_year: Option<TaxYear>,
}

#[derive(Debug, Serialize)]
struct RatesResponse {
    rates: Vec<TaxRate>,
}

async fn list_rates(
    State(state): State<AppState>,
    query: Result<Query<TaxYearQuery>, QueryRejection>,
) -> ApiResult<Json<RatesResponse>> {
    let query = extract_query(query)?;
    let rates = state
        .engine
        .rates()
        .get_rates(year_or_current(query.tax_year))
        .await?;
    Ok(Json(RatesResponse { rates }))
}

async fn get_rate(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<TaxRate>> {
    let id = extract_path(id)?;
    Ok(Json(state.engine.rates().get_rate_by_id(id).await?))
}

#[derive(Debug, Deserialize)]
struct UpdateRateBody {
    value: i64,
}

async fn update_rate(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateRateBody>, JsonRejection>,
) -> ApiResult<Json<TaxRate>> {
    let id = extract_path(id)?;
    let body = extract_json(body)?;
    Ok(Json(
        state
            .engine
            .rates()
            .update_rate_value(id, body.value)
            .await?,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YearsResponse {
    tax_years: Vec<TaxYear>,
    available_years: Vec<TaxYear>,
}

async fn list_years(State(state): State<AppState>) -> ApiResult<Json<YearsResponse>> {
    let years = state.engine.years();
    Ok(Json(YearsResponse {
        tax_years: years.known_years().await?,
        available_years: years.available_years(today()).await?,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateYearBody {
    from_year: Option<TaxYear>,
    to_year: Option<TaxYear>,
}

/// Copies `fromYear` (default: latest) into `toYear` (default: the year
/// after `fromYear`).
async fn create_year(
    State(state): State<AppState>,
    body: Result<Json<CreateYearBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<TaxRate>>)> {
    let body = extract_json(body)?;
    let years = state.engine.years();
    let rows = match (body.from_year, body.to_year) {
        (None, None) => years.create_next_year().await?,
        (from, to) => {
            let from = match from {
                Some(from) => from,
                None => years
                    .known_years()
                    .await?
                    .first()
                    .copied()
                    .ok_or(RepositoryError::NotFound)?,
            };
            let to = to.unwrap_or_else(|| from.next());
            years.create_year(from, to, None, None).await?
        }
    };
    Ok((StatusCode::CREATED, Json(rows)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopyYearBody {
    from_year: TaxYear,
    to_year: TaxYear,
    effective_from: Option<NaiveDate>,
    effective_to: Option<NaiveDate>,
}

async fn copy_year(
    State(state): State<AppState>,
    body: Result<Json<CopyYearBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<TaxRate>>)> {
    let body = extract_json(body)?;
    let rows = state
        .engine
        .years()
        .create_year(
            body.from_year,
            body.to_year,
            body.effective_from,
            body.effective_to,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(rows)))
}

// ── calculations ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayrollBody {
    employee_id: String,
    gross_pay: i64,
    #[serde(default)]
    bonus: i64,
    tax_year: Option<TaxYear>,
    #[serde(default)]
    frequency: PayFrequency,
    #[serde(default)]
    tax_code: TaxCodeBasis,
}

async fn calculate_payroll(
    State(state): State<AppState>,
    body: Result<Json<PayrollBody>, JsonRejection>,
) -> ApiResult<Json<PayrollCalculationResult>> {
    let body = extract_json(body)?;
    let request = PayrollRequest {
        employee_id: body.employee_id,
        gross_pay: body.gross_pay,
        bonus: body.bonus,
        tax_year: year_or_current(body.tax_year),
        frequency: body.frequency,
        tax_code: body.tax_code,
    };
    Ok(Json(state.engine.payroll(&request).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeTaxBody {
    income: i64,
    tax_year: Option<TaxYear>,
}

async fn calculate_income_tax(
    State(state): State<AppState>,
    body: Result<Json<IncomeTaxBody>, JsonRejection>,
) -> ApiResult<Json<IncomeTaxResult>> {
    let body = extract_json(body)?;
    let result = state
        .engine
        .income_tax(body.income, year_or_current(body.tax_year))
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NationalInsuranceBody {
    pay: i64,
    #[serde(default)]
    frequency: PayFrequency,
    tax_year: Option<TaxYear>,
}

async fn calculate_national_insurance(
    State(state): State<AppState>,
    body: Result<Json<NationalInsuranceBody>, JsonRejection>,
) -> ApiResult<Json<NationalInsuranceResult>> {
    let body = extract_json(body)?;
    let result = state
        .engine
        .national_insurance(body.pay, body.frequency, year_or_current(body.tax_year))
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorporationTaxBody {
    profit: i64,
    #[serde(default)]
    associated_companies: u32,
    tax_year: Option<TaxYear>,
}

async fn calculate_corporation_tax(
    State(state): State<AppState>,
    body: Result<Json<CorporationTaxBody>, JsonRejection>,
) -> ApiResult<Json<CorporationTaxResult>> {
    let body = extract_json(body)?;
    let result = state
        .engine
        .corporation_tax(
            body.profit,
            body.associated_companies,
            year_or_current(body.tax_year),
        )
        .await?;
    Ok(Json(result))
}

// ── VAT ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VatReturnBody {
    period_start: NaiveDate,
    period_end: NaiveDate,
    /// Read from the ledger feed when absent.
    transactions: Option<Vec<VatTransaction>>,
}

async fn create_vat_return(
    State(state): State<AppState>,
    body: Result<Json<VatReturnBody>, JsonRejection>,
) -> ApiResult<Json<VatReturn>> {
    let body = extract_json(body)?;
    let vat_return = state
        .engine
        .vat_return(body.period_start, body.period_end, body.transactions)
        .await?;
    Ok(Json(vat_return))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThresholdQuery {
    tax_year: Option<TaxYear>,
    as_of: Option<NaiveDate>,
    turnover: Option<i64>,
}

async fn threshold_status(
    State(state): State<AppState>,
    query: Result<Query<ThresholdQuery>, QueryRejection>,
) -> ApiResult<Json<ThresholdStatus>> {
    let query = extract_query(query)?;
    let as_of = query.as_of.unwrap_or_else(today);
    let tax_year = query
        .tax_year
        .unwrap_or_else(|| TaxYear::from_date(as_of));
    let status = state
        .engine
        .vat_threshold_status(tax_year, as_of, query.turnover)
        .await?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

/// Defaults to the current tax year.
async fn dashboard_summary(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> ApiResult<Json<VatSummary>> {
    let query = extract_query(query)?;
    let current = TaxYear::from_date(today());
    let from = query.from.unwrap_or_else(|| current.start_date());
    let to = query.to.unwrap_or_else(|| current.end_date());
    Ok(Json(state.engine.vat_summary(from, to).await?))
}
