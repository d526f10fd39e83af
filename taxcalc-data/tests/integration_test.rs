//! Integration tests for rate loading and the CSV ledger feed using the
//! SQLite backend.

use std::path::Path;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sqlx::sqlite::SqlitePoolOptions;
use taxcalc_core::calculations::{
    IncomeTaxCalculator, NationalInsuranceCalculator, RateSnapshot, VatEngine,
};
use taxcalc_core::db::TransactionSource;
use taxcalc_core::{
    NationalInsuranceKey, PayFrequency, RateKey, RateRepository, RepositoryError, TaxYear,
};
use taxcalc_data::{CsvTransactionSource, TaxRateLoader, TaxRateLoaderError, parse_transactions};
use taxcalc_db_sqlite::SqliteRateRepository;

const RATES_2025_26: &str = include_str!("../test-data/rates_2025_26.csv");
const TRANSACTIONS: &str = include_str!("../test-data/transactions.csv");

const YEAR_2024: TaxYear = TaxYear::new(2024);
const YEAR_2025: TaxYear = TaxYear::new(2025);

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Migrated and seeded with the built-in 2024-25 table.
async fn setup_test_db() -> SqliteRateRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRateRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    let seeds = Path::new(env!("CARGO_MANIFEST_DIR")).join("../taxcalc-db-sqlite/seeds");
    repo.run_seeds(&seeds).await.expect("Failed to run seeds");

    repo
}

#[tokio::test]
async fn test_load_full_2025_26_table() {
    let repo = setup_test_db().await;

    let records = TaxRateLoader::parse(RATES_2025_26.as_bytes()).expect("Failed to parse CSV");
    let inserted = TaxRateLoader::load(&repo, &records)
        .await
        .expect("Failed to load rates");

    assert_eq!(inserted, 24);
    assert_eq!(repo.get_rates(YEAR_2025).await.unwrap().len(), 24);
    assert_eq!(
        repo.list_tax_years().await.unwrap(),
        vec![YEAR_2025, YEAR_2024]
    );
}

#[tokio::test]
async fn test_loaded_values_are_in_canonical_units() {
    let repo = setup_test_db().await;
    let records = TaxRateLoader::parse(RATES_2025_26.as_bytes()).unwrap();
    TaxRateLoader::load(&repo, &records).await.unwrap();

    let employer = repo
        .get_rate(
            YEAR_2025,
            RateKey::NationalInsurance(NationalInsuranceKey::Employer),
        )
        .await
        .unwrap();
    assert_eq!(employer.value, 1500);
    assert_eq!(employer.effective_from, date(2025, 4, 6));
    assert_eq!(employer.effective_to, date(2026, 4, 5));

    let secondary = repo
        .get_rate(
            YEAR_2025,
            RateKey::NationalInsurance(NationalInsuranceKey::SecondaryThreshold),
        )
        .await
        .unwrap();
    assert_eq!(secondary.value, 500_000);
}

#[tokio::test]
async fn test_calculators_use_loaded_year() {
    let repo = setup_test_db().await;
    let records = TaxRateLoader::parse(RATES_2025_26.as_bytes()).unwrap();
    TaxRateLoader::load(&repo, &records).await.unwrap();

    let snapshot = RateSnapshot::load(&repo, YEAR_2025).await.unwrap();

    let income_tax = IncomeTaxCalculator::new(&snapshot)
        .calculate(6_000_000)
        .unwrap();
    assert_eq!(income_tax.total, 1_143_200);

    // 15% of (60,000 - 5,000).
    let ni = NationalInsuranceCalculator::new(&snapshot)
        .calculate(6_000_000, PayFrequency::Annual)
        .unwrap();
    assert_eq!(ni.employer_ni, 825_000);
}

#[tokio::test]
async fn test_reloading_same_file_inserts_nothing() {
    let repo = setup_test_db().await;
    let records = TaxRateLoader::parse(RATES_2025_26.as_bytes()).unwrap();
    TaxRateLoader::load(&repo, &records).await.unwrap();

    let result = TaxRateLoader::load(&repo, &records).await;

    assert!(matches!(
        result,
        Err(TaxRateLoaderError::Repository(
            RepositoryError::DuplicateRate { .. }
        ))
    ));
    assert_eq!(repo.get_rates(YEAR_2025).await.unwrap().len(), 24);
}

#[tokio::test]
async fn test_batch_with_one_existing_row_is_rejected_whole() {
    let repo = setup_test_db().await;
    let csv = "\
tax_year,category,name,rate_type,value,effective_from,effective_to
2026-27,vat,standard,rate,20,,
2024-25,vat,standard,rate,20,,
";
    let records = TaxRateLoader::parse(csv.as_bytes()).unwrap();

    let result = TaxRateLoader::load(&repo, &records).await;

    assert!(result.is_err());
    assert_eq!(repo.list_tax_years().await.unwrap(), vec![YEAR_2024]);
}

#[tokio::test]
async fn test_invalid_row_fails_before_touching_database() {
    let repo = setup_test_db().await;
    let csv = "\
tax_year,category,name,rate_type,value,effective_from,effective_to
2025-26,vat,standard,rate,20,,
2025-26,vat,luxury,rate,25,,
";
    let records = TaxRateLoader::parse(csv.as_bytes()).unwrap();

    let result = TaxRateLoader::load(&repo, &records).await;

    assert!(matches!(
        result,
        Err(TaxRateLoaderError::UnknownRate { line: 2, .. })
    ));
    assert!(matches!(
        repo.get_rates(YEAR_2025).await,
        Err(RepositoryError::TaxYearNotFound(_))
    ));
}

#[tokio::test]
async fn test_rate_over_100_percent_is_rejected() {
    let repo = setup_test_db().await;
    let csv = "\
tax_year,category,name,rate_type,value,effective_from,effective_to
2025-26,vat,standard,rate,120,,
";
    let records = TaxRateLoader::parse(csv.as_bytes()).unwrap();

    let result = TaxRateLoader::load(&repo, &records).await;

    assert!(matches!(
        result,
        Err(TaxRateLoaderError::Repository(
            RepositoryError::InvalidRateValue(_)
        ))
    ));
}

#[test]
fn test_transactions_fixture_builds_first_quarter_return() {
    let transactions = parse_transactions(TRANSACTIONS.as_bytes()).expect("Failed to parse CSV");
    assert_eq!(transactions.len(), 5);

    let vat_return = VatEngine::new(&transactions)
        .create_return(date(2024, 4, 1), date(2024, 6, 30))
        .unwrap();
    let boxes = vat_return.boxes;

    assert_eq!(boxes.box1(), 200_000);
    assert_eq!(boxes.box2(), 20_000);
    assert_eq!(boxes.box3(), 220_000);
    assert_eq!(boxes.box4(), 70_000);
    assert_eq!(boxes.box5(), 150_000);
    assert_eq!(boxes.box6(), 1_400_000);
    assert_eq!(boxes.box7(), 350_000);
    assert_eq!(boxes.box8(), 400_000);
    assert_eq!(boxes.box9(), 100_000);
}

#[tokio::test]
async fn test_csv_source_filters_inclusively() {
    let source = CsvTransactionSource::new(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data/transactions.csv"),
    );

    let may = source
        .transactions_between(date(2024, 5, 2), date(2024, 5, 20))
        .await
        .unwrap();
    assert_eq!(may.len(), 2);

    let all = source
        .transactions_between(date(2024, 1, 1), date(2024, 12, 31))
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
}
