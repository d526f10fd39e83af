use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{NewTaxRate, RATE_SCALE, RateKey, RateType, TaxRate, TaxYear};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Tax year {0} has no rates")]
    TaxYearNotFound(TaxYear),

    #[error("Tax year {0} already exists")]
    DuplicateTaxYear(TaxYear),

    #[error("Rate {key} already exists for {tax_year}")]
    DuplicateRate { key: RateKey, tax_year: TaxYear },

    #[error("Invalid rate value: {0}")]
    InvalidRateValue(String),

    #[error("Effective from {from} must be before effective to {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// The versioned tax-rate store. The only mutator of rate rows.
///
/// Multi-row writes (`insert_rates`, `copy_year`) are all-or-nothing, and
/// `update_rate_value` never exposes a half-written row.
#[async_trait]
pub trait RateRepository: Send + Sync {
    /// Every row for the year, in key order.
    async fn get_rates(&self, tax_year: TaxYear) -> Result<Vec<TaxRate>, RepositoryError>;

    async fn get_rate(&self, tax_year: TaxYear, key: RateKey) -> Result<TaxRate, RepositoryError>;

    async fn get_rate_by_id(&self, id: i64) -> Result<TaxRate, RepositoryError>;

    async fn update_rate_value(&self, id: i64, value: i64) -> Result<TaxRate, RepositoryError>;

    /// Clone every row of `from` into `to` with new effective dates.
    async fn copy_year(
        &self,
        from: TaxYear,
        to: TaxYear,
        effective_from: NaiveDate,
        effective_to: NaiveDate,
    ) -> Result<Vec<TaxRate>, RepositoryError>;

    /// Distinct years present, most recent first.
    async fn list_tax_years(&self) -> Result<Vec<TaxYear>, RepositoryError>;

    async fn insert_rates(&self, rates: &[NewTaxRate]) -> Result<Vec<TaxRate>, RepositoryError>;
}

/// Range check applied on every write path.
///
/// Thresholds are non-negative pence; rates lie in `[0, 10000]`.
pub fn validate_rate_value(key: RateKey, value: i64) -> Result<(), RepositoryError> {
    match key.rate_type() {
        RateType::Threshold if value < 0 => Err(RepositoryError::InvalidRateValue(format!(
            "{key}: threshold {value} must not be negative"
        ))),
        RateType::Rate if !(0..=RATE_SCALE).contains(&value) => {
            Err(RepositoryError::InvalidRateValue(format!(
                "{key}: rate {value} must be between 0 and {RATE_SCALE}"
            )))
        }
        _ => Ok(()),
    }
}

pub fn validate_effective_dates(from: NaiveDate, to: NaiveDate) -> Result<(), RepositoryError> {
    if from < to {
        Ok(())
    } else {
        Err(RepositoryError::InvalidDateRange { from, to })
    }
}

/// Checks a batch before it is inserted: every value in range, every date
/// span valid, and no key repeated within one year.
pub fn validate_new_rates(rates: &[NewTaxRate]) -> Result<(), RepositoryError> {
    let mut seen = std::collections::HashSet::new();

    for rate in rates {
        validate_rate_value(rate.key, rate.value)?;
        validate_effective_dates(rate.effective_from, rate.effective_to)?;

        if !seen.insert((rate.tax_year, rate.key)) {
            return Err(RepositoryError::DuplicateRate {
                key: rate.key,
                tax_year: rate.tax_year,
            });
        }
    }

    Ok(())
}
