use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{RateKey, TaxYear};

/// Errors raised before any calculation output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("no rates found for tax year {0}")]
    TaxYearNotFound(TaxYear),

    #[error("rate {key} is missing for tax year {tax_year}")]
    MissingRate { key: RateKey, tax_year: TaxYear },

    #[error("income must not be negative, got {0}")]
    NegativeIncome(i64),

    #[error("turnover must not be negative, got {0}")]
    NegativeTurnover(i64),

    #[error("amount is too large to calculate with")]
    AmountOutOfRange,

    #[error("employee '{0}' has no tax profile")]
    UnknownEmployee(String),

    #[error("period start {start} is after period end {end}")]
    InvalidPeriod {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CalculationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TaxYearNotFound(year) => CalculationError::TaxYearNotFound(year),
            other => CalculationError::Repository(other),
        }
    }
}
