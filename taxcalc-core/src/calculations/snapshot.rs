use std::collections::HashMap;

use super::error::CalculationError;
use crate::db::RateRepository;
use crate::models::{RateKey, TaxRate, TaxYear};

/// Every rate row for one tax year, read in a single repository call.
///
/// Calculators borrow a snapshot, so all rows a calculation touches come
/// from the same read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSnapshot {
    tax_year: TaxYear,
    values: HashMap<RateKey, i64>,
}

impl RateSnapshot {
    /// Build from rows already loaded. Rows from other years are ignored.
    pub fn from_rates(tax_year: TaxYear, rates: &[TaxRate]) -> Self {
        let values = rates
            .iter()
            .filter(|r| r.tax_year == tax_year)
            .map(|r| (r.key, r.value))
            .collect();
        Self { tax_year, values }
    }

    /// Build from bare `(key, value)` pairs, e.g. for what-if calculations.
    pub fn from_values(
        tax_year: TaxYear,
        values: impl IntoIterator<Item = (RateKey, i64)>,
    ) -> Self {
        Self {
            tax_year,
            values: values.into_iter().collect(),
        }
    }

    /// Load the year from `repo`.
    ///
    /// # Errors
    /// [`CalculationError::TaxYearNotFound`] if the year was never seeded.
    pub async fn load(
        repo: &dyn RateRepository,
        tax_year: TaxYear,
    ) -> Result<Self, CalculationError> {
        let rates = repo.get_rates(tax_year).await?;
        if rates.is_empty() {
            return Err(CalculationError::TaxYearNotFound(tax_year));
        }
        tracing::debug!(%tax_year, rows = rates.len(), "loaded rate snapshot");
        Ok(Self::from_rates(tax_year, &rates))
    }

    pub fn tax_year(&self) -> TaxYear {
        self.tax_year
    }

    pub fn get(&self, key: RateKey) -> Option<i64> {
        self.values.get(&key).copied()
    }

    pub fn require(&self, key: RateKey) -> Result<i64, CalculationError> {
        self.get(key).ok_or(CalculationError::MissingRate {
            key,
            tax_year: self.tax_year,
        })
    }
}

#[cfg(test)]
pub(crate) fn seeded_snapshot() -> RateSnapshot {
    RateSnapshot::from_values(crate::seed::SEED_TAX_YEAR, crate::seed::uk_2024_25())
}
