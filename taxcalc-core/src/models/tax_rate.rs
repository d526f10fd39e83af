use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rate_key::{RateKey, RateType, TaxCategory};
use super::tax_year::TaxYear;

/// Fixed-point scale of a `rate` row: 2000 is 20.00%.
pub const RATE_SCALE: i64 = 10_000;

/// One row of the versioned rate table.
///
/// `value` is integer pence for thresholds and percentage × 100 for rates.
/// Only `value` may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TaxRateRecord", try_from = "TaxRateRecord")]
pub struct TaxRate {
    pub id: i64,
    pub key: RateKey,
    pub value: i64,
    pub tax_year: TaxYear,
    pub effective_from: NaiveDate,
    pub effective_to: NaiveDate,
}

/// For inserting rows (no id yet)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaxRate {
    pub key: RateKey,
    pub value: i64,
    pub tax_year: TaxYear,
    pub effective_from: NaiveDate,
    pub effective_to: NaiveDate,
}

impl TaxRate {
    pub fn category(&self) -> TaxCategory {
        self.key.category()
    }

    pub fn rate_type(&self) -> RateType {
        self.key.rate_type()
    }
}

impl From<&TaxRate> for NewTaxRate {
    fn from(rate: &TaxRate) -> Self {
        NewTaxRate {
            key: rate.key,
            value: rate.value,
            tax_year: rate.tax_year,
            effective_from: rate.effective_from,
            effective_to: rate.effective_to,
        }
    }
}

/// Wire form of [`TaxRate`]: the key flattened to its string triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaxRateRecord {
    id: i64,
    category: TaxCategory,
    name: String,
    rate_type: RateType,
    value: i64,
    tax_year: TaxYear,
    effective_from: NaiveDate,
    effective_to: NaiveDate,
}

impl From<TaxRate> for TaxRateRecord {
    fn from(rate: TaxRate) -> Self {
        TaxRateRecord {
            id: rate.id,
            category: rate.key.category(),
            name: rate.key.name().to_string(),
            rate_type: rate.key.rate_type(),
            value: rate.value,
            tax_year: rate.tax_year,
            effective_from: rate.effective_from,
            effective_to: rate.effective_to,
        }
    }
}

impl TryFrom<TaxRateRecord> for TaxRate {
    type Error = String;

    fn try_from(record: TaxRateRecord) -> Result<Self, Self::Error> {
        let key = RateKey::parse(record.category, &record.name, record.rate_type).ok_or_else(
            || {
                format!(
                    "unknown rate {}/{}/{}",
                    record.category.as_str(),
                    record.name,
                    record.rate_type.as_str()
                )
            },
        )?;

        Ok(TaxRate {
            id: record.id,
            key,
            value: record.value,
            tax_year: record.tax_year,
            effective_from: record.effective_from,
            effective_to: record.effective_to,
        })
    }
}
