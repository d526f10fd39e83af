use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use taxcalc_core::{NewTaxRate, RateKey, RateRepository, RepositoryError, TaxYear};
use thiserror::Error;

/// Errors that can occur when loading tax rate data.
#[derive(Debug, Error)]
pub enum TaxRateLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Line {line}: unknown tax year '{value}'")]
    InvalidTaxYear { line: usize, value: String },

    #[error("Line {line}: unknown rate {category}/{name}/{rate_type}")]
    UnknownRate {
        line: usize,
        category: String,
        name: String,
        rate_type: String,
    },

    #[error("Line {line}: value {value} is not a whole number of pence or basis points")]
    InvalidValue { line: usize, value: Decimal },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxRateLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxRateLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a tax rates CSV file.
///
/// - `tax_year`: e.g. `2025-26`
/// - `category`, `name`, `rate_type`: the rate's identity
/// - `value`: pounds for thresholds (`12570.00`), percent for rates (`20`)
/// - `effective_from`, `effective_to`: optional; default to the tax year's
///   6 April and 5 April
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxRateRecord {
    pub tax_year: String,
    pub category: String,
    pub name: String,
    pub rate_type: String,
    pub value: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub effective_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub effective_to: Option<NaiveDate>,
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl TaxRateRecord {
    /// Convert to an insertable row. `line` is the 1-based data line,
    /// used in error messages.
    pub fn to_new_rate(&self, line: usize) -> Result<NewTaxRate, TaxRateLoaderError> {
        let tax_year: TaxYear =
            self.tax_year
                .parse()
                .map_err(|_| TaxRateLoaderError::InvalidTaxYear {
                    line,
                    value: self.tax_year.clone(),
                })?;

        let key = RateKey::parse_str(&self.category, &self.name, &self.rate_type).ok_or_else(
            || TaxRateLoaderError::UnknownRate {
                line,
                category: self.category.clone(),
                name: self.name.clone(),
                rate_type: self.rate_type.clone(),
            },
        )?;

        // Pounds to pence and percent to percent × 100 are both × 100.
        let scaled = self.value * Decimal::ONE_HUNDRED;
        let value = scaled
            .fract()
            .is_zero()
            .then(|| scaled.to_i64())
            .flatten()
            .ok_or(TaxRateLoaderError::InvalidValue {
                line,
                value: self.value,
            })?;

        Ok(NewTaxRate {
            key,
            value,
            tax_year,
            effective_from: self.effective_from.unwrap_or_else(|| tax_year.start_date()),
            effective_to: self.effective_to.unwrap_or_else(|| tax_year.end_date()),
        })
    }
}

/// Loader for tax rate data from CSV files.
///
/// Records are inserted through the [`RateRepository`] trait, so any
/// backend works. A file is loaded as one batch: either every row is
/// inserted or none are.
pub struct TaxRateLoader;

impl TaxRateLoader {
    /// Parse tax rate records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxRateRecord>, TaxRateLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxRateRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate every record, then insert them in a single batch.
    ///
    /// Returns the number of rows inserted.
    pub async fn load<R: RateRepository + ?Sized>(
        repo: &R,
        records: &[TaxRateRecord],
    ) -> Result<usize, TaxRateLoaderError> {
        let rates = records
            .iter()
            .enumerate()
            .map(|(i, record)| record.to_new_rate(i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let inserted = repo.insert_rates(&rates).await?;
        tracing::info!(rows = inserted.len(), "loaded tax rates");
        Ok(inserted.len())
    }
}
