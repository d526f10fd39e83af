//! Income Tax on annual income.
//!
//! The calculation runs in three steps:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Personal allowance, tapered by £1 for every £2 above the taper threshold |
//! | 2    | Taxable income = income − allowance, minimum 0 |
//! | 3    | Each band's slice of taxable income × band rate, rounded per slice |
//!
//! Band lower bounds are read from the `income_tax` threshold rows and
//! measured in taxable income, so a band's upper bound is the next band's
//! start. The top band is unbounded, as is any band whose successors have
//! no threshold row.
//!
//! # Example
//!
//! ```
//! use taxcalc_core::calculations::{IncomeTaxCalculator, RateSnapshot};
//! use taxcalc_core::seed::{uk_2024_25, SEED_TAX_YEAR};
//!
//! let rates = RateSnapshot::from_values(SEED_TAX_YEAR, uk_2024_25());
//! let calculator = IncomeTaxCalculator::new(&rates);
//!
//! // £60,000
//! let result = calculator.calculate(6_000_000).unwrap();
//! assert_eq!(result.total, 1_143_200);
//! ```

use serde::{Deserialize, Serialize};

use super::common::{apply_rate, slice_between};
use super::error::CalculationError;
use super::snapshot::RateSnapshot;
use crate::models::{IncomeTaxBand, IncomeTaxKey, RateKey};

/// Taper threshold used when the year has no `taper_threshold` row.
pub const DEFAULT_TAPER_THRESHOLD: i64 = 10_000_000;

/// One band's share of the taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandSlice {
    pub band: IncomeTaxBand,
    pub rate: i64,
    pub taxable: i64,
    pub tax: i64,
}

/// Full breakdown of an Income Tax calculation. All amounts in pence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxResult {
    pub income: i64,
    /// Allowance after taper.
    pub personal_allowance: i64,
    pub taxable_income: i64,
    /// Only bands with a non-zero slice appear.
    pub bands: Vec<BandSlice>,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Band {
    band: IncomeTaxBand,
    start: i64,
    rate: i64,
}

pub struct IncomeTaxCalculator<'a> {
    rates: &'a RateSnapshot,
}

impl<'a> IncomeTaxCalculator<'a> {
    pub fn new(rates: &'a RateSnapshot) -> Self {
        Self { rates }
    }

    /// Tax due on `income` using the year's personal allowance.
    pub fn calculate(&self, income: i64) -> Result<IncomeTaxResult, CalculationError> {
        self.calculate_with_allowance(income, None)
    }

    /// Tax due on `income`, with `allowance` replacing the year's personal
    /// allowance before taper when given.
    ///
    /// # Errors
    ///
    /// [`CalculationError::NegativeIncome`] for negative income, and
    /// [`CalculationError::MissingRate`] when the allowance is absent.
    pub fn calculate_with_allowance(
        &self,
        income: i64,
        allowance: Option<i64>,
    ) -> Result<IncomeTaxResult, CalculationError> {
        if income < 0 {
            return Err(CalculationError::NegativeIncome(income));
        }

        let base_allowance = match allowance {
            Some(value) => value,
            None => self
                .rates
                .require(RateKey::IncomeTax(IncomeTaxKey::PersonalAllowance))?,
        };
        let personal_allowance = self.tapered_allowance(income, base_allowance);
        let taxable_income = (income - personal_allowance).max(0);

        let bands = self.bands();
        let mut slices = Vec::new();
        for (i, band) in bands.iter().enumerate() {
            let upper = bands.get(i + 1).map(|next| next.start);
            let taxable = slice_between(taxable_income, band.start, upper);
            if taxable == 0 {
                continue;
            }
            slices.push(BandSlice {
                band: band.band,
                rate: band.rate,
                taxable,
                tax: apply_rate(taxable, band.rate),
            });
        }

        let total = slices.iter().map(|s| s.tax).sum();
        tracing::debug!(
            tax_year = %self.rates.tax_year(),
            income,
            personal_allowance,
            total,
            "income tax calculated"
        );

        Ok(IncomeTaxResult {
            income,
            personal_allowance,
            taxable_income,
            bands: slices,
            total,
        })
    }

    /// Allowance reduced by £1 for every whole £2 of income above the taper
    /// threshold, floored at zero.
    pub fn tapered_allowance(&self, income: i64, allowance: i64) -> i64 {
        let threshold = self
            .rates
            .get(RateKey::IncomeTax(IncomeTaxKey::TaperThreshold))
            .unwrap_or(DEFAULT_TAPER_THRESHOLD);
        if income <= threshold {
            return allowance;
        }
        let reduction = (income - threshold) / 200 * 100;
        (allowance - reduction).max(0)
    }

    /// Bands with a rate row, in order. The lowest starts at zero when it
    /// has no threshold row; any other band without one is left out, so
    /// the band below it runs on.
    fn bands(&self) -> Vec<Band> {
        let mut bands = Vec::new();
        for band in IncomeTaxBand::ALL {
            let Some(rate) = self.rates.get(RateKey::IncomeTax(IncomeTaxKey::BandRate(band)))
            else {
                continue;
            };
            let start = match self.rates.get(RateKey::IncomeTax(IncomeTaxKey::BandStart(band))) {
                Some(start) => start,
                None if bands.is_empty() => 0,
                None => continue,
            };
            bands.push(Band { band, start, rate });
        }
        bands.sort_by_key(|b| b.start);
        bands
    }
}
