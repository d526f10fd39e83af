//! Corporation Tax with marginal relief.
//!
//! | Profit                              | Tax |
//! |-------------------------------------|-----|
//! | ≤ small profits limit               | profit × small profits rate |
//! | ≥ main rate limit                   | profit × main rate |
//! | between                             | profit × main rate − (main rate limit − profit) × fraction |
//!
//! Both limits are shared between associated companies: each is divided by
//! the number of associated companies plus one.

use serde::{Deserialize, Serialize};

use super::common::{apply_rate, scale};
use super::error::CalculationError;
use super::snapshot::RateSnapshot;
use crate::models::{CorporationTaxKey, RateKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorporationTaxRegime {
    SmallProfits,
    MarginalRelief,
    Main,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporationTaxResult {
    pub profit: i64,
    pub associated_companies: u32,
    /// Limits after sharing with associated companies.
    pub small_profits_limit: i64,
    pub main_rate_limit: i64,
    pub regime: CorporationTaxRegime,
    /// Zero outside the marginal relief band.
    pub marginal_relief: i64,
    pub tax: i64,
}

pub struct CorporationTaxCalculator<'a> {
    rates: &'a RateSnapshot,
}

impl<'a> CorporationTaxCalculator<'a> {
    pub fn new(rates: &'a RateSnapshot) -> Self {
        Self { rates }
    }

    pub fn calculate(
        &self,
        profit: i64,
        associated_companies: u32,
    ) -> Result<CorporationTaxResult, CalculationError> {
        if profit < 0 {
            return Err(CalculationError::NegativeIncome(profit));
        }

        let small_rate = self.require(CorporationTaxKey::SmallProfits)?;
        let main_rate = self.require(CorporationTaxKey::Main)?;
        let divisor = i64::from(associated_companies) + 1;
        let small_profits_limit =
            scale(self.require(CorporationTaxKey::SmallProfitsLimit)?, 1, divisor);
        let main_rate_limit = scale(self.require(CorporationTaxKey::MainRateLimit)?, 1, divisor);

        let (regime, marginal_relief, tax) = if profit <= small_profits_limit {
            (
                CorporationTaxRegime::SmallProfits,
                0,
                apply_rate(profit, small_rate),
            )
        } else if profit >= main_rate_limit {
            (CorporationTaxRegime::Main, 0, apply_rate(profit, main_rate))
        } else {
            let fraction = self.require(CorporationTaxKey::MarginalReliefFraction)?;
            let relief = apply_rate(main_rate_limit - profit, fraction);
            (
                CorporationTaxRegime::MarginalRelief,
                relief,
                apply_rate(profit, main_rate) - relief,
            )
        };

        tracing::debug!(
            tax_year = %self.rates.tax_year(),
            profit,
            associated_companies,
            ?regime,
            tax,
            "corporation tax calculated"
        );

        Ok(CorporationTaxResult {
            profit,
            associated_companies,
            small_profits_limit,
            main_rate_limit,
            regime,
            marginal_relief,
            tax,
        })
    }

    fn require(&self, key: CorporationTaxKey) -> Result<i64, CalculationError> {
        self.rates.require(RateKey::CorporationTax(key))
    }
}
