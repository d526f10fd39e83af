//! Rolling 12-month turnover against the VAT registration threshold.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::common::checked_add;
use super::error::CalculationError;
use super::snapshot::RateSnapshot;
use crate::models::{RATE_SCALE, RateKey, TransactionKind, VatKey, VatTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Ok,
    Approaching,
    Exceeded,
}

impl WarningLevel {
    /// Exceeded warnings must stay visible until turnover drops.
    pub fn is_dismissible(&self) -> bool {
        *self != Self::Exceeded
    }
}

/// Where the `approaching` tier begins, as a fraction of the threshold
/// in basis points (9000 = 90.00%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdTiers {
    pub approaching_basis_points: i64,
}

impl Default for ThresholdTiers {
    fn default() -> Self {
        Self {
            approaching_basis_points: 9000,
        }
    }
}

impl ThresholdTiers {
    pub fn level(&self, turnover: i64, threshold: i64) -> WarningLevel {
        if turnover >= threshold {
            return WarningLevel::Exceeded;
        }
        let scaled_turnover = i128::from(turnover) * i128::from(RATE_SCALE);
        let approaching_from = i128::from(threshold) * i128::from(self.approaching_basis_points);
        if scaled_turnover >= approaching_from {
            WarningLevel::Approaching
        } else {
            WarningLevel::Ok
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnoverFigure {
    pub rolling_12_month: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdFigure {
    pub registration_amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdWarning {
    pub level: WarningLevel,
    pub remaining_until_threshold: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdStatus {
    pub turnover: TurnoverFigure,
    pub threshold: ThresholdFigure,
    pub warning: ThresholdWarning,
}

pub struct VatThresholdMonitor<'a> {
    rates: &'a RateSnapshot,
    tiers: ThresholdTiers,
}

impl<'a> VatThresholdMonitor<'a> {
    pub fn new(rates: &'a RateSnapshot, tiers: ThresholdTiers) -> Self {
        Self { rates, tiers }
    }

    pub fn status(&self, turnover: i64) -> Result<ThresholdStatus, CalculationError> {
        if turnover < 0 {
            return Err(CalculationError::NegativeTurnover(turnover));
        }
        let threshold = self.rates.require(RateKey::Vat(VatKey::Registration))?;
        let level = self.tiers.level(turnover, threshold);

        if level != WarningLevel::Ok {
            tracing::warn!(turnover, threshold, ?level, "vat registration threshold");
        }

        Ok(ThresholdStatus {
            turnover: TurnoverFigure {
                rolling_12_month: turnover,
            },
            threshold: ThresholdFigure {
                registration_amount: threshold,
            },
            warning: ThresholdWarning {
                level,
                remaining_until_threshold: (threshold - turnover).max(0),
            },
        })
    }
}

/// First day of the 12 months ending on `as_of`.
pub fn rolling_window_start(as_of: NaiveDate) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(12))
        .and_then(|d| d.succ_opt())
        .unwrap_or(NaiveDate::MIN)
}

/// Net income dated within the 12 months ending on `as_of`, inclusive.
pub fn rolling_turnover(
    transactions: &[VatTransaction],
    as_of: NaiveDate,
) -> Result<i64, CalculationError> {
    let start = rolling_window_start(as_of);
    transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Income)
        .filter(|t| t.date >= start && t.date <= as_of)
        .try_fold(0, |total, t| checked_add(total, t.amount))
}
