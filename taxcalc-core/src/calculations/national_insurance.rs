//! Class 1 National Insurance for one pay period.
//!
//! Thresholds are stored as annual figures and pro-rated to the pay
//! frequency. Employee NI is charged at the main rate between the primary
//! threshold and the upper earnings limit, and at the upper rate above it.
//! Employer NI is charged on all pay above the secondary threshold.

use serde::{Deserialize, Serialize};

use super::common::{apply_rate, scale, slice_between};
use super::error::CalculationError;
use super::snapshot::RateSnapshot;
use crate::models::{NationalInsuranceKey, PayFrequency, RateKey};

/// Thresholds after pro-ration to the pay period, in pence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodThresholds {
    pub primary_threshold: i64,
    pub upper_earnings_limit: i64,
    pub secondary_threshold: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalInsuranceResult {
    pub pay: i64,
    pub frequency: PayFrequency,
    pub thresholds: PeriodThresholds,
    #[serde(rename = "employeeNI")]
    pub employee_ni: i64,
    #[serde(rename = "employerNI")]
    pub employer_ni: i64,
}

pub struct NationalInsuranceCalculator<'a> {
    rates: &'a RateSnapshot,
}

impl<'a> NationalInsuranceCalculator<'a> {
    pub fn new(rates: &'a RateSnapshot) -> Self {
        Self { rates }
    }

    /// NI due on `pay` for one period of `frequency`.
    ///
    /// # Errors
    ///
    /// [`CalculationError::NegativeIncome`] for negative pay, and
    /// [`CalculationError::MissingRate`] when a required row is absent.
    /// `secondary_threshold` falls back to the primary threshold and
    /// `employee_upper` to `employee_main`.
    pub fn calculate(
        &self,
        pay: i64,
        frequency: PayFrequency,
    ) -> Result<NationalInsuranceResult, CalculationError> {
        if pay < 0 {
            return Err(CalculationError::NegativeIncome(pay));
        }

        let thresholds = self.period_thresholds(frequency)?;
        let main_rate = self.require(NationalInsuranceKey::EmployeeMain)?;
        let upper_rate = self
            .get(NationalInsuranceKey::EmployeeUpper)
            .unwrap_or(main_rate);
        let employer_rate = self.require(NationalInsuranceKey::Employer)?;

        let main_slice = slice_between(
            pay,
            thresholds.primary_threshold,
            Some(thresholds.upper_earnings_limit),
        );
        let upper_slice = slice_between(pay, thresholds.upper_earnings_limit, None);
        let employee_ni = apply_rate(main_slice, main_rate) + apply_rate(upper_slice, upper_rate);

        let employer_slice = slice_between(pay, thresholds.secondary_threshold, None);
        let employer_ni = apply_rate(employer_slice, employer_rate);

        tracing::debug!(
            tax_year = %self.rates.tax_year(),
            pay,
            ?frequency,
            employee_ni,
            employer_ni,
            "national insurance calculated"
        );

        Ok(NationalInsuranceResult {
            pay,
            frequency,
            thresholds,
            employee_ni,
            employer_ni,
        })
    }

    /// Annual thresholds divided by the number of periods, rounded to the
    /// penny.
    pub fn period_thresholds(
        &self,
        frequency: PayFrequency,
    ) -> Result<PeriodThresholds, CalculationError> {
        let periods = frequency.periods_per_year();
        let primary = self.require(NationalInsuranceKey::PrimaryThreshold)?;
        let upper = self.require(NationalInsuranceKey::UpperEarningsLimit)?;
        let secondary = self
            .get(NationalInsuranceKey::SecondaryThreshold)
            .unwrap_or(primary);

        Ok(PeriodThresholds {
            primary_threshold: scale(primary, 1, periods),
            upper_earnings_limit: scale(upper, 1, periods),
            secondary_threshold: scale(secondary, 1, periods),
        })
    }

    fn get(&self, key: NationalInsuranceKey) -> Option<i64> {
        self.rates.get(RateKey::NationalInsurance(key))
    }

    fn require(&self, key: NationalInsuranceKey) -> Result<i64, CalculationError> {
        self.rates.require(RateKey::NationalInsurance(key))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::snapshot::seeded_snapshot;
    use crate::seed::{SEED_TAX_YEAR, uk_2024_25};

    fn without(keys: &[NationalInsuranceKey]) -> RateSnapshot {
        let values = uk_2024_25().into_iter().filter(|(k, _)| {
            !keys
                .iter()
                .any(|key| *k == RateKey::NationalInsurance(*key))
        });
        RateSnapshot::from_values(SEED_TAX_YEAR, values)
    }

    #[test]
    fn annual_pay_above_upper_earnings_limit() {
        let rates = seeded_snapshot();
        let result = NationalInsuranceCalculator::new(&rates)
            .calculate(6_000_000, PayFrequency::Annual)
            .unwrap();

        // £37,700 at 8% + £9,730 at 2%
        assert_eq!(result.employee_ni, 301_600 + 19_460);
        // £50,900 at 13.8%
        assert_eq!(result.employer_ni, 702_420);
    }

    #[test]
    fn monthly_thresholds_are_pro_rated() {
        let rates = seeded_snapshot();
        let calc = NationalInsuranceCalculator::new(&rates);

        assert_eq!(
            calc.period_thresholds(PayFrequency::Monthly).unwrap(),
            PeriodThresholds {
                primary_threshold: 104_750,
                upper_earnings_limit: 418_917,
                secondary_threshold: 75_833,
            }
        );

        let result = calc.calculate(300_000, PayFrequency::Monthly).unwrap();
        // £1,952.50 at 8%
        assert_eq!(result.employee_ni, 15_620);
        // £2,241.67 at 13.8% = £309.35046
        assert_eq!(result.employer_ni, 30_935);
    }

    #[test]
    fn weekly_pay_between_secondary_and_primary_threshold() {
        let rates = seeded_snapshot();
        let result = NationalInsuranceCalculator::new(&rates)
            .calculate(20_000, PayFrequency::Weekly)
            .unwrap();

        assert_eq!(result.thresholds.primary_threshold, 24_173);
        assert_eq!(result.thresholds.secondary_threshold, 17_500);
        assert_eq!(result.employee_ni, 0);
        assert_eq!(result.employer_ni, 345);
    }

    #[test]
    fn ni_is_never_negative() {
        let rates = seeded_snapshot();
        let calc = NationalInsuranceCalculator::new(&rates);

        for frequency in [
            PayFrequency::Weekly,
            PayFrequency::Fortnightly,
            PayFrequency::FourWeekly,
            PayFrequency::Monthly,
            PayFrequency::Annual,
        ] {
            for pay in (0..8_000_000).step_by(77_777) {
                let result = calc.calculate(pay, frequency).unwrap();
                assert!(result.employee_ni >= 0);
                assert!(result.employer_ni >= 0);
            }
        }
    }

    #[test]
    fn upper_rate_defaults_to_main_rate() {
        let rates = without(&[NationalInsuranceKey::EmployeeUpper]);
        let result = NationalInsuranceCalculator::new(&rates)
            .calculate(6_000_000, PayFrequency::Annual)
            .unwrap();

        // £47,430 at 8%
        assert_eq!(result.employee_ni, 379_440);
    }

    #[test]
    fn secondary_threshold_defaults_to_primary_threshold() {
        let rates = without(&[NationalInsuranceKey::SecondaryThreshold]);
        let result = NationalInsuranceCalculator::new(&rates)
            .calculate(2_257_000, PayFrequency::Annual)
            .unwrap();

        assert_eq!(result.thresholds.secondary_threshold, 1_257_000);
        // £10,000 at 13.8%
        assert_eq!(result.employer_ni, 138_000);
    }

    #[test]
    fn negative_pay_is_rejected() {
        let rates = seeded_snapshot();
        assert_eq!(
            NationalInsuranceCalculator::new(&rates).calculate(-500, PayFrequency::Monthly),
            Err(CalculationError::NegativeIncome(-500))
        );
    }

    #[test]
    fn missing_employer_rate_is_reported() {
        let rates = without(&[NationalInsuranceKey::Employer]);
        assert_eq!(
            NationalInsuranceCalculator::new(&rates).calculate(100, PayFrequency::Annual),
            Err(CalculationError::MissingRate {
                key: RateKey::NationalInsurance(NationalInsuranceKey::Employer),
                tax_year: SEED_TAX_YEAR,
            })
        );
    }
}
