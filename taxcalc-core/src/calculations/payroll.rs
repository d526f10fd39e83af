//! One pay run: gross pay to net pay.
//!
//! Income Tax is charged on a non-cumulative basis: the period's pay is
//! annualised, taxed with [`IncomeTaxCalculator`] and divided back into
//! the period. NI is charged on the period's pay with pro-rated
//! thresholds.

use std::sync::Arc;

use super::common::{checked_add, checked_mul, scale};
use super::error::CalculationError;
use super::income_tax::IncomeTaxCalculator;
use super::national_insurance::NationalInsuranceCalculator;
use super::snapshot::RateSnapshot;
use crate::db::{EmployeeProfiles, RateRepository};
use crate::models::{EmployeeProfile, PayrollCalculationResult, PayrollRequest, TaxCodeBasis};

pub struct PayrollEngine {
    rates: Arc<dyn RateRepository>,
    profiles: Arc<dyn EmployeeProfiles>,
}

impl PayrollEngine {
    pub fn new(rates: Arc<dyn RateRepository>, profiles: Arc<dyn EmployeeProfiles>) -> Self {
        Self { rates, profiles }
    }

    /// Calculates the pay run against the request's tax year.
    ///
    /// Nothing is persisted; identical requests against unchanged rates
    /// return identical results.
    #[tracing::instrument(
        skip(self, request),
        fields(employee_id = %request.employee_id, tax_year = %request.tax_year)
    )]
    pub async fn calculate(
        &self,
        request: &PayrollRequest,
    ) -> Result<PayrollCalculationResult, CalculationError> {
        let snapshot = RateSnapshot::load(self.rates.as_ref(), request.tax_year).await?;
        let profile = match request.tax_code {
            TaxCodeBasis::Standard => EmployeeProfile::default(),
            TaxCodeBasis::EmployeeProfile => self
                .profiles
                .profile(&request.employee_id)
                .await?
                .ok_or_else(|| CalculationError::UnknownEmployee(request.employee_id.clone()))?,
        };
        calculate_pay(&snapshot, request, &profile)
    }
}

/// The arithmetic of a pay run over an already-loaded snapshot.
///
/// `gross_pay` in the result includes the bonus.
pub fn calculate_pay(
    rates: &RateSnapshot,
    request: &PayrollRequest,
    profile: &EmployeeProfile,
) -> Result<PayrollCalculationResult, CalculationError> {
    if request.gross_pay < 0 {
        return Err(CalculationError::NegativeIncome(request.gross_pay));
    }
    if request.bonus < 0 {
        return Err(CalculationError::NegativeIncome(request.bonus));
    }

    let pay = checked_add(request.gross_pay, request.bonus)?;
    let periods = request.frequency.periods_per_year();

    let annual_tax = IncomeTaxCalculator::new(rates)
        .calculate_with_allowance(checked_mul(pay, periods)?, profile.personal_allowance)?
        .total;
    let income_tax = scale(annual_tax, 1, periods);

    let (employee_ni, employer_ni) = if profile.ni_exempt {
        (0, 0)
    } else {
        let ni = NationalInsuranceCalculator::new(rates).calculate(pay, request.frequency)?;
        (ni.employee_ni, ni.employer_ni)
    };

    let result = PayrollCalculationResult {
        gross_pay: pay,
        income_tax,
        employee_ni,
        employer_ni,
        net_pay: pay - income_tax - employee_ni,
    };
    tracing::debug!(net_pay = result.net_pay, "payroll calculated");
    Ok(result)
}
