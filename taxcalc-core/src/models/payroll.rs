use serde::{Deserialize, Serialize};

use super::tax_year::TaxYear;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    Weekly,
    Fortnightly,
    FourWeekly,
    Monthly,
    #[default]
    Annual,
}

impl PayFrequency {
    pub fn periods_per_year(&self) -> i64 {
        match self {
            Self::Weekly => 52,
            Self::Fortnightly => 26,
            Self::FourWeekly => 13,
            Self::Monthly => 12,
            Self::Annual => 1,
        }
    }
}

/// How the employee's own tax position enters the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCodeBasis {
    /// Standard allowance and NI for the year.
    #[default]
    Standard,
    /// Use the employee's stored profile; fails if none exists.
    EmployeeProfile,
}

/// Employee-specific overrides kept outside the rate table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    /// Replaces the year's personal allowance (pence), before taper.
    pub personal_allowance: Option<i64>,
    /// No NI is due for this employee (e.g. over state pension age).
    #[serde(default)]
    pub ni_exempt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRequest {
    pub employee_id: String,
    /// Pence for the period.
    pub gross_pay: i64,
    #[serde(default)]
    pub bonus: i64,
    pub tax_year: TaxYear,
    #[serde(default)]
    pub frequency: PayFrequency,
    #[serde(default)]
    pub tax_code: TaxCodeBasis,
}

/// Result of one pay-run calculation. All amounts in pence.
///
/// `net_pay` excludes caller-entered "other deductions"; those are applied
/// after this result is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollCalculationResult {
    pub gross_pay: i64,
    pub income_tax: i64,
    #[serde(rename = "employeeNI")]
    pub employee_ni: i64,
    #[serde(rename = "employerNI")]
    pub employer_ni: i64,
    pub net_pay: i64,
}
