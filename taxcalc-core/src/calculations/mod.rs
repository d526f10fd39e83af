//! UK tax and payroll calculators.
//!
//! Every calculator borrows a [`RateSnapshot`] holding one tax year's rate
//! table and is otherwise stateless, so calls may run concurrently.

pub mod common;
pub mod corporation_tax;
pub mod error;
pub mod income_tax;
pub mod national_insurance;
pub mod payroll;
pub mod snapshot;
pub mod vat;
pub mod vat_threshold;

pub use corporation_tax::{CorporationTaxCalculator, CorporationTaxRegime, CorporationTaxResult};
pub use error::CalculationError;
pub use income_tax::{BandSlice, DEFAULT_TAPER_THRESHOLD, IncomeTaxCalculator, IncomeTaxResult};
pub use national_insurance::{
    NationalInsuranceCalculator, NationalInsuranceResult, PeriodThresholds,
};
pub use payroll::{PayrollEngine, calculate_pay};
pub use snapshot::RateSnapshot;
pub use vat::{VatBoxSet, VatEngine, VatReturn, VatReturnStatus, VatSummary};
pub use vat_threshold::{
    ThresholdFigure, ThresholdStatus, ThresholdTiers, ThresholdWarning, TurnoverFigure,
    VatThresholdMonitor, WarningLevel, rolling_turnover, rolling_window_start,
};
