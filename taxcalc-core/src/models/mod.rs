mod payroll;
mod rate_key;
mod tax_rate;
mod tax_year;
mod transaction;

pub use payroll::{
    EmployeeProfile, PayFrequency, PayrollCalculationResult, PayrollRequest, TaxCodeBasis,
};
pub use rate_key::{
    CorporationTaxKey, IncomeTaxBand, IncomeTaxKey, NationalInsuranceKey, RateKey, RateType,
    TaxCategory, VatKey,
};
pub use tax_rate::{NewTaxRate, RATE_SCALE, TaxRate};
pub use tax_year::{TaxYear, TaxYearParseError};
pub use transaction::{SupplyKind, TransactionKind, VatTransaction};
