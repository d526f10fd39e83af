//! Built-in UK rate table used to bootstrap an empty store.
//!
//! Mirrors `taxcalc-db-sqlite/seeds/0001_rates_2024_25.sql`.

use crate::models::{
    CorporationTaxKey, IncomeTaxBand, IncomeTaxKey, NationalInsuranceKey, NewTaxRate, RateKey,
    TaxYear, VatKey,
};

/// The first tax year the built-in table covers.
pub const SEED_TAX_YEAR: TaxYear = TaxYear::new(2024);

/// `(key, value)` pairs for 2024-25. Thresholds in pence, rates × 100.
pub fn uk_2024_25() -> Vec<(RateKey, i64)> {
    use CorporationTaxKey as Ct;
    use IncomeTaxBand as Band;
    use NationalInsuranceKey as Ni;

    vec![
        (RateKey::Vat(VatKey::Standard), 2000),
        (RateKey::Vat(VatKey::Reduced), 500),
        (RateKey::Vat(VatKey::Zero), 0),
        (RateKey::Vat(VatKey::Registration), 9_000_000),
        (RateKey::Vat(VatKey::Deregistration), 8_800_000),
        (RateKey::IncomeTax(IncomeTaxKey::PersonalAllowance), 1_257_000),
        (RateKey::IncomeTax(IncomeTaxKey::TaperThreshold), 10_000_000),
        (RateKey::IncomeTax(IncomeTaxKey::BandStart(Band::Basic)), 0),
        (RateKey::IncomeTax(IncomeTaxKey::BandRate(Band::Basic)), 2000),
        (RateKey::IncomeTax(IncomeTaxKey::BandStart(Band::Higher)), 3_770_000),
        (RateKey::IncomeTax(IncomeTaxKey::BandRate(Band::Higher)), 4000),
        (RateKey::IncomeTax(IncomeTaxKey::BandStart(Band::Additional)), 12_514_000),
        (RateKey::IncomeTax(IncomeTaxKey::BandRate(Band::Additional)), 4500),
        (RateKey::NationalInsurance(Ni::PrimaryThreshold), 1_257_000),
        (RateKey::NationalInsurance(Ni::UpperEarningsLimit), 5_027_000),
        (RateKey::NationalInsurance(Ni::SecondaryThreshold), 910_000),
        (RateKey::NationalInsurance(Ni::EmployeeMain), 800),
        (RateKey::NationalInsurance(Ni::EmployeeUpper), 200),
        (RateKey::NationalInsurance(Ni::Employer), 1380),
        (RateKey::CorporationTax(Ct::SmallProfits), 1900),
        (RateKey::CorporationTax(Ct::SmallProfitsLimit), 5_000_000),
        (RateKey::CorporationTax(Ct::Main), 2500),
        (RateKey::CorporationTax(Ct::MainRateLimit), 25_000_000),
        (RateKey::CorporationTax(Ct::MarginalReliefFraction), 150),
    ]
}

/// The built-in table as insertable rows for `tax_year`, effective for the
/// whole of that year.
pub fn seed_rates(tax_year: TaxYear) -> Vec<NewTaxRate> {
    uk_2024_25()
        .into_iter()
        .map(|(key, value)| NewTaxRate {
            key,
            value,
            tax_year,
            effective_from: tax_year.start_date(),
            effective_to: tax_year.end_date(),
        })
        .collect()
}
