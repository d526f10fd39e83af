//! The closed vocabulary of rate-table rows.
//!
//! Storage and JSON carry a `(category, name, rateType)` string triple.
//! Inside the engine every row is identified by a [`RateKey`], so a
//! combination such as `vat / personal_allowance` cannot be expressed.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategory {
    Vat,
    IncomeTax,
    NationalInsurance,
    CorporationTax,
}

impl TaxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vat => "vat",
            Self::IncomeTax => "income_tax",
            Self::NationalInsurance => "national_insurance",
            Self::CorporationTax => "corporation_tax",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vat" => Some(Self::Vat),
            "income_tax" => Some(Self::IncomeTax),
            "national_insurance" => Some(Self::NationalInsurance),
            "corporation_tax" => Some(Self::CorporationTax),
            _ => None,
        }
    }
}

/// Whether a row holds a monetary boundary (pence) or a percentage
/// (percentage × 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Threshold,
    Rate,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Rate => "rate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "threshold" => Some(Self::Threshold),
            "rate" => Some(Self::Rate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VatKey {
    Standard,
    Reduced,
    Zero,
    Registration,
    Deregistration,
}

/// Income Tax bands in ascending order. Only the bands present in a
/// year's rate table take part in a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTaxBand {
    Starter,
    Basic,
    Intermediate,
    Higher,
    Advanced,
    Additional,
}

impl IncomeTaxBand {
    pub const ALL: [IncomeTaxBand; 6] = [
        Self::Starter,
        Self::Basic,
        Self::Intermediate,
        Self::Higher,
        Self::Advanced,
        Self::Additional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Higher => "higher",
            Self::Advanced => "advanced",
            Self::Additional => "additional",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IncomeTaxKey {
    PersonalAllowance,
    TaperThreshold,
    /// Lower bound of a band, in taxable income above the allowance.
    BandStart(IncomeTaxBand),
    BandRate(IncomeTaxBand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NationalInsuranceKey {
    PrimaryThreshold,
    UpperEarningsLimit,
    SecondaryThreshold,
    EmployeeMain,
    EmployeeUpper,
    Employer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CorporationTaxKey {
    SmallProfits,
    SmallProfitsLimit,
    Main,
    MainRateLimit,
    MarginalReliefFraction,
}

/// Identifies one row of a tax year's rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RateKey {
    Vat(VatKey),
    IncomeTax(IncomeTaxKey),
    NationalInsurance(NationalInsuranceKey),
    CorporationTax(CorporationTaxKey),
}

impl RateKey {
    pub fn category(&self) -> TaxCategory {
        match self {
            Self::Vat(_) => TaxCategory::Vat,
            Self::IncomeTax(_) => TaxCategory::IncomeTax,
            Self::NationalInsurance(_) => TaxCategory::NationalInsurance,
            Self::CorporationTax(_) => TaxCategory::CorporationTax,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Vat(key) => match key {
                VatKey::Standard => "standard",
                VatKey::Reduced => "reduced",
                VatKey::Zero => "zero",
                VatKey::Registration => "registration",
                VatKey::Deregistration => "deregistration",
            },
            Self::IncomeTax(key) => match key {
                IncomeTaxKey::PersonalAllowance => "personal_allowance",
                IncomeTaxKey::TaperThreshold => "taper_threshold",
                IncomeTaxKey::BandStart(band) | IncomeTaxKey::BandRate(band) => band.as_str(),
            },
            Self::NationalInsurance(key) => match key {
                NationalInsuranceKey::PrimaryThreshold => "primary_threshold",
                NationalInsuranceKey::UpperEarningsLimit => "upper_earnings_limit",
                NationalInsuranceKey::SecondaryThreshold => "secondary_threshold",
                NationalInsuranceKey::EmployeeMain => "employee_main",
                NationalInsuranceKey::EmployeeUpper => "employee_upper",
                NationalInsuranceKey::Employer => "employer",
            },
            Self::CorporationTax(key) => match key {
                CorporationTaxKey::SmallProfits => "small_profits",
                CorporationTaxKey::SmallProfitsLimit => "small_profits_limit",
                CorporationTaxKey::Main => "main",
                CorporationTaxKey::MainRateLimit => "main_rate_limit",
                CorporationTaxKey::MarginalReliefFraction => "marginal_relief_fraction",
            },
        }
    }

    pub fn rate_type(&self) -> RateType {
        use RateType::{Rate, Threshold};

        match self {
            Self::Vat(VatKey::Registration | VatKey::Deregistration) => Threshold,
            Self::Vat(_) => Rate,
            Self::IncomeTax(IncomeTaxKey::BandRate(_)) => Rate,
            Self::IncomeTax(_) => Threshold,
            Self::NationalInsurance(
                NationalInsuranceKey::EmployeeMain
                | NationalInsuranceKey::EmployeeUpper
                | NationalInsuranceKey::Employer,
            ) => Rate,
            Self::NationalInsurance(_) => Threshold,
            Self::CorporationTax(
                CorporationTaxKey::SmallProfitsLimit | CorporationTaxKey::MainRateLimit,
            ) => Threshold,
            Self::CorporationTax(_) => Rate,
        }
    }

    /// Resolve a storage triple. Returns `None` for any combination
    /// outside the vocabulary.
    pub fn parse(category: TaxCategory, name: &str, rate_type: RateType) -> Option<Self> {
        let key = match category {
            TaxCategory::Vat => Self::Vat(match name {
                "standard" => VatKey::Standard,
                "reduced" => VatKey::Reduced,
                "zero" => VatKey::Zero,
                "registration" => VatKey::Registration,
                "deregistration" => VatKey::Deregistration,
                _ => return None,
            }),
            TaxCategory::IncomeTax => Self::IncomeTax(match name {
                "personal_allowance" => IncomeTaxKey::PersonalAllowance,
                "taper_threshold" => IncomeTaxKey::TaperThreshold,
                other => {
                    let band = IncomeTaxBand::parse(other)?;
                    match rate_type {
                        RateType::Threshold => IncomeTaxKey::BandStart(band),
                        RateType::Rate => IncomeTaxKey::BandRate(band),
                    }
                }
            }),
            TaxCategory::NationalInsurance => Self::NationalInsurance(match name {
                "primary_threshold" => NationalInsuranceKey::PrimaryThreshold,
                "upper_earnings_limit" => NationalInsuranceKey::UpperEarningsLimit,
                "secondary_threshold" => NationalInsuranceKey::SecondaryThreshold,
                "employee_main" => NationalInsuranceKey::EmployeeMain,
                "employee_upper" => NationalInsuranceKey::EmployeeUpper,
                "employer" => NationalInsuranceKey::Employer,
                _ => return None,
            }),
            TaxCategory::CorporationTax => Self::CorporationTax(match name {
                "small_profits" => CorporationTaxKey::SmallProfits,
                "small_profits_limit" => CorporationTaxKey::SmallProfitsLimit,
                "main" => CorporationTaxKey::Main,
                "main_rate_limit" => CorporationTaxKey::MainRateLimit,
                "marginal_relief_fraction" => CorporationTaxKey::MarginalReliefFraction,
                _ => return None,
            }),
        };

        (key.rate_type() == rate_type).then_some(key)
    }

    /// Parse from raw strings, as read from a database row or CSV record.
    pub fn parse_str(category: &str, name: &str, rate_type: &str) -> Option<Self> {
        Self::parse(
            TaxCategory::parse(category)?,
            name,
            RateType::parse(rate_type)?,
        )
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.category().as_str(),
            self.name(),
            self.rate_type().as_str()
        )
    }
}
