pub mod calculations;
pub mod db;
pub mod engine;
pub mod models;
pub mod seed;
pub mod tax_years;

pub use calculations::CalculationError;
pub use db::{RateRepository, RepositoryError};
pub use engine::TaxEngine;
pub use models::*;
pub use tax_years::TaxYearManager;
