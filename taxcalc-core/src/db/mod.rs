pub mod factory;
pub mod memory;
pub mod profiles;
pub mod repository;
pub mod transactions;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use memory::{InMemoryRateRepository, MemoryRepositoryFactory};
pub use profiles::{EmployeeProfiles, InMemoryEmployeeProfiles};
pub use repository::{
    RateRepository, RepositoryError, validate_effective_dates, validate_new_rates,
    validate_rate_value,
};
pub use transactions::{InMemoryTransactionSource, TransactionSource};
