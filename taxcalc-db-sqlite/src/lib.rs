//! SQLite storage for the tax-rate table.

pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRateRepository;
