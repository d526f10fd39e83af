//! Shared state handed to every request handler.

use std::sync::Arc;

use anyhow::Context;
use taxcalc_core::TaxEngine;
use taxcalc_core::db::{
    EmployeeProfiles, InMemoryEmployeeProfiles, InMemoryTransactionSource, MemoryRepositoryFactory,
    RepositoryRegistry, TransactionSource,
};
use taxcalc_data::CsvTransactionSource;
use taxcalc_db_sqlite::SqliteRepositoryFactory;
use tracing::info;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TaxEngine>,
}

impl AppState {
    pub fn new(engine: TaxEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Every backend this binary can talk to.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(MemoryRepositoryFactory));
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let rates = build_registry()
        .create(&config.database)
        .await
        .with_context(|| format!("Failed to open {} rate store", config.database.backend))?;
    info!(backend = %config.database.backend, "rate store ready");

    let transactions: Arc<dyn TransactionSource> = match &config.vat.transactions_csv {
        Some(path) => {
            info!(path = %path.display(), "reading ledger from CSV");
            Arc::new(CsvTransactionSource::new(path))
        }
        None => Arc::new(InMemoryTransactionSource::default()),
    };

    let profiles: Arc<dyn EmployeeProfiles> = Arc::new(
        config
            .payroll
            .profiles
            .iter()
            .fold(InMemoryEmployeeProfiles::new(), |acc, (id, profile)| {
                acc.with_profile(id.clone(), profile.clone())
            }),
    );

    Ok(AppState::new(TaxEngine::new(
        rates,
        profiles,
        transactions,
        config.vat.tiers,
    )))
}
