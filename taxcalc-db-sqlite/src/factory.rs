use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use taxcalc_core::db::{DbConfig, RateRepository, RepositoryError, RepositoryFactory};

use crate::repository::SqliteRateRepository;

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`TAXCALC_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if the directory exists in the current working directory.
/// 3. **`$CARGO_MANIFEST_DIR/seeds`** as last resort (dev/tests).
pub fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TAXCALC_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`taxcalc_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use taxcalc_core::db::RepositoryRegistry;
/// use taxcalc_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`, apply
    /// migrations, then apply the seed files from [`seeds_dir`].
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"rates.db"`. The file is created if missing.
    /// * A `sqlite:` URL.
    /// * `":memory:"` for an ephemeral database.
    async fn create(&self, config: &DbConfig) -> Result<Arc<dyn RateRepository>, RepositoryError> {
        let repo = SqliteRateRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        repo.run_seeds(&seeds_dir())
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Arc::new(repo))
    }
}
