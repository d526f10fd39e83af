use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, Transaction};
use taxcalc_core::db::{validate_effective_dates, validate_new_rates, validate_rate_value};
use taxcalc_core::{NewTaxRate, RateKey, RateRepository, RepositoryError, TaxRate, TaxYear};
use tracing::{debug, info, warn};

const SELECT_COLUMNS: &str =
    "SELECT id, category, name, rate_type, value, tax_year, effective_from, effective_to FROM tax_rate";

pub struct SqliteRateRepository {
    pool: SqlitePool,
}

impl SqliteRateRepository {
    /// Open `database_url`, which may be a `sqlite:` URL, `:memory:`, or a
    /// bare file path. Files are created when missing.
    pub async fn new(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");
        let options = if database_url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(database_url)
                .with_context(|| format!("Invalid database URL: {}", database_url))?
        } else if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .context("Invalid in-memory database URL")?
        } else {
            SqliteConnectOptions::new()
                .filename(database_url)
                .journal_mode(SqliteJournalMode::Wal)
        };
        let options = options.create_if_missing(true).foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if in_memory {
            // Each :memory: connection is its own database; keep exactly one alive.
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(&self, seeds_dir: &Path) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(FromRow)]
struct TaxRateRow {
    id: i64,
    category: String,
    name: String,
    rate_type: String,
    value: i64,
    tax_year: String,
    effective_from: NaiveDate,
    effective_to: NaiveDate,
}

impl TryFrom<TaxRateRow> for TaxRate {
    type Error = RepositoryError;

    fn try_from(row: TaxRateRow) -> Result<Self, Self::Error> {
        let key = RateKey::parse_str(&row.category, &row.name, &row.rate_type).ok_or_else(|| {
            RepositoryError::Database(format!(
                "row {} has unknown rate {}/{}/{}",
                row.id, row.category, row.name, row.rate_type
            ))
        })?;
        let tax_year = row.tax_year.parse().map_err(|e: taxcalc_core::TaxYearParseError| {
            RepositoryError::Database(e.to_string())
        })?;

        Ok(TaxRate {
            id: row.id,
            key,
            value: row.value,
            tax_year,
            effective_from: row.effective_from,
            effective_to: row.effective_to,
        })
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn into_rates(rows: Vec<TaxRateRow>) -> Result<Vec<TaxRate>, RepositoryError> {
    let mut rates = rows
        .into_iter()
        .map(TaxRate::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    rates.sort_by_key(|r| r.key);
    Ok(rates)
}

async fn year_exists(
    tx: &mut Transaction<'_, Sqlite>,
    tax_year: TaxYear,
) -> Result<bool, RepositoryError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tax_rate WHERE tax_year = ?")
        .bind(tax_year.to_string())
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error)?;
    Ok(count > 0)
}

async fn insert_row(
    tx: &mut Transaction<'_, Sqlite>,
    rate: &NewTaxRate,
) -> Result<TaxRate, RepositoryError> {
    let result = sqlx::query(
        "INSERT INTO tax_rate (category, name, rate_type, value, tax_year, effective_from, effective_to)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(rate.key.category().as_str())
    .bind(rate.key.name())
    .bind(rate.key.rate_type().as_str())
    .bind(rate.value)
    .bind(rate.tax_year.to_string())
    .bind(rate.effective_from)
    .bind(rate.effective_to)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return RepositoryError::DuplicateRate {
                    key: rate.key,
                    tax_year: rate.tax_year,
                };
            }
        }
        db_error(e)
    })?;

    Ok(TaxRate {
        id: result.last_insert_rowid(),
        key: rate.key,
        value: rate.value,
        tax_year: rate.tax_year,
        effective_from: rate.effective_from,
        effective_to: rate.effective_to,
    })
}

#[async_trait]
impl RateRepository for SqliteRateRepository {
    async fn get_rates(&self, tax_year: TaxYear) -> Result<Vec<TaxRate>, RepositoryError> {
        let rows: Vec<TaxRateRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE tax_year = ?"))
                .bind(tax_year.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        if rows.is_empty() {
            return Err(RepositoryError::TaxYearNotFound(tax_year));
        }
        debug!(%tax_year, rows = rows.len(), "fetched rates");
        into_rates(rows)
    }

    async fn get_rate(&self, tax_year: TaxYear, key: RateKey) -> Result<TaxRate, RepositoryError> {
        let row: TaxRateRow = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE tax_year = ? AND category = ? AND name = ? AND rate_type = ?"
        ))
        .bind(tax_year.to_string())
        .bind(key.category().as_str())
        .bind(key.name())
        .bind(key.rate_type().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn get_rate_by_id(&self, id: i64) -> Result<TaxRate, RepositoryError> {
        let row: TaxRateRow = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn update_rate_value(&self, id: i64, value: i64) -> Result<TaxRate, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row: TaxRateRow = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;
        let mut rate = TaxRate::try_from(row)?;

        if let Err(e) = validate_rate_value(rate.key, value) {
            warn!(id, key = %rate.key, value, "rejected rate update");
            return Err(e);
        }

        sqlx::query("UPDATE tax_rate SET value = ? WHERE id = ?")
            .bind(value)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        info!(
            id,
            key = %rate.key,
            tax_year = %rate.tax_year,
            old = rate.value,
            new = value,
            "updated rate"
        );
        rate.value = value;
        Ok(rate)
    }

    async fn copy_year(
        &self,
        from: TaxYear,
        to: TaxYear,
        effective_from: NaiveDate,
        effective_to: NaiveDate,
    ) -> Result<Vec<TaxRate>, RepositoryError> {
        validate_effective_dates(effective_from, effective_to)?;

        // The copy is the transaction's first statement, so it holds the
        // write lock before anything is read.
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let inserted = sqlx::query(
            "INSERT INTO tax_rate (category, name, rate_type, value, tax_year, effective_from, effective_to)
             SELECT category, name, rate_type, value, ?, ?, ?
               FROM tax_rate
              WHERE tax_year = ?
                AND NOT EXISTS (SELECT 1 FROM tax_rate WHERE tax_year = ?)",
        )
        .bind(to.to_string())
        .bind(effective_from)
        .bind(effective_to)
        .bind(from.to_string())
        .bind(to.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return RepositoryError::DuplicateTaxYear(to);
                }
            }
            db_error(e)
        })?
        .rows_affected();

        if inserted == 0 {
            if year_exists(&mut tx, to).await? {
                warn!(%from, %to, "copy target year already exists");
                return Err(RepositoryError::DuplicateTaxYear(to));
            }
            return Err(RepositoryError::TaxYearNotFound(from));
        }

        let rows: Vec<TaxRateRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE tax_year = ?"))
                .bind(to.to_string())
                .fetch_all(&mut *tx)
                .await
                .map_err(db_error)?;
        let copied = into_rates(rows)?;
        tx.commit().await.map_err(db_error)?;

        info!(%from, %to, rows = copied.len(), "copied tax year");
        Ok(copied)
    }

    async fn list_tax_years(&self) -> Result<Vec<TaxYear>, RepositoryError> {
        let keys: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT tax_year FROM tax_rate ORDER BY tax_year DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        let mut years = keys
            .iter()
            .map(|k| k.parse::<TaxYear>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        years.sort_unstable_by(|a, b| b.cmp(a));
        Ok(years)
    }

    async fn insert_rates(&self, rates: &[NewTaxRate]) -> Result<Vec<TaxRate>, RepositoryError> {
        validate_new_rates(rates)?;

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut inserted = Vec::with_capacity(rates.len());
        for rate in rates {
            inserted.push(insert_row(&mut tx, rate).await?);
        }
        tx.commit().await.map_err(db_error)?;

        debug!(rows = inserted.len(), "inserted rates");
        Ok(inserted)
    }
}
