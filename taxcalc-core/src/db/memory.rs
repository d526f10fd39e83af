use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{
    RateRepository, RepositoryError, validate_effective_dates, validate_new_rates,
    validate_rate_value,
};
use crate::models::{NewTaxRate, RateKey, TaxRate, TaxYear};
use crate::seed::{SEED_TAX_YEAR, seed_rates};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<TaxRate>,
}

impl Table {
    fn has_year(&self, tax_year: TaxYear) -> bool {
        self.rows.iter().any(|r| r.tax_year == tax_year)
    }

    fn year_rows(&self, tax_year: TaxYear) -> Vec<TaxRate> {
        let mut rows: Vec<TaxRate> = self
            .rows
            .iter()
            .filter(|r| r.tax_year == tax_year)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.key);
        rows
    }

    fn push(&mut self, rate: NewTaxRate) -> TaxRate {
        self.next_id += 1;
        let row = TaxRate {
            id: self.next_id,
            key: rate.key,
            value: rate.value,
            tax_year: rate.tax_year,
            effective_from: rate.effective_from,
            effective_to: rate.effective_to,
        };
        self.rows.push(row.clone());
        row
    }
}

/// Process-local rate store. Every write holds the table's write lock for
/// its whole batch, so readers see each batch entirely or not at all.
#[derive(Default)]
pub struct InMemoryRateRepository {
    table: RwLock<Table>,
}

impl InMemoryRateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the built-in rate table for [`SEED_TAX_YEAR`].
    pub async fn seeded() -> Result<Self, RepositoryError> {
        let repo = Self::new();
        repo.insert_rates(&seed_rates(SEED_TAX_YEAR)).await?;
        Ok(repo)
    }
}

#[async_trait]
impl RateRepository for InMemoryRateRepository {
    async fn get_rates(&self, tax_year: TaxYear) -> Result<Vec<TaxRate>, RepositoryError> {
        let rows = self.table.read().await.year_rows(tax_year);
        if rows.is_empty() {
            return Err(RepositoryError::TaxYearNotFound(tax_year));
        }
        Ok(rows)
    }

    async fn get_rate(&self, tax_year: TaxYear, key: RateKey) -> Result<TaxRate, RepositoryError> {
        self.table
            .read()
            .await
            .rows
            .iter()
            .find(|r| r.tax_year == tax_year && r.key == key)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_rate_by_id(&self, id: i64) -> Result<TaxRate, RepositoryError> {
        self.table
            .read()
            .await
            .rows
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_rate_value(&self, id: i64, value: i64) -> Result<TaxRate, RepositoryError> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound)?;

        validate_rate_value(row.key, value)?;
        info!(
            id,
            key = %row.key,
            tax_year = %row.tax_year,
            old = row.value,
            new = value,
            "updating rate"
        );
        row.value = value;
        Ok(row.clone())
    }

    async fn copy_year(
        &self,
        from: TaxYear,
        to: TaxYear,
        effective_from: NaiveDate,
        effective_to: NaiveDate,
    ) -> Result<Vec<TaxRate>, RepositoryError> {
        validate_effective_dates(effective_from, effective_to)?;

        let mut table = self.table.write().await;
        if table.has_year(to) {
            return Err(RepositoryError::DuplicateTaxYear(to));
        }

        let source = table.year_rows(from);
        if source.is_empty() {
            return Err(RepositoryError::TaxYearNotFound(from));
        }

        let copied: Vec<TaxRate> = source
            .iter()
            .map(|r| {
                table.push(NewTaxRate {
                    key: r.key,
                    value: r.value,
                    tax_year: to,
                    effective_from,
                    effective_to,
                })
            })
            .collect();

        info!(%from, %to, rows = copied.len(), "copied tax year");
        Ok(copied)
    }

    async fn list_tax_years(&self) -> Result<Vec<TaxYear>, RepositoryError> {
        let table = self.table.read().await;
        let mut years: Vec<TaxYear> = table.rows.iter().map(|r| r.tax_year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        Ok(years)
    }

    async fn insert_rates(&self, rates: &[NewTaxRate]) -> Result<Vec<TaxRate>, RepositoryError> {
        validate_new_rates(rates)?;

        let mut table = self.table.write().await;
        if let Some(existing) = rates
            .iter()
            .find(|new| table.rows.iter().any(|r| r.tax_year == new.tax_year && r.key == new.key))
        {
            return Err(RepositoryError::DuplicateRate {
                key: existing.key,
                tax_year: existing.tax_year,
            });
        }

        let inserted: Vec<TaxRate> = rates.iter().cloned().map(|r| table.push(r)).collect();
        debug!(rows = inserted.len(), "inserted rates");
        Ok(inserted)
    }
}

/// [`RepositoryFactory`] for the process-local store. `connection_string`
/// is ignored.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, _config: &DbConfig) -> Result<Arc<dyn RateRepository>, RepositoryError> {
        Ok(Arc::new(InMemoryRateRepository::seeded().await?))
    }
}
