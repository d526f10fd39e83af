//! Tax-year lifecycle: which years exist and bootstrapping the next one.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::db::{RateRepository, RepositoryError};
use crate::models::{TaxRate, TaxYear};

pub struct TaxYearManager {
    repo: Arc<dyn RateRepository>,
}

impl TaxYearManager {
    pub fn new(repo: Arc<dyn RateRepository>) -> Self {
        Self { repo }
    }

    /// Years with at least one rate row, most recent first.
    pub async fn known_years(&self) -> Result<Vec<TaxYear>, RepositoryError> {
        self.repo.list_tax_years().await
    }

    /// The year after the most recent known year, or the year containing
    /// `today` when none exist.
    pub async fn next_year(&self, today: NaiveDate) -> Result<TaxYear, RepositoryError> {
        Ok(next_after(&self.known_years().await?, today))
    }

    /// Years that could be created now.
    pub async fn available_years(&self, today: NaiveDate) -> Result<Vec<TaxYear>, RepositoryError> {
        let known = self.known_years().await?;
        let next = next_after(&known, today);
        Ok(if known.contains(&next) {
            Vec::new()
        } else {
            vec![next]
        })
    }

    /// Copies `from` into `to`. Effective dates default to the bounds of
    /// `to`.
    pub async fn create_year(
        &self,
        from: TaxYear,
        to: TaxYear,
        effective_from: Option<NaiveDate>,
        effective_to: Option<NaiveDate>,
    ) -> Result<Vec<TaxRate>, RepositoryError> {
        let effective_from = effective_from.unwrap_or_else(|| to.start_date());
        let effective_to = effective_to.unwrap_or_else(|| to.end_date());

        info!(%from, %to, %effective_from, %effective_to, "creating tax year");
        self.repo
            .copy_year(from, to, effective_from, effective_to)
            .await
    }

    /// Copies the most recent known year into the following one.
    pub async fn create_next_year(&self) -> Result<Vec<TaxRate>, RepositoryError> {
        let latest = self
            .known_years()
            .await?
            .first()
            .copied()
            .ok_or(RepositoryError::NotFound)?;
        self.create_year(latest, latest.next(), None, None).await
    }
}

fn next_after(known: &[TaxYear], today: NaiveDate) -> TaxYear {
    match known.first() {
        Some(latest) => latest.next(),
        None => TaxYear::from_date(today),
    }
}
