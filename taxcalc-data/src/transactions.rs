use std::io::Read;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use taxcalc_core::db::TransactionSource;
use taxcalc_core::{RepositoryError, VatTransaction};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionCsvError {
    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Parse ledger transactions.
///
/// Columns: `date`, `type` (`income`/`expense`), `amount` (net pence),
/// `vatRate` (percent × 100) and an optional `supply`
/// (`domestic`/`eu_goods`).
pub fn parse_transactions<R: Read>(reader: R) -> Result<Vec<VatTransaction>, TransactionCsvError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut transactions = Vec::new();

    for result in csv_reader.deserialize() {
        transactions.push(result?);
    }

    Ok(transactions)
}

/// A ledger export on disk. The file is re-read on every query, so
/// appended transactions are picked up without a restart.
#[derive(Debug, Clone)]
pub struct CsvTransactionSource {
    path: PathBuf,
}

impl CsvTransactionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn read_all(&self) -> Result<Vec<VatTransaction>, TransactionCsvError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| TransactionCsvError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_transactions(bytes.as_slice())
    }
}

#[async_trait]
impl TransactionSource for CsvTransactionSource {
    async fn transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<VatTransaction>, RepositoryError> {
        let all = self
            .read_all()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), rows = all.len(), "read ledger");

        Ok(all
            .into_iter()
            .filter(|t| t.date >= from && t.date <= to)
            .collect())
    }
}
