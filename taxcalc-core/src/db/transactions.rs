use async_trait::async_trait;
use chrono::NaiveDate;

use super::repository::RepositoryError;
use crate::models::VatTransaction;

/// Read-only feed of ledger transactions, owned by the bookkeeping layer.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Transactions dated within `from..=to`.
    async fn transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<VatTransaction>, RepositoryError>;
}

/// A fixed list of transactions held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionSource {
    transactions: Vec<VatTransaction>,
}

impl InMemoryTransactionSource {
    pub fn new(transactions: Vec<VatTransaction>) -> Self {
        Self { transactions }
    }
}

#[async_trait]
impl TransactionSource for InMemoryTransactionSource {
    async fn transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<VatTransaction>, RepositoryError> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .cloned()
            .collect())
    }
}
