//! CSV inputs: tax-rate tables and the VAT transaction ledger.

pub mod loader;
pub mod transactions;

pub use loader::{TaxRateLoader, TaxRateLoaderError, TaxRateRecord};
pub use transactions::{CsvTransactionSource, TransactionCsvError, parse_transactions};
