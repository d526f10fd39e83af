use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Where the goods or services in a transaction crossed a border.
/// Only `EuGoods` feeds boxes 2, 8 and 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyKind {
    #[default]
    Domestic,
    EuGoods,
}

/// A ledger transaction as seen by the VAT engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VatTransaction {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Net amount, pence.
    pub amount: i64,
    /// Percentage × 100.
    pub vat_rate: i64,
    #[serde(default)]
    pub supply: SupplyKind,
}
