//! VAT return boxes from ledger transactions.
//!
//! | Box | Description |
//! |-----|-------------|
//! | 1   | VAT due on sales |
//! | 2   | VAT due on acquisitions of EU goods |
//! | 3   | Box 1 + Box 2 |
//! | 4   | VAT reclaimed on purchases, including EU acquisitions |
//! | 5   | Box 3 − Box 4 (positive is owed, negative is a refund) |
//! | 6   | Net sales |
//! | 7   | Net purchases |
//! | 8   | Net supplies of goods to the EU |
//! | 9   | Net acquisitions of goods from the EU |
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use taxcalc_core::calculations::VatEngine;
//! use taxcalc_core::models::{SupplyKind, TransactionKind, VatTransaction};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! let transactions = vec![
//!     VatTransaction {
//!         date,
//!         kind: TransactionKind::Income,
//!         amount: 1_000_000,
//!         vat_rate: 2000,
//!         supply: SupplyKind::Domestic,
//!     },
//!     VatTransaction {
//!         date,
//!         kind: TransactionKind::Expense,
//!         amount: 250_000,
//!         vat_rate: 2000,
//!         supply: SupplyKind::Domestic,
//!     },
//! ];
//!
//! let boxes = VatEngine::new(&transactions).boxes().unwrap();
//! assert_eq!(boxes.box1(), 200_000);
//! assert_eq!(boxes.box4(), 50_000);
//! assert_eq!(boxes.box5(), 150_000);
//! ```

use chrono::NaiveDate;
use serde::Serialize;

use super::common::{apply_rate, checked_add};
use super::error::CalculationError;
use crate::models::{SupplyKind, TransactionKind, VatTransaction};

/// The nine boxes of a VAT return, in pence.
///
/// Boxes 3 and 5 are derived on construction and cannot be set directly.
/// Construction fails with [`CalculationError::AmountOutOfRange`] when a
/// derived box does not fit in `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VatBoxSet {
    box1: i64,
    box2: i64,
    box3: i64,
    box4: i64,
    box5: i64,
    box6: i64,
    box7: i64,
    box8: i64,
    box9: i64,
}

impl VatBoxSet {
    pub fn new(
        box1: i64,
        box2: i64,
        box4: i64,
        box6: i64,
        box7: i64,
        box8: i64,
        box9: i64,
    ) -> Result<Self, CalculationError> {
        let box3 = checked_add(box1, box2)?;
        let box5 = box3
            .checked_sub(box4)
            .ok_or(CalculationError::AmountOutOfRange)?;
        Ok(Self {
            box1,
            box2,
            box3,
            box4,
            box5,
            box6,
            box7,
            box8,
            box9,
        })
    }

    pub fn box1(&self) -> i64 {
        self.box1
    }
    pub fn box2(&self) -> i64 {
        self.box2
    }
    pub fn box3(&self) -> i64 {
        self.box3
    }
    pub fn box4(&self) -> i64 {
        self.box4
    }
    pub fn box5(&self) -> i64 {
        self.box5
    }
    pub fn box6(&self) -> i64 {
        self.box6
    }
    pub fn box7(&self) -> i64 {
        self.box7
    }
    pub fn box8(&self) -> i64 {
        self.box8
    }
    pub fn box9(&self) -> i64 {
        self.box9
    }

    /// A refund is due from the tax authority.
    pub fn is_refund(&self) -> bool {
        self.box5 < 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VatReturnStatus {
    /// Computed but not yet filed. Filing is the caller's concern.
    Draft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VatReturn {
    #[serde(flatten)]
    pub boxes: VatBoxSet,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub status: VatReturnStatus,
}

/// Output and input VAT for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VatSummary {
    pub output_vat: i64,
    pub input_vat: i64,
    /// Output minus input; positive is owed.
    pub vat_balance: i64,
}

pub struct VatEngine<'a> {
    transactions: &'a [VatTransaction],
}

impl<'a> VatEngine<'a> {
    pub fn new(transactions: &'a [VatTransaction]) -> Self {
        Self { transactions }
    }

    /// Boxes over every transaction given to the engine.
    pub fn boxes(&self) -> Result<VatBoxSet, CalculationError> {
        Self::boxes_for(self.transactions.iter())
    }

    /// A draft return for transactions dated within `start..=end`.
    pub fn create_return(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<VatReturn, CalculationError> {
        if start > end {
            return Err(CalculationError::InvalidPeriod { start, end });
        }

        let in_period = self
            .transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= end);
        let boxes = Self::boxes_for(in_period)?;

        tracing::info!(
            %start,
            %end,
            box5 = boxes.box5(),
            "vat return prepared"
        );

        Ok(VatReturn {
            boxes,
            period_start: start,
            period_end: end,
            status: VatReturnStatus::Draft,
        })
    }

    pub fn summary(&self) -> Result<VatSummary, CalculationError> {
        let boxes = self.boxes()?;
        Ok(VatSummary {
            output_vat: boxes.box3(),
            input_vat: boxes.box4(),
            vat_balance: boxes.box5(),
        })
    }

    fn boxes_for<'t>(
        transactions: impl Iterator<Item = &'t VatTransaction>,
    ) -> Result<VatBoxSet, CalculationError> {
        let (mut box1, mut box2, mut box4) = (0, 0, 0);
        let (mut box6, mut box7, mut box8, mut box9) = (0, 0, 0, 0);

        for t in transactions {
            let vat = apply_rate(t.amount, t.vat_rate);
            let eu_goods = t.supply == SupplyKind::EuGoods;
            match t.kind {
                TransactionKind::Income => {
                    box1 = checked_add(box1, vat)?;
                    box6 = checked_add(box6, t.amount)?;
                    if eu_goods {
                        box8 = checked_add(box8, t.amount)?;
                    }
                }
                TransactionKind::Expense => {
                    box4 = checked_add(box4, vat)?;
                    box7 = checked_add(box7, t.amount)?;
                    if eu_goods {
                        // Acquisitions are self-accounted: due and reclaimed.
                        box2 = checked_add(box2, vat)?;
                        box9 = checked_add(box9, t.amount)?;
                    }
                }
            }
        }

        VatBoxSet::new(box1, box2, box4, box6, box7, box8, box9)
    }
}
