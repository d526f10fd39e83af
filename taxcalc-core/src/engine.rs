use std::sync::Arc;

use chrono::NaiveDate;
use tracing::instrument;

use crate::calculations::{
    CalculationError, CorporationTaxCalculator, CorporationTaxResult, IncomeTaxCalculator,
    IncomeTaxResult, NationalInsuranceCalculator, NationalInsuranceResult, PayrollEngine,
    RateSnapshot, ThresholdStatus, ThresholdTiers, VatEngine, VatReturn, VatSummary,
    VatThresholdMonitor, rolling_turnover, rolling_window_start,
};
use crate::db::{EmployeeProfiles, RateRepository, TransactionSource};
use crate::models::{
    PayFrequency, PayrollCalculationResult, PayrollRequest, TaxYear, VatTransaction,
};
use crate::tax_years::TaxYearManager;

/// Single entry point over the rate store, the external feeds and every
/// calculator.
pub struct TaxEngine {
    rates: Arc<dyn RateRepository>,
    transactions: Arc<dyn TransactionSource>,
    years: TaxYearManager,
    payroll: PayrollEngine,
    tiers: ThresholdTiers,
}

impl TaxEngine {
    pub fn new(
        rates: Arc<dyn RateRepository>,
        profiles: Arc<dyn EmployeeProfiles>,
        transactions: Arc<dyn TransactionSource>,
        tiers: ThresholdTiers,
    ) -> Self {
        Self {
            years: TaxYearManager::new(Arc::clone(&rates)),
            payroll: PayrollEngine::new(Arc::clone(&rates), profiles),
            rates,
            transactions,
            tiers,
        }
    }

    pub fn rates(&self) -> &dyn RateRepository {
        self.rates.as_ref()
    }

    pub fn years(&self) -> &TaxYearManager {
        &self.years
    }

    pub fn tiers(&self) -> ThresholdTiers {
        self.tiers
    }

    #[instrument(skip(self))]
    pub async fn income_tax(
        &self,
        income: i64,
        tax_year: TaxYear,
    ) -> Result<IncomeTaxResult, CalculationError> {
        let snapshot = self.snapshot(tax_year).await?;
        IncomeTaxCalculator::new(&snapshot).calculate(income)
    }

    #[instrument(skip(self))]
    pub async fn national_insurance(
        &self,
        pay: i64,
        frequency: PayFrequency,
        tax_year: TaxYear,
    ) -> Result<NationalInsuranceResult, CalculationError> {
        let snapshot = self.snapshot(tax_year).await?;
        NationalInsuranceCalculator::new(&snapshot).calculate(pay, frequency)
    }

    #[instrument(skip(self))]
    pub async fn corporation_tax(
        &self,
        profit: i64,
        associated_companies: u32,
        tax_year: TaxYear,
    ) -> Result<CorporationTaxResult, CalculationError> {
        let snapshot = self.snapshot(tax_year).await?;
        CorporationTaxCalculator::new(&snapshot).calculate(profit, associated_companies)
    }

    pub async fn payroll(
        &self,
        request: &PayrollRequest,
    ) -> Result<PayrollCalculationResult, CalculationError> {
        self.payroll.calculate(request).await
    }

    /// A draft return over `transactions`, or over the ledger feed for the
    /// period when none are given.
    #[instrument(skip(self, transactions))]
    pub async fn vat_return(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        transactions: Option<Vec<VatTransaction>>,
    ) -> Result<VatReturn, CalculationError> {
        if start > end {
            return Err(CalculationError::InvalidPeriod { start, end });
        }
        let transactions = match transactions {
            Some(transactions) => transactions,
            None => self.transactions.transactions_between(start, end).await?,
        };
        VatEngine::new(&transactions).create_return(start, end)
    }

    /// Threshold status for `tax_year`. `turnover` defaults to the rolling
    /// figure from the ledger feed as of `as_of`.
    #[instrument(skip(self))]
    pub async fn vat_threshold_status(
        &self,
        tax_year: TaxYear,
        as_of: NaiveDate,
        turnover: Option<i64>,
    ) -> Result<ThresholdStatus, CalculationError> {
        let snapshot = self.snapshot(tax_year).await?;
        let turnover = match turnover {
            Some(turnover) => turnover,
            None => {
                let window = self
                    .transactions
                    .transactions_between(rolling_window_start(as_of), as_of)
                    .await?;
                rolling_turnover(&window, as_of)?
            }
        };
        VatThresholdMonitor::new(&snapshot, self.tiers).status(turnover)
    }

    #[instrument(skip(self))]
    pub async fn vat_summary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<VatSummary, CalculationError> {
        if from > to {
            return Err(CalculationError::InvalidPeriod {
                start: from,
                end: to,
            });
        }
        let transactions = self.transactions.transactions_between(from, to).await?;
        VatEngine::new(&transactions).summary()
    }

    async fn snapshot(&self, tax_year: TaxYear) -> Result<RateSnapshot, CalculationError> {
        RateSnapshot::load(self.rates.as_ref(), tax_year).await
    }
}
