//! Report generation over the store.

use std::sync::Arc;

use ledgerline_shared::types::TenantId;

use crate::accounts::AccountFilter;
use crate::error::LedgerError;
use crate::fiscal::PeriodKey;
use crate::store::{AccountRepository, BalanceRepository, LedgerStore};

use super::builder::{Pairs, ReportBuilder, add_movements, closing_pairs};
use super::types::{BalanceSheet, IncomeStatement, TrialBalance};

/// Read-only financial reports.
#[derive(Debug)]
pub struct ReportGenerator<S> {
    store: Arc<S>,
}

impl<S> Clone for ReportGenerator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> ReportGenerator<S> {
    /// Creates a generator over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Trial balance for one period.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for a bad key.
    pub async fn trial_balance(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
    ) -> Result<TrialBalance, LedgerError> {
        let period = PeriodKey::new(year, month)?;
        self.trial_balance_range(tenant_id, period, period).await
    }

    /// Trial balance over `from..=to`: opening at the start of `from`,
    /// summed movement, closing at the end of `to`.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` if `from` is after `to`.
    pub async fn trial_balance_range(
        &self,
        tenant_id: TenantId,
        from: PeriodKey,
        to: PeriodKey,
    ) -> Result<TrialBalance, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidPeriod(format!(
                "range start {from} is after end {to}"
            )));
        }

        let mut tx = self.store.begin().await?;
        let accounts = tx.list_accounts(tenant_id, &AccountFilter::default()).await?;
        let opening = closing_pairs(&tx.latest_balances_through(tenant_id, from.prev()).await?);
        let mut movement = Pairs::new();
        let mut period = from;
        while period <= to {
            add_movements(&mut movement, &tx.period_balances(tenant_id, period).await?);
            period = period.next();
        }
        let closing = closing_pairs(&tx.latest_balances_through(tenant_id, to).await?);

        let report = ReportBuilder::trial_balance(
            tenant_id, from, to, accounts, &opening, &movement, &closing,
        );
        if !report.totals.is_balanced {
            tracing::warn!(
                tenant_id = %tenant_id,
                from = %from,
                to = %to,
                closing_debit = %report.totals.closing_debit,
                closing_credit = %report.totals.closing_credit,
                "trial balance does not balance"
            );
        }
        Ok(report)
    }

    /// Balance sheet from closing balances at the end of a period.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for a bad key.
    pub async fn balance_sheet(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
    ) -> Result<BalanceSheet, LedgerError> {
        let trial_balance = self.trial_balance(tenant_id, year, month).await?;
        let sheet = ReportBuilder::balance_sheet(&trial_balance);
        if !sheet.is_balanced {
            tracing::warn!(
                tenant_id = %tenant_id,
                year,
                month,
                total_assets = %sheet.total_assets,
                liabilities_and_equity = %sheet.liabilities_and_equity,
                "balance sheet does not balance"
            );
        }
        Ok(sheet)
    }

    /// Income statement from movements over `from..=to`.
    ///
    /// A span that includes a year-end closing voucher nets revenue and
    /// expenses of that year to zero.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` if `from` is after `to`.
    pub async fn income_statement(
        &self,
        tenant_id: TenantId,
        from: PeriodKey,
        to: PeriodKey,
    ) -> Result<IncomeStatement, LedgerError> {
        let trial_balance = self.trial_balance_range(tenant_id, from, to).await?;
        Ok(ReportBuilder::income_statement(&trial_balance))
    }
}
