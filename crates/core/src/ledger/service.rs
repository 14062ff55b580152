//! Ledger reads and repair.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{AccountId, TenantId, UserId};

use crate::error::LedgerError;
use crate::fiscal::{FiscalCalendar, PeriodKey};
use crate::ledger::engine::PostingEngine;
use crate::ledger::types::{AccountLedger, AccountLedgerLine, LedgerBalance, PostedLineQuery};
use crate::store::{
    AccountRepository, BalanceRepository, LedgerStore, LedgerTx, VoucherRepository,
    resolve_settings,
};

/// Balance queries and recalculation.
#[derive(Debug)]
pub struct LedgerService<S> {
    store: Arc<S>,
    defaults: TenantSettings,
}

impl<S> Clone for LedgerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            defaults: self.defaults,
        }
    }
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates the service; `defaults` apply to tenants without stored settings.
    #[must_use]
    pub const fn new(store: Arc<S>, defaults: TenantSettings) -> Self {
        Self { store, defaults }
    }

    /// Rebuilds one period's balances from posted vouchers.
    ///
    /// Idempotent; safe to retry.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for a bad key, `AccountNotFound` for dangling entries.
    pub async fn recalculate(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<LedgerBalance>, LedgerError> {
        let period = PeriodKey::new(year, month)?;
        let mut tx = self.store.begin().await?;
        let settings = resolve_settings(&mut tx, tenant_id, self.defaults).await?;
        let calendar = FiscalCalendar::from_settings(&settings)?;

        let rows = PostingEngine::rebuild_period(&mut tx, tenant_id, period, &calendar).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            year,
            month,
            accounts = rows.len(),
            "period balances recalculated"
        );
        Ok(rows)
    }

    /// Stored rows of one period.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for a bad key.
    pub async fn get_period_balances(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
    ) -> Result<Vec<LedgerBalance>, LedgerError> {
        let period = PeriodKey::new(year, month)?;
        let mut tx = self.store.begin().await?;
        Ok(tx.period_balances(tenant_id, period).await?)
    }

    /// Opening balance at `from` and every posted line through `to`.
    ///
    /// # Errors
    ///
    /// `InvalidDate` if `from` is after `to`; `AccountNotFound`.
    pub async fn get_account_ledger(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AccountLedger, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidDate(format!(
                "start date {from} is after end date {to}"
            )));
        }

        let mut tx = self.store.begin().await?;
        let account = tx
            .find_account(tenant_id, account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        let settings = resolve_settings(&mut tx, tenant_id, self.defaults).await?;
        let calendar = FiscalCalendar::from_settings(&settings)?;

        // Closing of the previous period plus whatever was posted earlier in
        // the period that contains `from`.
        let period = calendar.period_of(from);
        let mut opening = tx
            .latest_balance_before(tenant_id, account_id, period)
            .await?
            .map_or(Decimal::ZERO, |b| b.closing_balance(account.nature));
        let (period_start, _) = calendar.date_range(period)?;
        if let Some(day_before) = from.pred_opt()
            && period_start <= day_before
        {
            let earlier = tx
                .posted_lines(
                    tenant_id,
                    &PostedLineQuery {
                        from: period_start,
                        to: day_before,
                        account_id: Some(account_id),
                    },
                )
                .await?;
            for line in earlier {
                opening += account.nature.signed(line.entry.debit, line.entry.credit);
            }
        }

        let lines = tx
            .posted_lines(
                tenant_id,
                &PostedLineQuery {
                    from,
                    to,
                    account_id: Some(account_id),
                },
            )
            .await?
            .into_iter()
            .map(|line| AccountLedgerLine {
                date: line.voucher_date,
                voucher_id: line.voucher_id,
                voucher_number: line.voucher_number,
                line_number: line.entry.line_number,
                description: line.entry.description.unwrap_or(line.voucher_description),
                debit: line.entry.debit,
                credit: line.entry.credit,
            })
            .collect();

        Ok(AccountLedger {
            account_id,
            code: account.code,
            name: account.name,
            nature: account.nature,
            from,
            to,
            opening_balance: opening,
            lines,
        })
    }
}
