//! Fiscal period lifecycle.
//!
//! Close, reopen and year-end close lock the period rows they touch for
//! update. Posting holds the same rows shared, so a close waits for
//! in-flight posts and later posts see the new status.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{
    AccountId, FiscalPeriodId, TenantId, UserId, VoucherEntryId, VoucherId,
};

use crate::accounts::service::ensure_postable;
use crate::accounts::{Account, AccountFilter, AccountType};
use crate::error::LedgerError;
use crate::fiscal::calendar::{FiscalCalendar, PeriodKey};
use crate::fiscal::types::{FiscalPeriod, FiscalPeriodStatus, YearEndClose};
use crate::ledger::PostingEngine;
use crate::reports::builder::{Pairs, add_movements};
use crate::store::{
    AccountRepository, BalanceRepository, LedgerStore, LedgerTx, PeriodRepository, RowLock,
    VoucherRepository, resolve_settings,
};
use crate::voucher::numbering::allocate_number;
use crate::voucher::{
    AuditStamp, Voucher, VoucherEntry, VoucherReference, VoucherStatus, VoucherType,
};

/// Reference kind carried by closing vouchers.
pub const YEAR_END_CLOSE_REFERENCE: &str = "year_end_close";

/// Fiscal period operations for all tenants of a store.
#[derive(Debug)]
pub struct FiscalPeriodManager<S> {
    store: Arc<S>,
    defaults: TenantSettings,
}

impl<S> Clone for FiscalPeriodManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            defaults: self.defaults,
        }
    }
}

impl<S: LedgerStore> FiscalPeriodManager<S> {
    /// Creates the manager; `defaults` apply to tenants without stored settings.
    #[must_use]
    pub const fn new(store: Arc<S>, defaults: TenantSettings) -> Self {
        Self { store, defaults }
    }

    /// Creates the twelve periods of a fiscal year as open.
    ///
    /// Months that already exist are left as they are, so calling this
    /// again is harmless.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for a year out of range.
    pub async fn create_periods(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        year: i32,
    ) -> Result<Vec<FiscalPeriod>, LedgerError> {
        PeriodKey::new(year, 1)?;
        let mut tx = self.store.begin().await?;
        let settings = resolve_settings(&mut tx, tenant_id, self.defaults).await?;
        let calendar = FiscalCalendar::from_settings(&settings)?;

        let mut periods = tx.list_periods(tenant_id, year, RowLock::Exclusive).await?;
        let mut created = 0usize;
        for key in PeriodKey::year_periods(year) {
            if periods.iter().any(|p| p.key == key) {
                continue;
            }
            let (start_date, end_date) = calendar.date_range(key)?;
            let period = FiscalPeriod {
                id: FiscalPeriodId::new(),
                tenant_id,
                key,
                name: calendar.period_name(key),
                start_date,
                end_date,
                status: FiscalPeriodStatus::Open,
                closed_by: None,
                closed_at: None,
            };
            tx.insert_period(&period).await?;
            periods.push(period);
            created += 1;
        }
        tx.commit().await?;
        periods.sort_by_key(|p| p.key);

        if created > 0 {
            tracing::info!(
                tenant_id = %tenant_id,
                actor = %actor,
                year,
                created,
                "fiscal periods created"
            );
        }
        Ok(periods)
    }

    /// Fetches one period.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` or `PeriodNotFound`.
    pub async fn get_period(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
    ) -> Result<FiscalPeriod, LedgerError> {
        let key = PeriodKey::new(year, month)?;
        let mut tx = self.store.begin().await?;
        tx.find_period(tenant_id, key, RowLock::None)
            .await?
            .ok_or(LedgerError::PeriodNotFound(key))
    }

    /// The period a date falls in under the tenant's calendar.
    ///
    /// # Errors
    ///
    /// `PeriodNotFound` if that period was never created.
    pub async fn find_period_for_date(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
    ) -> Result<FiscalPeriod, LedgerError> {
        let mut tx = self.store.begin().await?;
        let settings = resolve_settings(&mut tx, tenant_id, self.defaults).await?;
        let key = FiscalCalendar::from_settings(&settings)?.period_of(date);
        tx.find_period(tenant_id, key, RowLock::None)
            .await?
            .ok_or(LedgerError::PeriodNotFound(key))
    }

    /// Periods of a fiscal year ordered by month.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_periods(
        &self,
        tenant_id: TenantId,
        year: i32,
    ) -> Result<Vec<FiscalPeriod>, LedgerError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_periods(tenant_id, year, RowLock::None).await?)
    }

    /// Open → Closed. Closed periods reject postings.
    ///
    /// # Errors
    ///
    /// `PeriodNotFound`, `PeriodAlreadyClosed` or `PeriodLocked`.
    pub async fn close(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        year: i32,
        month: u32,
    ) -> Result<FiscalPeriod, LedgerError> {
        let key = PeriodKey::new(year, month)?;
        let mut tx = self.store.begin().await?;
        let mut period = load_period(&mut tx, tenant_id, key).await?;
        match period.status {
            FiscalPeriodStatus::Open => {}
            FiscalPeriodStatus::Closed => return Err(LedgerError::PeriodAlreadyClosed(key)),
            FiscalPeriodStatus::Locked => return Err(LedgerError::PeriodLocked(key)),
        }

        period.status = FiscalPeriodStatus::Closed;
        period.closed_by = Some(actor);
        period.closed_at = Some(Utc::now());
        tx.update_period(&period).await?;
        tx.commit().await?;

        tracing::info!(tenant_id = %tenant_id, actor = %actor, year, month, "fiscal period closed");
        Ok(period)
    }

    /// Closed → Open. Locked periods stay locked.
    ///
    /// # Errors
    ///
    /// `PeriodNotFound`, `PeriodLocked`, or `PeriodNotClosed` for an open period.
    pub async fn reopen(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        year: i32,
        month: u32,
    ) -> Result<FiscalPeriod, LedgerError> {
        let key = PeriodKey::new(year, month)?;
        let mut tx = self.store.begin().await?;
        let mut period = load_period(&mut tx, tenant_id, key).await?;
        match period.status {
            FiscalPeriodStatus::Closed => {}
            FiscalPeriodStatus::Locked => return Err(LedgerError::PeriodLocked(key)),
            status @ FiscalPeriodStatus::Open => {
                return Err(LedgerError::PeriodNotClosed {
                    period: key,
                    status,
                });
            }
        }

        period.status = FiscalPeriodStatus::Open;
        tx.update_period(&period).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            year,
            month,
            "fiscal period reopened"
        );
        Ok(period)
    }

    /// Closes the net revenue and expense movement of `year` into a
    /// retained earnings account and locks the year's twelve periods.
    ///
    /// The closing voucher is dated the last day of the fiscal year and
    /// posted into period 12 even if that period is already closed. When
    /// the year has no net revenue or expense movement no voucher is
    /// posted, but the periods are still locked.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if any of the twelve periods is missing
    /// - `PeriodLocked` if the year was already closed
    /// - `AccountNotFound`, `InvalidType` (not equity),
    ///   `ControlAccountPosting` or `AccountInactive` for the target account
    pub async fn year_end_close(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        year: i32,
        retained_earnings_account_id: AccountId,
    ) -> Result<YearEndClose, LedgerError> {
        let last_period = PeriodKey::new(year, 12)?;
        let mut tx = self.store.begin().await?;

        let mut periods = tx.list_periods(tenant_id, year, RowLock::Exclusive).await?;
        if let Some(missing) = PeriodKey::year_periods(year)
            .into_iter()
            .find(|key| !periods.iter().any(|p| p.key == *key))
        {
            return Err(LedgerError::PeriodNotFound(missing));
        }
        if let Some(locked) = periods
            .iter()
            .find(|p| p.status == FiscalPeriodStatus::Locked)
        {
            return Err(LedgerError::PeriodLocked(locked.key));
        }

        let retained = tx
            .find_account(tenant_id, retained_earnings_account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(retained_earnings_account_id))?;
        if retained.account_type != AccountType::Equity {
            return Err(LedgerError::InvalidType {
                expected: AccountType::Equity,
                actual: retained.account_type,
            });
        }
        ensure_postable(&retained)?;

        let settings = resolve_settings(&mut tx, tenant_id, self.defaults).await?;
        let calendar = FiscalCalendar::from_settings(&settings)?;
        let (_, year_end) = calendar.year_range(year)?;

        let accounts: HashMap<AccountId, Account> = tx
            .list_accounts(tenant_id, &AccountFilter::default())
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        // Only this year's movement is closed. Balances carried in from a
        // year that was never closed belong to that year's own close.
        let mut movement = Pairs::new();
        for key in PeriodKey::year_periods(year) {
            add_movements(&mut movement, &tx.period_balances(tenant_id, key).await?);
        }

        let mut temporary: Vec<(&Account, Decimal)> = movement
            .iter()
            .filter_map(|(account_id, (debit, credit))| {
                let account = accounts.get(account_id)?;
                let net = *credit - *debit;
                (account.account_type.is_temporary() && !net.is_zero()).then_some((account, net))
            })
            .collect();
        temporary.sort_by(|a, b| a.0.code.cmp(&b.0.code));

        let stamp = AuditStamp::now(actor);
        let mut net_income = Decimal::ZERO;
        let mut lines = Vec::with_capacity(temporary.len() + 1);
        for (account, net) in &temporary {
            net_income += *net;
            let (debit, credit) = if net.is_sign_positive() {
                (*net, Decimal::ZERO)
            } else {
                (Decimal::ZERO, -*net)
            };
            lines.push((
                account.id,
                debit,
                credit,
                format!("Close {} {}", account.code, account.name),
            ));
        }
        if net_income > Decimal::ZERO {
            lines.push((retained.id, Decimal::ZERO, net_income, "Net income".to_string()));
        } else if net_income < Decimal::ZERO {
            lines.push((retained.id, -net_income, Decimal::ZERO, "Net loss".to_string()));
        }
        let entries: Vec<VoucherEntry> = (1u32..)
            .zip(lines)
            .map(|(line_number, (account_id, debit, credit, description))| VoucherEntry {
                id: VoucherEntryId::new(),
                line_number,
                account_id,
                debit,
                credit,
                description: Some(description),
            })
            .collect();

        let closing_voucher = if entries.is_empty() {
            None
        } else {
            let number =
                allocate_number(&mut tx, tenant_id, VoucherType::General, year_end).await?;
            let voucher = closing_voucher(tenant_id, number, year, year_end, stamp, entries);
            PostingEngine::apply_movements(&mut tx, tenant_id, last_period, &voucher.entries)
                .await?;
            tx.insert_voucher(&voucher).await?;
            Some(voucher)
        };

        for period in &mut periods {
            period.status = FiscalPeriodStatus::Locked;
            period.closed_by = Some(actor);
            period.closed_at = Some(stamp.at);
            tx.update_period(period).await?;
        }
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            year,
            net_income = %net_income,
            voucher_number = closing_voucher.as_ref().map(|v| v.number.as_str()),
            "fiscal year closed"
        );

        Ok(YearEndClose {
            year,
            retained_earnings_account_id,
            net_income,
            closing_voucher,
            locked_periods: periods.iter().map(|p| p.key).collect(),
        })
    }
}

async fn load_period<T: PeriodRepository + Send>(
    tx: &mut T,
    tenant_id: TenantId,
    key: PeriodKey,
) -> Result<FiscalPeriod, LedgerError> {
    tx.find_period(tenant_id, key, RowLock::Exclusive)
        .await?
        .ok_or(LedgerError::PeriodNotFound(key))
}

fn closing_voucher(
    tenant_id: TenantId,
    number: String,
    year: i32,
    date: NaiveDate,
    stamp: AuditStamp,
    entries: Vec<VoucherEntry>,
) -> Voucher {
    let total_debit = entries.iter().map(|e| e.debit).sum();
    let total_credit = entries.iter().map(|e| e.credit).sum();
    Voucher {
        id: VoucherId::new(),
        tenant_id,
        number,
        date,
        voucher_type: VoucherType::General,
        status: VoucherStatus::Posted,
        description: format!("Year-end closing FY{year}"),
        reference: Some(VoucherReference {
            kind: YEAR_END_CLOSE_REFERENCE.to_string(),
            id: year.to_string(),
        }),
        total_debit,
        total_credit,
        is_reversal: false,
        reversal_of_id: None,
        reversed_by_id: None,
        rejection_reason: None,
        created: stamp,
        updated: None,
        submitted: Some(stamp),
        approved: Some(stamp),
        rejected: None,
        posted: Some(stamp),
        cancelled: None,
        entries,
    }
}
