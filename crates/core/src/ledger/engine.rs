//! Posting engine.
//!
//! Turns posted vouchers into balance rows. All functions work inside a
//! caller-owned transaction so that the voucher status change and the
//! balance updates commit together.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;

use ledgerline_shared::types::{AccountId, TenantId};

use crate::accounts::Account;
use crate::error::LedgerError;
use crate::fiscal::{FiscalCalendar, FiscalPeriod, PeriodKey};
use crate::ledger::balance::roll_forward;
use crate::ledger::types::{LedgerBalance, PostedLineQuery};
use crate::store::{
    AccountRepository, BalanceRepository, LedgerTx, PeriodRepository, RowLock, VoucherRepository,
};
use crate::voucher::{Voucher, VoucherEntry};

/// Debit and credit movement per account, ordered by account id.
///
/// The ordering fixes the order in which balance rows are locked.
type Movements = BTreeMap<AccountId, (Decimal, Decimal)>;

/// Stateless balance maintenance.
pub struct PostingEngine;

impl PostingEngine {
    /// Applies a voucher's entries to the balances of the period its date
    /// falls in.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the period was never created
    /// - `PeriodNotOpen` if it is closed or locked
    /// - `AccountNotFound` / `ControlAccountPosting` for bad targets
    pub async fn apply<T: LedgerTx>(
        tx: &mut T,
        voucher: &Voucher,
        calendar: &FiscalCalendar,
    ) -> Result<PeriodKey, LedgerError> {
        let period = calendar.period_of(voucher.date);
        Self::ensure_open(tx, voucher.tenant_id, period).await?;
        Self::apply_movements(tx, voucher.tenant_id, period, &voucher.entries).await?;
        Ok(period)
    }

    /// Fails unless `period` exists and is open. Holds a shared lock on the
    /// period row so a concurrent close waits for this transaction.
    ///
    /// # Errors
    ///
    /// `PeriodNotFound` or `PeriodNotOpen`.
    pub async fn ensure_open<T: LedgerTx>(
        tx: &mut T,
        tenant_id: TenantId,
        period: PeriodKey,
    ) -> Result<FiscalPeriod, LedgerError> {
        let row = tx
            .find_period(tenant_id, period, RowLock::Shared)
            .await?
            .ok_or(LedgerError::PeriodNotFound(period))?;
        if !row.is_open() {
            return Err(LedgerError::PeriodNotOpen {
                period,
                status: row.status,
            });
        }
        Ok(row)
    }

    /// Adds `entries` to the period's rows without checking period status.
    ///
    /// Year-end close uses this directly to post into a period it is about
    /// to lock.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` / `ControlAccountPosting`.
    pub async fn apply_movements<T: LedgerTx>(
        tx: &mut T,
        tenant_id: TenantId,
        period: PeriodKey,
        entries: &[VoucherEntry],
    ) -> Result<(), LedgerError> {
        let movements = aggregate(entries.iter());
        let accounts = load_accounts(tx, tenant_id, movements.keys().copied()).await?;
        for account in accounts.values() {
            if account.is_control {
                return Err(LedgerError::ControlAccountPosting {
                    code: account.code.clone(),
                });
            }
        }

        for (account_id, (debit, credit)) in movements {
            let Some(account) = accounts.get(&account_id) else {
                return Err(LedgerError::AccountNotFound(account_id));
            };
            let mut row = match tx
                .find_balance(tenant_id, account_id, period, RowLock::Exclusive)
                .await?
            {
                Some(row) => row,
                None => opened_row(tx, tenant_id, account, period).await?,
            };
            row.add_movement(account.nature, debit, credit);
            tx.upsert_balance(&row).await?;

            tracing::debug!(
                tenant_id = %tenant_id,
                account_id = %account_id,
                period = %period,
                debit = %debit,
                credit = %credit,
                closing = %row.closing_balance(account.nature),
                "balance updated"
            );

            carry_forward(tx, &row, account).await?;
        }
        Ok(())
    }

    /// Rebuilds every row of `period` from the posted vouchers dated in it,
    /// then re-chains later periods. Running it twice yields the same rows.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if a posted entry references a missing account.
    pub async fn rebuild_period<T: LedgerTx>(
        tx: &mut T,
        tenant_id: TenantId,
        period: PeriodKey,
        calendar: &FiscalCalendar,
    ) -> Result<Vec<LedgerBalance>, LedgerError> {
        let (from, to) = calendar.date_range(period)?;
        let lines = tx
            .posted_lines(
                tenant_id,
                &PostedLineQuery {
                    from,
                    to,
                    account_id: None,
                },
            )
            .await?;
        let mut movements = aggregate(lines.iter().map(|l| &l.entry));

        // Rows left over from entries that no longer count are reset to zero.
        for existing in tx.period_balances(tenant_id, period).await? {
            movements
                .entry(existing.account_id)
                .or_insert((Decimal::ZERO, Decimal::ZERO));
        }

        let accounts = load_accounts(tx, tenant_id, movements.keys().copied()).await?;
        let mut rebuilt = Vec::with_capacity(movements.len());
        for (account_id, (debit, credit)) in movements {
            let Some(account) = accounts.get(&account_id) else {
                return Err(LedgerError::AccountNotFound(account_id));
            };
            // Lock before rewriting so concurrent posts to the row wait.
            tx.find_balance(tenant_id, account_id, period, RowLock::Exclusive)
                .await?;
            let mut row = opened_row(tx, tenant_id, account, period).await?;
            row.add_movement(account.nature, debit, credit);
            tx.upsert_balance(&row).await?;
            carry_forward(tx, &row, account).await?;
            rebuilt.push(row);
        }
        Ok(rebuilt)
    }
}

fn aggregate<'a>(entries: impl Iterator<Item = &'a VoucherEntry>) -> Movements {
    let mut movements = Movements::new();
    for entry in entries {
        let slot = movements
            .entry(entry.account_id)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        slot.0 += entry.debit;
        slot.1 += entry.credit;
    }
    movements
}

async fn load_accounts<T: LedgerTx>(
    tx: &mut T,
    tenant_id: TenantId,
    ids: impl Iterator<Item = AccountId>,
) -> Result<HashMap<AccountId, Account>, LedgerError> {
    let ids: BTreeSet<AccountId> = ids.collect();
    let ids: Vec<AccountId> = ids.into_iter().collect();
    let found = tx.find_accounts(tenant_id, &ids).await?;
    let found: HashMap<AccountId, Account> = found.into_iter().map(|a| (a.id, a)).collect();
    if let Some(missing) = ids.iter().find(|id| !found.contains_key(id)) {
        return Err(LedgerError::AccountNotFound(*missing));
    }
    Ok(found)
}

/// Fresh row for `period`, opening at the latest earlier closing.
async fn opened_row<T: LedgerTx>(
    tx: &mut T,
    tenant_id: TenantId,
    account: &Account,
    period: PeriodKey,
) -> Result<LedgerBalance, LedgerError> {
    let opening = tx
        .latest_balance_before(tenant_id, account.id, period)
        .await?
        .map_or(Decimal::ZERO, |prev| prev.closing_balance(account.nature));
    Ok(LedgerBalance::opened(
        tenant_id,
        account.id,
        period,
        account.nature,
        opening,
    ))
}

async fn carry_forward<T: LedgerTx>(
    tx: &mut T,
    row: &LedgerBalance,
    account: &Account,
) -> Result<(), LedgerError> {
    let mut later = tx
        .balances_after(row.tenant_id, row.account_id, row.period, RowLock::Exclusive)
        .await?;
    if roll_forward(account.nature, row.closing_balance(account.nature), &mut later) {
        for next in &later {
            tx.upsert_balance(next).await?;
        }
    }
    Ok(())
}
