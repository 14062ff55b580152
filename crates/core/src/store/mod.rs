//! Persistence interface consumed by the ledger services.
//!
//! The core never talks to a database directly. Each aggregate has a
//! repository trait; a [`LedgerStore`] hands out [`LedgerTx`] values that
//! implement all of them inside one transaction. Dropping a transaction
//! without calling [`LedgerTx::commit`] discards its writes.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{AccountId, PageRequest, TenantId, VoucherId};

use crate::accounts::{Account, AccountFilter};
use crate::error::LedgerError;
use crate::fiscal::{FiscalPeriod, PeriodKey};
use crate::ledger::{LedgerBalance, PostedLine, PostedLineQuery};
use crate::voucher::{Voucher, VoucherFilter, VoucherType};

pub use memory::InMemoryStore;

/// Errors raised by a storage adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (connection, timeout, SQL error).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A stored row could not be mapped to a domain value.
    #[error("corrupt stored row: {0}")]
    Corrupt(String),

    /// A row expected by an update or delete is missing.
    #[error("row missing: {0}")]
    Missing(String),
}

/// Row lock taken by a read inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowLock {
    /// Plain read.
    #[default]
    None,
    /// Blocks exclusive lockers (`FOR SHARE`).
    Shared,
    /// Blocks all other lockers (`FOR UPDATE`).
    Exclusive,
}

/// Chart of accounts storage.
#[async_trait]
pub trait AccountRepository {
    /// Finds an account by id.
    async fn find_account(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError>;

    /// Finds an account by code.
    async fn find_account_by_code(
        &mut self,
        tenant_id: TenantId,
        code: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Finds all of the given accounts that exist.
    async fn find_accounts(
        &mut self,
        tenant_id: TenantId,
        ids: &[AccountId],
    ) -> Result<Vec<Account>, StoreError>;

    /// Lists accounts ordered by code.
    async fn list_accounts(
        &mut self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, StoreError>;

    /// Inserts a new account.
    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError>;

    /// Replaces an existing account.
    async fn update_account(&mut self, account: &Account) -> Result<(), StoreError>;

    /// Removes an account.
    async fn delete_account(&mut self, tenant_id: TenantId, id: AccountId)
    -> Result<(), StoreError>;

    /// Number of direct children.
    async fn count_children(&mut self, tenant_id: TenantId, id: AccountId)
    -> Result<u64, StoreError>;

    /// Number of voucher entries, in any status, that reference the account.
    async fn count_entries(&mut self, tenant_id: TenantId, id: AccountId)
    -> Result<u64, StoreError>;
}

/// Voucher aggregate storage. Entries are always read and written with their voucher.
#[async_trait]
pub trait VoucherRepository {
    /// Finds a voucher with its entries, taking `lock` on the header row.
    async fn find_voucher(
        &mut self,
        tenant_id: TenantId,
        id: VoucherId,
        lock: RowLock,
    ) -> Result<Option<Voucher>, StoreError>;

    /// Lists vouchers newest first and returns the total before paging.
    async fn list_vouchers(
        &mut self,
        tenant_id: TenantId,
        filter: &VoucherFilter,
        page: PageRequest,
    ) -> Result<(Vec<Voucher>, u64), StoreError>;

    /// Inserts a voucher and its entries.
    async fn insert_voucher(&mut self, voucher: &Voucher) -> Result<(), StoreError>;

    /// Updates header columns (status, totals, audit, links).
    async fn update_voucher(&mut self, voucher: &Voucher) -> Result<(), StoreError>;

    /// Discards the voucher's entries and inserts `voucher.entries`.
    async fn replace_entries(&mut self, voucher: &Voucher) -> Result<(), StoreError>;

    /// Removes a voucher and its entries.
    async fn delete_voucher(&mut self, tenant_id: TenantId, id: VoucherId)
    -> Result<(), StoreError>;

    /// Next number in the (tenant, type, calendar month) sequence, starting at 1.
    async fn next_voucher_sequence(
        &mut self,
        tenant_id: TenantId,
        voucher_type: VoucherType,
        year: i32,
        month: u32,
    ) -> Result<u32, StoreError>;

    /// Entries of posted vouchers in a date range, ordered by date, number, line.
    async fn posted_lines(
        &mut self,
        tenant_id: TenantId,
        query: &PostedLineQuery,
    ) -> Result<Vec<PostedLine>, StoreError>;
}

/// Ledger balance projection storage.
#[async_trait]
pub trait BalanceRepository {
    /// Finds the row for (account, period).
    async fn find_balance(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
        lock: RowLock,
    ) -> Result<Option<LedgerBalance>, StoreError>;

    /// Latest row for the account strictly before `period`.
    async fn latest_balance_before(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
    ) -> Result<Option<LedgerBalance>, StoreError>;

    /// Rows for the account strictly after `period`, ascending.
    async fn balances_after(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
        lock: RowLock,
    ) -> Result<Vec<LedgerBalance>, StoreError>;

    /// All rows of one period.
    async fn period_balances(
        &mut self,
        tenant_id: TenantId,
        period: PeriodKey,
    ) -> Result<Vec<LedgerBalance>, StoreError>;

    /// For each account, its latest row at or before `period`.
    async fn latest_balances_through(
        &mut self,
        tenant_id: TenantId,
        period: PeriodKey,
    ) -> Result<Vec<LedgerBalance>, StoreError>;

    /// Inserts or replaces the row for (account, period).
    async fn upsert_balance(&mut self, balance: &LedgerBalance) -> Result<(), StoreError>;
}

/// Fiscal period storage.
#[async_trait]
pub trait PeriodRepository {
    /// Finds a period, taking `lock` on its row.
    async fn find_period(
        &mut self,
        tenant_id: TenantId,
        key: PeriodKey,
        lock: RowLock,
    ) -> Result<Option<FiscalPeriod>, StoreError>;

    /// Periods of a fiscal year ordered by month, taking `lock` on each.
    async fn list_periods(
        &mut self,
        tenant_id: TenantId,
        year: i32,
        lock: RowLock,
    ) -> Result<Vec<FiscalPeriod>, StoreError>;

    /// Inserts a new period.
    async fn insert_period(&mut self, period: &FiscalPeriod) -> Result<(), StoreError>;

    /// Updates status and close audit.
    async fn update_period(&mut self, period: &FiscalPeriod) -> Result<(), StoreError>;
}

/// Tenant configuration, read-only to the core.
#[async_trait]
pub trait SettingsRepository {
    /// Stored settings, if the tenant has any.
    async fn tenant_settings(
        &mut self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantSettings>, StoreError>;
}

/// A unit of work spanning every repository.
#[async_trait]
pub trait LedgerTx:
    AccountRepository
    + VoucherRepository
    + BalanceRepository
    + PeriodRepository
    + SettingsRepository
    + Send
    + Sized
{
    /// Makes all writes of this transaction visible.
    async fn commit(self) -> Result<(), StoreError>;
}

/// Entry point to a storage backend.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Transaction type of this backend.
    type Tx: LedgerTx;

    /// Opens a transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// Tenant settings with the configured defaults filled in.
///
/// # Errors
///
/// `InvalidSettings` if the stored or default values are out of range.
pub async fn resolve_settings<T: SettingsRepository + Send>(
    tx: &mut T,
    tenant_id: TenantId,
    defaults: TenantSettings,
) -> Result<TenantSettings, LedgerError> {
    let settings = tx.tenant_settings(tenant_id).await?.unwrap_or(defaults);
    settings
        .validate()
        .map_err(|e| LedgerError::InvalidSettings(e.to_string()))?;
    Ok(settings)
}
