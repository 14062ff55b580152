//! In-memory storage adapter.
//!
//! Transactions are fully serialised: `begin` takes an owned lock on the
//! whole state and works on a copy that `commit` writes back. Dropping the
//! transaction discards the copy.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{AccountId, PageRequest, TenantId, VoucherId};

use crate::accounts::{Account, AccountFilter};
use crate::fiscal::{FiscalPeriod, PeriodKey};
use crate::ledger::{LedgerBalance, PostedLine, PostedLineQuery};
use crate::store::{
    AccountRepository, BalanceRepository, LedgerStore, LedgerTx, PeriodRepository, RowLock,
    SettingsRepository, StoreError, VoucherRepository,
};
use crate::voucher::{Voucher, VoucherFilter, VoucherStatus, VoucherType};

type SequenceKey = (TenantId, VoucherType, i32, u32);

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: HashMap<(TenantId, AccountId), Account>,
    vouchers: HashMap<(TenantId, VoucherId), Voucher>,
    balances: BTreeMap<(TenantId, AccountId, PeriodKey), LedgerBalance>,
    periods: BTreeMap<(TenantId, PeriodKey), FiscalPeriod>,
    sequences: HashMap<SequenceKey, u32>,
    settings: HashMap<TenantId, TenantSettings>,
}

/// Storage adapter keeping everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores settings for a tenant, standing in for the tenant admin surface.
    pub async fn put_tenant_settings(&self, tenant_id: TenantId, settings: TenantSettings) {
        self.state.lock().await.settings.insert(tenant_id, settings);
    }
}

/// Transaction over an [`InMemoryStore`].
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx { guard, work })
    }
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn commit(self) -> Result<(), StoreError> {
        let Self { mut guard, work } = self;
        *guard = work;
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryTx {
    async fn find_account(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.work.accounts.get(&(tenant_id, id)).cloned())
    }

    async fn find_account_by_code(
        &mut self,
        tenant_id: TenantId,
        code: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .work
            .accounts
            .values()
            .find(|a| a.tenant_id == tenant_id && a.code == code)
            .cloned())
    }

    async fn find_accounts(
        &mut self,
        tenant_id: TenantId,
        ids: &[AccountId],
    ) -> Result<Vec<Account>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.work.accounts.get(&(tenant_id, *id)).cloned())
            .collect())
    }

    async fn list_accounts(
        &mut self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self
            .work
            .accounts
            .values()
            .filter(|a| a.tenant_id == tenant_id && filter.matches(a))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError> {
        let duplicate = self
            .work
            .accounts
            .values()
            .any(|a| a.tenant_id == account.tenant_id && a.code == account.code);
        if duplicate {
            return Err(StoreError::UniqueViolation(format!(
                "account code {}",
                account.code
            )));
        }
        self.work
            .accounts
            .insert((account.tenant_id, account.id), account.clone());
        Ok(())
    }

    async fn update_account(&mut self, account: &Account) -> Result<(), StoreError> {
        let duplicate = self.work.accounts.values().any(|a| {
            a.tenant_id == account.tenant_id && a.code == account.code && a.id != account.id
        });
        if duplicate {
            return Err(StoreError::UniqueViolation(format!(
                "account code {}",
                account.code
            )));
        }
        match self.work.accounts.get_mut(&(account.tenant_id, account.id)) {
            Some(slot) => {
                *slot = account.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(format!("account {}", account.id))),
        }
    }

    async fn delete_account(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<(), StoreError> {
        self.work
            .accounts
            .remove(&(tenant_id, id))
            .map(|_| ())
            .ok_or_else(|| StoreError::Missing(format!("account {id}")))
    }

    async fn count_children(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<u64, StoreError> {
        Ok(self
            .work
            .accounts
            .values()
            .filter(|a| a.tenant_id == tenant_id && a.parent_id == Some(id))
            .count() as u64)
    }

    async fn count_entries(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<u64, StoreError> {
        Ok(self
            .work
            .vouchers
            .values()
            .filter(|v| v.tenant_id == tenant_id)
            .flat_map(|v| v.entries.iter())
            .filter(|e| e.account_id == id)
            .count() as u64)
    }
}

#[async_trait]
impl VoucherRepository for MemoryTx {
    async fn find_voucher(
        &mut self,
        tenant_id: TenantId,
        id: VoucherId,
        _lock: RowLock,
    ) -> Result<Option<Voucher>, StoreError> {
        Ok(self.work.vouchers.get(&(tenant_id, id)).cloned())
    }

    async fn list_vouchers(
        &mut self,
        tenant_id: TenantId,
        filter: &VoucherFilter,
        page: PageRequest,
    ) -> Result<(Vec<Voucher>, u64), StoreError> {
        let mut vouchers: Vec<&Voucher> = self
            .work
            .vouchers
            .values()
            .filter(|v| v.tenant_id == tenant_id && filter.matches(v))
            .collect();
        vouchers.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.number.cmp(&a.number)));

        let total = vouchers.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let data = vouchers
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((data, total))
    }

    async fn insert_voucher(&mut self, voucher: &Voucher) -> Result<(), StoreError> {
        let duplicate = self
            .work
            .vouchers
            .values()
            .any(|v| v.tenant_id == voucher.tenant_id && v.number == voucher.number);
        if duplicate {
            return Err(StoreError::UniqueViolation(format!(
                "voucher number {}",
                voucher.number
            )));
        }
        self.work
            .vouchers
            .insert((voucher.tenant_id, voucher.id), voucher.clone());
        Ok(())
    }

    async fn update_voucher(&mut self, voucher: &Voucher) -> Result<(), StoreError> {
        let slot = self
            .work
            .vouchers
            .get_mut(&(voucher.tenant_id, voucher.id))
            .ok_or_else(|| StoreError::Missing(format!("voucher {}", voucher.id)))?;
        let entries = std::mem::take(&mut slot.entries);
        *slot = Voucher {
            entries,
            ..voucher.clone()
        };
        Ok(())
    }

    async fn replace_entries(&mut self, voucher: &Voucher) -> Result<(), StoreError> {
        let slot = self
            .work
            .vouchers
            .get_mut(&(voucher.tenant_id, voucher.id))
            .ok_or_else(|| StoreError::Missing(format!("voucher {}", voucher.id)))?;
        slot.entries.clone_from(&voucher.entries);
        Ok(())
    }

    async fn delete_voucher(
        &mut self,
        tenant_id: TenantId,
        id: VoucherId,
    ) -> Result<(), StoreError> {
        self.work
            .vouchers
            .remove(&(tenant_id, id))
            .map(|_| ())
            .ok_or_else(|| StoreError::Missing(format!("voucher {id}")))
    }

    async fn next_voucher_sequence(
        &mut self,
        tenant_id: TenantId,
        voucher_type: VoucherType,
        year: i32,
        month: u32,
    ) -> Result<u32, StoreError> {
        let counter = self
            .work
            .sequences
            .entry((tenant_id, voucher_type, year, month))
            .or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn posted_lines(
        &mut self,
        tenant_id: TenantId,
        query: &PostedLineQuery,
    ) -> Result<Vec<PostedLine>, StoreError> {
        let mut lines: Vec<PostedLine> = self
            .work
            .vouchers
            .values()
            .filter(|v| {
                v.tenant_id == tenant_id
                    && v.status == VoucherStatus::Posted
                    && v.date >= query.from
                    && v.date <= query.to
            })
            .flat_map(|v| {
                v.entries
                    .iter()
                    .filter(|e| query.account_id.is_none_or(|a| e.account_id == a))
                    .map(|e| PostedLine {
                        voucher_id: v.id,
                        voucher_number: v.number.clone(),
                        voucher_date: v.date,
                        voucher_description: v.description.clone(),
                        entry: e.clone(),
                    })
            })
            .collect();
        lines.sort_by(|a, b| {
            a.voucher_date
                .cmp(&b.voucher_date)
                .then_with(|| a.voucher_number.cmp(&b.voucher_number))
                .then_with(|| a.entry.line_number.cmp(&b.entry.line_number))
        });
        Ok(lines)
    }
}

#[async_trait]
impl BalanceRepository for MemoryTx {
    async fn find_balance(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
        _lock: RowLock,
    ) -> Result<Option<LedgerBalance>, StoreError> {
        Ok(self
            .work
            .balances
            .get(&(tenant_id, account_id, period))
            .cloned())
    }

    async fn latest_balance_before(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
    ) -> Result<Option<LedgerBalance>, StoreError> {
        Ok(self
            .work
            .balances
            .values()
            .filter(|b| b.tenant_id == tenant_id && b.account_id == account_id && b.period < period)
            .max_by_key(|b| b.period)
            .cloned())
    }

    async fn balances_after(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
        _lock: RowLock,
    ) -> Result<Vec<LedgerBalance>, StoreError> {
        let mut rows: Vec<LedgerBalance> = self
            .work
            .balances
            .values()
            .filter(|b| b.tenant_id == tenant_id && b.account_id == account_id && b.period > period)
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.period);
        Ok(rows)
    }

    async fn period_balances(
        &mut self,
        tenant_id: TenantId,
        period: PeriodKey,
    ) -> Result<Vec<LedgerBalance>, StoreError> {
        Ok(self
            .work
            .balances
            .values()
            .filter(|b| b.tenant_id == tenant_id && b.period == period)
            .cloned()
            .collect())
    }

    async fn latest_balances_through(
        &mut self,
        tenant_id: TenantId,
        period: PeriodKey,
    ) -> Result<Vec<LedgerBalance>, StoreError> {
        let mut latest: HashMap<AccountId, &LedgerBalance> = HashMap::new();
        for row in self
            .work
            .balances
            .values()
            .filter(|b| b.tenant_id == tenant_id && b.period <= period)
        {
            latest
                .entry(row.account_id)
                .and_modify(|current| {
                    if row.period > current.period {
                        *current = row;
                    }
                })
                .or_insert(row);
        }
        Ok(latest.into_values().cloned().collect())
    }

    async fn upsert_balance(&mut self, balance: &LedgerBalance) -> Result<(), StoreError> {
        self.work.balances.insert(
            (balance.tenant_id, balance.account_id, balance.period),
            balance.clone(),
        );
        Ok(())
    }
}

#[async_trait]
impl PeriodRepository for MemoryTx {
    async fn find_period(
        &mut self,
        tenant_id: TenantId,
        key: PeriodKey,
        _lock: RowLock,
    ) -> Result<Option<FiscalPeriod>, StoreError> {
        Ok(self.work.periods.get(&(tenant_id, key)).cloned())
    }

    async fn list_periods(
        &mut self,
        tenant_id: TenantId,
        year: i32,
        _lock: RowLock,
    ) -> Result<Vec<FiscalPeriod>, StoreError> {
        Ok(self
            .work
            .periods
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.key.year == year)
            .cloned()
            .collect())
    }

    async fn insert_period(&mut self, period: &FiscalPeriod) -> Result<(), StoreError> {
        let key = (period.tenant_id, period.key);
        if self.work.periods.contains_key(&key) {
            return Err(StoreError::UniqueViolation(format!(
                "fiscal period {}",
                period.key
            )));
        }
        self.work.periods.insert(key, period.clone());
        Ok(())
    }

    async fn update_period(&mut self, period: &FiscalPeriod) -> Result<(), StoreError> {
        let slot = self
            .work
            .periods
            .get_mut(&(period.tenant_id, period.key))
            .ok_or_else(|| StoreError::Missing(format!("fiscal period {}", period.key)))?;
        *slot = period.clone();
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for MemoryTx {
    async fn tenant_settings(
        &mut self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantSettings>, StoreError> {
        Ok(self.work.settings.get(&tenant_id).copied())
    }
}
