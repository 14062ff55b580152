//! Postgres-backed ledger store.
//!
//! [`SeaOrmStore`] opens one database transaction per unit of work. Row
//! locks requested by the core become `FOR SHARE` / `FOR UPDATE` clauses,
//! so concurrent posts to the same balance rows serialize in the database.

use async_trait::async_trait;
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, SqlErr, Statement, TransactionTrait, Value,
};
use uuid::Uuid;

use ledgerline_core::accounts::{Account, AccountFilter};
use ledgerline_core::fiscal::{FiscalPeriod, PeriodKey};
use ledgerline_core::ledger::{LedgerBalance, PostedLine, PostedLineQuery};
use ledgerline_core::store::{
    AccountRepository, BalanceRepository, LedgerStore, LedgerTx, PeriodRepository, RowLock,
    SettingsRepository, StoreError, VoucherRepository,
};
use ledgerline_core::voucher::{Voucher, VoucherFilter, VoucherType};
use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{AccountId, PageRequest, TenantId, VoucherId};

use crate::entities::sea_orm_active_enums::{self as db_enums};
use crate::entities::{
    accounts, fiscal_periods, ledger_balances, tenant_settings, voucher_entries, vouchers,
};
use crate::mapping::{
    account_active_model, account_from_model, balance_active_model, balance_from_model,
    entry_active_model, group_entries, period_active_model, period_from_model,
    settings_active_model, settings_from_model, voucher_active_model, voucher_from_model,
};

const NEXT_SEQUENCE_SQL: &str = r"
INSERT INTO voucher_sequences (tenant_id, voucher_type, year, month, last_value)
VALUES ($1, CAST($2 AS voucher_type), $3, $4, 1)
ON CONFLICT (tenant_id, voucher_type, year, month)
DO UPDATE SET last_value = voucher_sequences.last_value + 1
RETURNING last_value
";

/// Held until the transaction ends. Serializes writers of one account's
/// balances even before its row for a period exists.
const ACCOUNT_BALANCE_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

const LATEST_BALANCES_SQL: &str = r"
SELECT DISTINCT ON (account_id) *
FROM ledger_balances
WHERE tenant_id = $1 AND (period_year, period_month) <= ($2, $3)
ORDER BY account_id, period_year DESC, period_month DESC
";

/// Maps a database error, keeping unique violations distinguishable.
fn db_err(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return StoreError::UniqueViolation(detail);
    }
    match err {
        DbErr::RecordNotFound(what) => StoreError::Missing(what),
        DbErr::RecordNotUpdated => StoreError::Missing("record not updated".to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

fn with_lock<E: EntityTrait>(select: Select<E>, lock: RowLock) -> Select<E> {
    match lock {
        RowLock::None => select,
        RowLock::Shared => select.lock_shared(),
        RowLock::Exclusive => select.lock_exclusive(),
    }
}

/// Balance rows strictly before `period`.
fn before(period: PeriodKey) -> Condition {
    Condition::any()
        .add(ledger_balances::Column::PeriodYear.lt(period.year))
        .add(
            Condition::all()
                .add(ledger_balances::Column::PeriodYear.eq(period.year))
                .add(ledger_balances::Column::PeriodMonth.lt(period.month.cast_signed())),
        )
}

/// Balance rows strictly after `period`.
fn after(period: PeriodKey) -> Condition {
    Condition::any()
        .add(ledger_balances::Column::PeriodYear.gt(period.year))
        .add(
            Condition::all()
                .add(ledger_balances::Column::PeriodYear.eq(period.year))
                .add(ledger_balances::Column::PeriodMonth.gt(period.month.cast_signed())),
        )
}

/// Vouchers with at least one entry on `account_id`.
fn touching_account(account_id: AccountId) -> sea_orm::sea_query::SimpleExpr {
    vouchers::Column::Id.in_subquery(
        Query::select()
            .column(voucher_entries::Column::VoucherId)
            .from(voucher_entries::Entity)
            .and_where(voucher_entries::Column::AccountId.eq(account_id.into_inner()))
            .to_owned(),
    )
}

/// Ledger store over a `SeaORM` connection pool.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    /// Creates a store over an established connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Inserts or replaces a tenant's settings.
    ///
    /// The ledger services only read settings; provisioning writes them here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn save_tenant_settings(
        &self,
        tenant_id: TenantId,
        settings: TenantSettings,
    ) -> Result<(), StoreError> {
        tenant_settings::Entity::insert(settings_active_model(tenant_id, settings))
            .on_conflict(
                OnConflict::column(tenant_settings::Column::TenantId)
                    .update_columns([
                        tenant_settings::Column::FiscalYearStartMonth,
                        tenant_settings::Column::DecimalPrecision,
                        tenant_settings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        tracing::info!(tenant_id = %tenant_id, "tenant settings saved");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for SeaOrmStore {
    type Tx = SeaOrmTx;

    async fn begin(&self) -> Result<SeaOrmTx, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(SeaOrmTx { txn })
    }
}

/// One database transaction. Dropping it rolls back.
pub struct SeaOrmTx {
    txn: DatabaseTransaction,
}

impl std::fmt::Debug for SeaOrmTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeaOrmTx").finish_non_exhaustive()
    }
}

impl SeaOrmTx {
    async fn load_entries(
        &self,
        voucher_ids: Vec<Uuid>,
        account_id: Option<AccountId>,
    ) -> Result<Vec<voucher_entries::Model>, StoreError> {
        if voucher_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut select = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::VoucherId.is_in(voucher_ids));
        if let Some(account_id) = account_id {
            select = select.filter(voucher_entries::Column::AccountId.eq(account_id.into_inner()));
        }
        select
            .order_by_asc(voucher_entries::Column::VoucherId)
            .order_by_asc(voucher_entries::Column::LineNumber)
            .all(&self.txn)
            .await
            .map_err(db_err)
    }

    async fn assemble(&self, headers: Vec<vouchers::Model>) -> Result<Vec<Voucher>, StoreError> {
        let ids = headers.iter().map(|h| h.id).collect();
        let mut entries = group_entries(self.load_entries(ids, None).await?);
        headers
            .into_iter()
            .map(|header| {
                let lines = entries.remove(&header.id).unwrap_or_default();
                voucher_from_model(header, lines)
            })
            .collect()
    }

    async fn insert_entries(&self, voucher: &Voucher) -> Result<(), StoreError> {
        if voucher.entries.is_empty() {
            return Ok(());
        }
        let rows = voucher
            .entries
            .iter()
            .map(|entry| entry_active_model(voucher, entry));
        voucher_entries::Entity::insert_many(rows)
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for SeaOrmTx {
    async fn find_account(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        accounts::Entity::find_by_id(id.into_inner())
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(account_from_model)
            .transpose()
    }

    async fn find_account_by_code(
        &mut self,
        tenant_id: TenantId,
        code: &str,
    ) -> Result<Option<Account>, StoreError> {
        accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounts::Column::Code.eq(code))
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(account_from_model)
            .transpose()
    }

    async fn find_accounts(
        &mut self,
        tenant_id: TenantId,
        ids: &[AccountId],
    ) -> Result<Vec<Account>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounts::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(account_from_model)
            .collect()
    }

    async fn list_accounts(
        &mut self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, StoreError> {
        let mut select =
            accounts::Entity::find().filter(accounts::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(account_type) = filter.account_type {
            select = select.filter(
                accounts::Column::AccountType.eq(db_enums::AccountType::from(account_type)),
            );
        }
        if let Some(is_active) = filter.is_active {
            select = select.filter(accounts::Column::IsActive.eq(is_active));
        }
        if let Some(parent_id) = filter.parent_id {
            select = select.filter(accounts::Column::ParentId.eq(parent_id.into_inner()));
        }
        select
            .order_by_asc(accounts::Column::Code)
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(account_from_model)
            .collect()
    }

    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError> {
        account_active_model(account)
            .insert(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_account(&mut self, account: &Account) -> Result<(), StoreError> {
        account_active_model(account)
            .update(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_account(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<(), StoreError> {
        let result = accounts::Entity::delete_many()
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounts::Column::Id.eq(id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(StoreError::Missing(format!("account {id}")));
        }
        Ok(())
    }

    async fn count_children(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<u64, StoreError> {
        accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounts::Column::ParentId.eq(id.into_inner()))
            .count(&self.txn)
            .await
            .map_err(db_err)
    }

    async fn count_entries(
        &mut self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<u64, StoreError> {
        voucher_entries::Entity::find()
            .filter(voucher_entries::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(voucher_entries::Column::AccountId.eq(id.into_inner()))
            .count(&self.txn)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl VoucherRepository for SeaOrmTx {
    async fn find_voucher(
        &mut self,
        tenant_id: TenantId,
        id: VoucherId,
        lock: RowLock,
    ) -> Result<Option<Voucher>, StoreError> {
        let select = vouchers::Entity::find_by_id(id.into_inner())
            .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()));
        let Some(header) = with_lock(select, lock)
            .one(&self.txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let entries = self.load_entries(vec![header.id], None).await?;
        voucher_from_model(header, entries).map(Some)
    }

    async fn list_vouchers(
        &mut self,
        tenant_id: TenantId,
        filter: &VoucherFilter,
        page: PageRequest,
    ) -> Result<(Vec<Voucher>, u64), StoreError> {
        let mut select =
            vouchers::Entity::find().filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(status) = filter.status {
            select =
                select.filter(vouchers::Column::Status.eq(db_enums::VoucherStatus::from(status)));
        }
        if let Some(voucher_type) = filter.voucher_type {
            let voucher_type = db_enums::VoucherType::from(voucher_type);
            select = select.filter(vouchers::Column::VoucherType.eq(voucher_type));
        }
        if let Some(from) = filter.date_from {
            select = select.filter(vouchers::Column::VoucherDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            select = select.filter(vouchers::Column::VoucherDate.lte(to));
        }
        if let Some(account_id) = filter.account_id {
            select = select.filter(touching_account(account_id));
        }

        let total = select.clone().count(&self.txn).await.map_err(db_err)?;
        let headers = select
            .order_by_desc(vouchers::Column::VoucherDate)
            .order_by_desc(vouchers::Column::Number)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok((self.assemble(headers).await?, total))
    }

    async fn insert_voucher(&mut self, voucher: &Voucher) -> Result<(), StoreError> {
        voucher_active_model(voucher)
            .insert(&self.txn)
            .await
            .map_err(db_err)?;
        self.insert_entries(voucher).await
    }

    async fn update_voucher(&mut self, voucher: &Voucher) -> Result<(), StoreError> {
        voucher_active_model(voucher)
            .update(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn replace_entries(&mut self, voucher: &Voucher) -> Result<(), StoreError> {
        voucher_entries::Entity::delete_many()
            .filter(voucher_entries::Column::VoucherId.eq(voucher.id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        self.insert_entries(voucher).await
    }

    async fn delete_voucher(
        &mut self,
        tenant_id: TenantId,
        id: VoucherId,
    ) -> Result<(), StoreError> {
        // Entries go with the header through ON DELETE CASCADE.
        let result = vouchers::Entity::delete_many()
            .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(vouchers::Column::Id.eq(id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(StoreError::Missing(format!("voucher {id}")));
        }
        Ok(())
    }

    async fn next_voucher_sequence(
        &mut self,
        tenant_id: TenantId,
        voucher_type: VoucherType,
        year: i32,
        month: u32,
    ) -> Result<u32, StoreError> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            NEXT_SEQUENCE_SQL,
            [
                Value::from(tenant_id.into_inner()),
                Value::from(voucher_type.as_str()),
                Value::from(year),
                Value::from(month.cast_signed()),
            ],
        );
        let row = self
            .txn
            .query_one(statement)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::Missing("voucher sequence row".to_string()))?;
        let value: i32 = row.try_get("", "last_value").map_err(db_err)?;
        tracing::debug!(
            tenant_id = %tenant_id,
            %voucher_type,
            year,
            month,
            value,
            "voucher sequence advanced"
        );
        u32::try_from(value)
            .map_err(|_| StoreError::Corrupt(format!("voucher sequence is negative: {value}")))
    }

    async fn posted_lines(
        &mut self,
        tenant_id: TenantId,
        query: &PostedLineQuery,
    ) -> Result<Vec<PostedLine>, StoreError> {
        let mut select = vouchers::Entity::find()
            .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(vouchers::Column::Status.eq(db_enums::VoucherStatus::Posted))
            .filter(vouchers::Column::VoucherDate.gte(query.from))
            .filter(vouchers::Column::VoucherDate.lte(query.to));
        if let Some(account_id) = query.account_id {
            select = select.filter(touching_account(account_id));
        }
        let headers = select
            .order_by_asc(vouchers::Column::VoucherDate)
            .order_by_asc(vouchers::Column::Number)
            .all(&self.txn)
            .await
            .map_err(db_err)?;

        let ids = headers.iter().map(|h| h.id).collect();
        let mut entries = group_entries(self.load_entries(ids, query.account_id).await?);
        let mut lines = Vec::new();
        for header in headers {
            let rows = entries.remove(&header.id).unwrap_or_default();
            let voucher = voucher_from_model(header, rows)?;
            for entry in voucher.entries {
                lines.push(PostedLine {
                    voucher_id: voucher.id,
                    voucher_number: voucher.number.clone(),
                    voucher_date: voucher.date,
                    voucher_description: voucher.description.clone(),
                    entry,
                });
            }
        }
        Ok(lines)
    }
}

#[async_trait]
impl BalanceRepository for SeaOrmTx {
    async fn find_balance(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
        lock: RowLock,
    ) -> Result<Option<LedgerBalance>, StoreError> {
        if lock == RowLock::Exclusive {
            self.txn
                .execute(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    ACCOUNT_BALANCE_LOCK_SQL,
                    [Value::from(format!("{tenant_id}:{account_id}"))],
                ))
                .await
                .map_err(db_err)?;
        }
        let select = ledger_balances::Entity::find()
            .filter(ledger_balances::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(ledger_balances::Column::AccountId.eq(account_id.into_inner()))
            .filter(ledger_balances::Column::PeriodYear.eq(period.year))
            .filter(ledger_balances::Column::PeriodMonth.eq(period.month.cast_signed()));
        with_lock(select, lock)
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(balance_from_model)
            .transpose()
    }

    async fn latest_balance_before(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
    ) -> Result<Option<LedgerBalance>, StoreError> {
        ledger_balances::Entity::find()
            .filter(ledger_balances::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(ledger_balances::Column::AccountId.eq(account_id.into_inner()))
            .filter(before(period))
            .order_by_desc(ledger_balances::Column::PeriodYear)
            .order_by_desc(ledger_balances::Column::PeriodMonth)
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(balance_from_model)
            .transpose()
    }

    async fn balances_after(
        &mut self,
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
        lock: RowLock,
    ) -> Result<Vec<LedgerBalance>, StoreError> {
        let select = ledger_balances::Entity::find()
            .filter(ledger_balances::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(ledger_balances::Column::AccountId.eq(account_id.into_inner()))
            .filter(after(period))
            .order_by_asc(ledger_balances::Column::PeriodYear)
            .order_by_asc(ledger_balances::Column::PeriodMonth);
        with_lock(select, lock)
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(balance_from_model)
            .collect()
    }

    async fn period_balances(
        &mut self,
        tenant_id: TenantId,
        period: PeriodKey,
    ) -> Result<Vec<LedgerBalance>, StoreError> {
        ledger_balances::Entity::find()
            .filter(ledger_balances::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(ledger_balances::Column::PeriodYear.eq(period.year))
            .filter(ledger_balances::Column::PeriodMonth.eq(period.month.cast_signed()))
            .order_by_asc(ledger_balances::Column::AccountId)
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(balance_from_model)
            .collect()
    }

    async fn latest_balances_through(
        &mut self,
        tenant_id: TenantId,
        period: PeriodKey,
    ) -> Result<Vec<LedgerBalance>, StoreError> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            LATEST_BALANCES_SQL,
            [
                Value::from(tenant_id.into_inner()),
                Value::from(period.year),
                Value::from(period.month.cast_signed()),
            ],
        );
        ledger_balances::Entity::find()
            .from_raw_sql(statement)
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(balance_from_model)
            .collect()
    }

    async fn upsert_balance(&mut self, balance: &LedgerBalance) -> Result<(), StoreError> {
        ledger_balances::Entity::insert(balance_active_model(balance))
            .on_conflict(
                OnConflict::columns([
                    ledger_balances::Column::TenantId,
                    ledger_balances::Column::AccountId,
                    ledger_balances::Column::PeriodYear,
                    ledger_balances::Column::PeriodMonth,
                ])
                .update_columns([
                    ledger_balances::Column::OpeningDebit,
                    ledger_balances::Column::OpeningCredit,
                    ledger_balances::Column::PeriodDebit,
                    ledger_balances::Column::PeriodCredit,
                    ledger_balances::Column::ClosingDebit,
                    ledger_balances::Column::ClosingCredit,
                    ledger_balances::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl PeriodRepository for SeaOrmTx {
    async fn find_period(
        &mut self,
        tenant_id: TenantId,
        key: PeriodKey,
        lock: RowLock,
    ) -> Result<Option<FiscalPeriod>, StoreError> {
        let select = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(fiscal_periods::Column::FiscalYear.eq(key.year))
            .filter(fiscal_periods::Column::PeriodNumber.eq(key.month.cast_signed()));
        with_lock(select, lock)
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(period_from_model)
            .transpose()
    }

    async fn list_periods(
        &mut self,
        tenant_id: TenantId,
        year: i32,
        lock: RowLock,
    ) -> Result<Vec<FiscalPeriod>, StoreError> {
        let select = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(fiscal_periods::Column::FiscalYear.eq(year))
            .order_by_asc(fiscal_periods::Column::PeriodNumber);
        with_lock(select, lock)
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(period_from_model)
            .collect()
    }

    async fn insert_period(&mut self, period: &FiscalPeriod) -> Result<(), StoreError> {
        period_active_model(period)
            .insert(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_period(&mut self, period: &FiscalPeriod) -> Result<(), StoreError> {
        period_active_model(period)
            .update(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for SeaOrmTx {
    async fn tenant_settings(
        &mut self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantSettings>, StoreError> {
        tenant_settings::Entity::find_by_id(tenant_id.into_inner())
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(settings_from_model)
            .transpose()
    }
}

#[async_trait]
impl LedgerTx for SeaOrmTx {
    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(db_err)
    }
}
