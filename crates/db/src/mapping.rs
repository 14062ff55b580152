//! Conversions between entity models and ledger domain values.
//!
//! Reads fail with `StoreError::Corrupt` when a column holds a value the
//! domain cannot represent; writes build fully-set active models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use ledgerline_core::accounts::{self, Account};
use ledgerline_core::fiscal::{self, FiscalPeriod, PeriodKey};
use ledgerline_core::ledger::LedgerBalance;
use ledgerline_core::store::StoreError;
use ledgerline_core::voucher::{self, AuditStamp, Voucher, VoucherEntry, VoucherReference};
use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{
    AccountId, FiscalPeriodId, TenantId, UserId, VoucherEntryId, VoucherId,
};

use crate::entities::sea_orm_active_enums::{
    AccountNature, AccountType, FiscalPeriodStatus, VoucherStatus, VoucherType,
};
use crate::entities::{
    accounts as account_rows, fiscal_periods, ledger_balances, tenant_settings, voucher_entries,
    vouchers,
};

// ============================================================================
// Enums
// ============================================================================

impl From<AccountType> for accounts::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<accounts::AccountType> for AccountType {
    fn from(value: accounts::AccountType) -> Self {
        match value {
            accounts::AccountType::Asset => Self::Asset,
            accounts::AccountType::Liability => Self::Liability,
            accounts::AccountType::Equity => Self::Equity,
            accounts::AccountType::Revenue => Self::Revenue,
            accounts::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountNature> for accounts::Nature {
    fn from(value: AccountNature) -> Self {
        match value {
            AccountNature::Debit => Self::Debit,
            AccountNature::Credit => Self::Credit,
        }
    }
}

impl From<accounts::Nature> for AccountNature {
    fn from(value: accounts::Nature) -> Self {
        match value {
            accounts::Nature::Debit => Self::Debit,
            accounts::Nature::Credit => Self::Credit,
        }
    }
}

impl From<FiscalPeriodStatus> for fiscal::FiscalPeriodStatus {
    fn from(value: FiscalPeriodStatus) -> Self {
        match value {
            FiscalPeriodStatus::Open => Self::Open,
            FiscalPeriodStatus::Closed => Self::Closed,
            FiscalPeriodStatus::Locked => Self::Locked,
        }
    }
}

impl From<fiscal::FiscalPeriodStatus> for FiscalPeriodStatus {
    fn from(value: fiscal::FiscalPeriodStatus) -> Self {
        match value {
            fiscal::FiscalPeriodStatus::Open => Self::Open,
            fiscal::FiscalPeriodStatus::Closed => Self::Closed,
            fiscal::FiscalPeriodStatus::Locked => Self::Locked,
        }
    }
}

impl From<VoucherType> for voucher::VoucherType {
    fn from(value: VoucherType) -> Self {
        match value {
            VoucherType::General => Self::General,
            VoucherType::Sales => Self::Sales,
            VoucherType::Purchase => Self::Purchase,
            VoucherType::Payment => Self::Payment,
            VoucherType::Receipt => Self::Receipt,
        }
    }
}

impl From<voucher::VoucherType> for VoucherType {
    fn from(value: voucher::VoucherType) -> Self {
        match value {
            voucher::VoucherType::General => Self::General,
            voucher::VoucherType::Sales => Self::Sales,
            voucher::VoucherType::Purchase => Self::Purchase,
            voucher::VoucherType::Payment => Self::Payment,
            voucher::VoucherType::Receipt => Self::Receipt,
        }
    }
}

impl From<VoucherStatus> for voucher::VoucherStatus {
    fn from(value: VoucherStatus) -> Self {
        match value {
            VoucherStatus::Draft => Self::Draft,
            VoucherStatus::Pending => Self::Pending,
            VoucherStatus::Approved => Self::Approved,
            VoucherStatus::Posted => Self::Posted,
            VoucherStatus::Rejected => Self::Rejected,
            VoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<voucher::VoucherStatus> for VoucherStatus {
    fn from(value: voucher::VoucherStatus) -> Self {
        match value {
            voucher::VoucherStatus::Draft => Self::Draft,
            voucher::VoucherStatus::Pending => Self::Pending,
            voucher::VoucherStatus::Approved => Self::Approved,
            voucher::VoucherStatus::Posted => Self::Posted,
            voucher::VoucherStatus::Rejected => Self::Rejected,
            voucher::VoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

// ============================================================================
// Scalars
// ============================================================================

fn unsigned(value: i32, column: &'static str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} is negative: {value}")))
}

fn period_key(year: i32, month: i32) -> Result<PeriodKey, StoreError> {
    PeriodKey::new(year, unsigned(month, "period month")?)
        .map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn utc(at: DateTimeWithTimeZone) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

fn stamp(by: Option<Uuid>, at: Option<DateTimeWithTimeZone>) -> Option<AuditStamp> {
    match (by, at) {
        (Some(by), Some(at)) => Some(AuditStamp {
            by: UserId::from_uuid(by),
            at: utc(at),
        }),
        _ => None,
    }
}

fn stamp_by(stamp: Option<AuditStamp>) -> Option<Uuid> {
    stamp.map(|s| s.by.into_inner())
}

fn stamp_at(stamp: Option<AuditStamp>) -> Option<DateTimeWithTimeZone> {
    stamp.map(|s| s.at.into())
}

// ============================================================================
// Accounts
// ============================================================================

/// Maps an account row.
///
/// # Errors
///
/// `Corrupt` if the level is negative.
pub fn account_from_model(model: account_rows::Model) -> Result<Account, StoreError> {
    Ok(Account {
        id: AccountId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        nature: model.nature.into(),
        parent_id: model.parent_id.map(AccountId::from_uuid),
        level: unsigned(model.level, "account level")?,
        is_control: model.is_control,
        is_active: model.is_active,
        sort_order: model.sort_order,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

/// Active model with every column set from `account`.
#[must_use]
pub fn account_active_model(account: &Account) -> account_rows::ActiveModel {
    account_rows::ActiveModel {
        id: Set(account.id.into_inner()),
        tenant_id: Set(account.tenant_id.into_inner()),
        code: Set(account.code.clone()),
        name: Set(account.name.clone()),
        account_type: Set(account.account_type.into()),
        nature: Set(account.nature.into()),
        parent_id: Set(account.parent_id.map(AccountId::into_inner)),
        level: Set(account.level.cast_signed()),
        is_control: Set(account.is_control),
        is_active: Set(account.is_active),
        sort_order: Set(account.sort_order),
        created_at: Set(account.created_at.into()),
        updated_at: Set(account.updated_at.into()),
    }
}

// ============================================================================
// Fiscal periods
// ============================================================================

/// Maps a fiscal period row.
///
/// # Errors
///
/// `Corrupt` if the period number is outside 1-12.
pub fn period_from_model(model: fiscal_periods::Model) -> Result<FiscalPeriod, StoreError> {
    Ok(FiscalPeriod {
        id: FiscalPeriodId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        key: period_key(model.fiscal_year, model.period_number)?,
        name: model.name,
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status.into(),
        closed_by: model.closed_by.map(UserId::from_uuid),
        closed_at: model.closed_at.map(utc),
    })
}

/// Active model with every column set from `period`.
#[must_use]
pub fn period_active_model(period: &FiscalPeriod) -> fiscal_periods::ActiveModel {
    fiscal_periods::ActiveModel {
        id: Set(period.id.into_inner()),
        tenant_id: Set(period.tenant_id.into_inner()),
        fiscal_year: Set(period.key.year),
        period_number: Set(period.key.month.cast_signed()),
        name: Set(period.name.clone()),
        start_date: Set(period.start_date),
        end_date: Set(period.end_date),
        status: Set(period.status.into()),
        closed_by: Set(period.closed_by.map(UserId::into_inner)),
        closed_at: Set(period.closed_at.map(Into::into)),
    }
}

// ============================================================================
// Vouchers
// ============================================================================

/// Maps an entry row.
///
/// # Errors
///
/// `Corrupt` if the line number is negative.
pub fn entry_from_model(model: voucher_entries::Model) -> Result<VoucherEntry, StoreError> {
    Ok(VoucherEntry {
        id: VoucherEntryId::from_uuid(model.id),
        line_number: unsigned(model.line_number, "entry line number")?,
        account_id: AccountId::from_uuid(model.account_id),
        debit: model.debit,
        credit: model.credit,
        description: model.description,
    })
}

/// Active model for one entry of `voucher`.
#[must_use]
pub fn entry_active_model(voucher: &Voucher, entry: &VoucherEntry) -> voucher_entries::ActiveModel {
    voucher_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        tenant_id: Set(voucher.tenant_id.into_inner()),
        voucher_id: Set(voucher.id.into_inner()),
        line_number: Set(entry.line_number.cast_signed()),
        account_id: Set(entry.account_id.into_inner()),
        debit: Set(entry.debit),
        credit: Set(entry.credit),
        description: Set(entry.description.clone()),
    }
}

/// Maps a voucher header and its entry rows. Entries are sorted by line.
///
/// # Errors
///
/// `Corrupt` for a half-filled reference or a bad entry row.
pub fn voucher_from_model(
    model: vouchers::Model,
    entries: Vec<voucher_entries::Model>,
) -> Result<Voucher, StoreError> {
    let reference = match (model.reference_kind, model.reference_id) {
        (Some(kind), Some(id)) => Some(VoucherReference { kind, id }),
        (None, None) => None,
        _ => {
            return Err(StoreError::Corrupt(format!(
                "voucher {} has a half-filled reference",
                model.id
            )));
        }
    };
    let mut entries = entries
        .into_iter()
        .map(entry_from_model)
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.line_number);

    Ok(Voucher {
        id: VoucherId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        number: model.number,
        date: model.voucher_date,
        voucher_type: model.voucher_type.into(),
        status: model.status.into(),
        description: model.description,
        reference,
        total_debit: model.total_debit,
        total_credit: model.total_credit,
        is_reversal: model.is_reversal,
        reversal_of_id: model.reversal_of_id.map(VoucherId::from_uuid),
        reversed_by_id: model.reversed_by_id.map(VoucherId::from_uuid),
        rejection_reason: model.rejection_reason,
        created: AuditStamp {
            by: UserId::from_uuid(model.created_by),
            at: utc(model.created_at),
        },
        updated: stamp(model.updated_by, model.updated_at),
        submitted: stamp(model.submitted_by, model.submitted_at),
        approved: stamp(model.approved_by, model.approved_at),
        rejected: stamp(model.rejected_by, model.rejected_at),
        posted: stamp(model.posted_by, model.posted_at),
        cancelled: stamp(model.cancelled_by, model.cancelled_at),
        entries,
    })
}

/// Active model with every header column set from `voucher`.
#[must_use]
pub fn voucher_active_model(voucher: &Voucher) -> vouchers::ActiveModel {
    let (reference_kind, reference_id) = voucher
        .reference
        .clone()
        .map_or((None, None), |r| (Some(r.kind), Some(r.id)));
    vouchers::ActiveModel {
        id: Set(voucher.id.into_inner()),
        tenant_id: Set(voucher.tenant_id.into_inner()),
        number: Set(voucher.number.clone()),
        voucher_date: Set(voucher.date),
        voucher_type: Set(voucher.voucher_type.into()),
        status: Set(voucher.status.into()),
        description: Set(voucher.description.clone()),
        reference_kind: Set(reference_kind),
        reference_id: Set(reference_id),
        total_debit: Set(voucher.total_debit),
        total_credit: Set(voucher.total_credit),
        is_reversal: Set(voucher.is_reversal),
        reversal_of_id: Set(voucher.reversal_of_id.map(VoucherId::into_inner)),
        reversed_by_id: Set(voucher.reversed_by_id.map(VoucherId::into_inner)),
        rejection_reason: Set(voucher.rejection_reason.clone()),
        created_by: Set(voucher.created.by.into_inner()),
        created_at: Set(voucher.created.at.into()),
        updated_by: Set(stamp_by(voucher.updated)),
        updated_at: Set(stamp_at(voucher.updated)),
        submitted_by: Set(stamp_by(voucher.submitted)),
        submitted_at: Set(stamp_at(voucher.submitted)),
        approved_by: Set(stamp_by(voucher.approved)),
        approved_at: Set(stamp_at(voucher.approved)),
        rejected_by: Set(stamp_by(voucher.rejected)),
        rejected_at: Set(stamp_at(voucher.rejected)),
        posted_by: Set(stamp_by(voucher.posted)),
        posted_at: Set(stamp_at(voucher.posted)),
        cancelled_by: Set(stamp_by(voucher.cancelled)),
        cancelled_at: Set(stamp_at(voucher.cancelled)),
    }
}

/// Groups entry rows by voucher id.
#[must_use]
pub fn group_entries(
    rows: Vec<voucher_entries::Model>,
) -> HashMap<Uuid, Vec<voucher_entries::Model>> {
    let mut grouped: HashMap<Uuid, Vec<voucher_entries::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.voucher_id).or_default().push(row);
    }
    grouped
}

// ============================================================================
// Balances and settings
// ============================================================================

/// Maps a ledger balance row.
///
/// # Errors
///
/// `Corrupt` if the period month is outside 1-12.
pub fn balance_from_model(model: ledger_balances::Model) -> Result<LedgerBalance, StoreError> {
    Ok(LedgerBalance {
        tenant_id: TenantId::from_uuid(model.tenant_id),
        account_id: AccountId::from_uuid(model.account_id),
        period: period_key(model.period_year, model.period_month)?,
        opening_debit: model.opening_debit,
        opening_credit: model.opening_credit,
        period_debit: model.period_debit,
        period_credit: model.period_credit,
        closing_debit: model.closing_debit,
        closing_credit: model.closing_credit,
    })
}

/// Active model with every column set from `balance`, stamped now.
#[must_use]
pub fn balance_active_model(balance: &LedgerBalance) -> ledger_balances::ActiveModel {
    ledger_balances::ActiveModel {
        tenant_id: Set(balance.tenant_id.into_inner()),
        account_id: Set(balance.account_id.into_inner()),
        period_year: Set(balance.period.year),
        period_month: Set(balance.period.month.cast_signed()),
        opening_debit: Set(balance.opening_debit),
        opening_credit: Set(balance.opening_credit),
        period_debit: Set(balance.period_debit),
        period_credit: Set(balance.period_credit),
        closing_debit: Set(balance.closing_debit),
        closing_credit: Set(balance.closing_credit),
        updated_at: Set(Utc::now().into()),
    }
}

/// Maps a tenant settings row.
///
/// # Errors
///
/// `Corrupt` if a column is negative.
pub fn settings_from_model(model: tenant_settings::Model) -> Result<TenantSettings, StoreError> {
    Ok(TenantSettings {
        fiscal_year_start_month: unsigned(
            model.fiscal_year_start_month,
            "fiscal year start month",
        )?,
        decimal_precision: unsigned(model.decimal_precision, "decimal precision")?,
    })
}

/// Active model for a tenant's settings, stamped now.
#[must_use]
pub fn settings_active_model(
    tenant_id: TenantId,
    settings: TenantSettings,
) -> tenant_settings::ActiveModel {
    tenant_settings::ActiveModel {
        tenant_id: Set(tenant_id.into_inner()),
        fiscal_year_start_month: Set(settings.fiscal_year_start_month.cast_signed()),
        decimal_precision: Set(settings.decimal_precision.cast_signed()),
        updated_at: Set(Utc::now().into()),
    }
}
