//! Fiscal period lifecycle and year-end close.

mod common;

use rust_decimal_macros::dec;

use common::{Fixture, YEAR, date};
use ledgerline_core::LedgerCore;
use ledgerline_core::LedgerError;
use ledgerline_core::accounts::AccountType;
use ledgerline_core::fiscal::{FiscalPeriodStatus, PeriodKey};
use ledgerline_core::store::InMemoryStore;
use ledgerline_core::voucher::{EntryInput, VoucherStatus};
use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{TenantId, UserId};

#[tokio::test]
async fn test_create_periods_is_idempotent() {
    let fx = Fixture::new().await;
    let periods = fx.core.periods();
    let first = periods.list_periods(fx.tenant, YEAR).await.unwrap();
    let again = periods.create_periods(fx.tenant, fx.actor, YEAR).await.unwrap();

    assert_eq!(first.len(), 12);
    assert_eq!(again.len(), 12);
    let ids: Vec<_> = first.iter().map(|p| p.id).collect();
    let again_ids: Vec<_> = again.iter().map(|p| p.id).collect();
    assert_eq!(ids, again_ids);
    assert!(again.iter().all(|p| p.status == FiscalPeriodStatus::Open));
}

#[tokio::test]
async fn test_close_and_reopen_follow_status_rules() {
    let fx = Fixture::new().await;
    let periods = fx.core.periods();

    let closed = periods.close(fx.tenant, fx.actor, YEAR, 3).await.unwrap();
    assert_eq!(closed.status, FiscalPeriodStatus::Closed);
    assert_eq!(closed.closed_by, Some(fx.actor));
    assert!(matches!(
        periods.close(fx.tenant, fx.actor, YEAR, 3).await,
        Err(LedgerError::PeriodAlreadyClosed(_))
    ));

    let reopened = periods.reopen(fx.tenant, fx.actor, YEAR, 3).await.unwrap();
    assert_eq!(reopened.status, FiscalPeriodStatus::Open);
    assert!(matches!(
        periods.reopen(fx.tenant, fx.actor, YEAR, 3).await,
        Err(LedgerError::PeriodNotClosed { status: FiscalPeriodStatus::Open, .. })
    ));

    assert!(matches!(
        periods.close(fx.tenant, fx.actor, YEAR + 1, 1).await,
        Err(LedgerError::PeriodNotFound(_))
    ));
}

#[tokio::test]
async fn test_fiscal_year_starting_in_april() {
    let settings = TenantSettings {
        fiscal_year_start_month: 4,
        ..TenantSettings::default()
    };
    let core = LedgerCore::new(InMemoryStore::new(), settings);
    let tenant = TenantId::new();
    let actor = UserId::new();

    let periods = core.periods().create_periods(tenant, actor, YEAR).await.unwrap();
    assert_eq!(periods[0].start_date, date(YEAR, 4, 1));
    assert_eq!(periods[11].end_date, date(YEAR + 1, 3, 31));

    let february = core
        .periods()
        .find_period_for_date(tenant, date(YEAR + 1, 2, 10))
        .await
        .unwrap();
    assert_eq!(february.key, PeriodKey::new(YEAR, 11).unwrap());

    assert!(matches!(
        core.periods().find_period_for_date(tenant, date(YEAR, 3, 31)).await,
        Err(LedgerError::PeriodNotFound(key)) if key == PeriodKey::new(YEAR - 1, 12).unwrap()
    ));
}

#[tokio::test]
async fn test_year_end_close_moves_net_income_and_locks_the_year() {
    let fx = Fixture::new().await;
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let retained = fx.account("302", "Retained earnings", AccountType::Equity).await;
    let sales = fx.account("401", "Sales", AccountType::Revenue).await;
    let salaries = fx.account("501", "Salaries", AccountType::Expense).await;

    fx.transfer(date(YEAR, 3, 15), cash.id, sales.id, dec!(90000000)).await;
    fx.transfer(date(YEAR, 6, 30), salaries.id, cash.id, dec!(50000000)).await;

    let periods = fx.core.periods();
    let result = periods
        .year_end_close(fx.tenant, fx.actor, YEAR, retained.id)
        .await
        .unwrap();
    assert_eq!(result.net_income, dec!(40000000));
    assert_eq!(result.locked_periods.len(), 12);

    let voucher = result.closing_voucher.unwrap();
    assert_eq!(voucher.status, VoucherStatus::Posted);
    assert_eq!(voucher.date, date(YEAR, 12, 31));
    assert_eq!(voucher.total_debit, voucher.total_credit);
    let re_line = voucher.entries.iter().find(|e| e.account_id == retained.id).unwrap();
    assert_eq!(re_line.credit, dec!(40000000));
    let sales_line = voucher.entries.iter().find(|e| e.account_id == sales.id).unwrap();
    assert_eq!(sales_line.debit, dec!(90000000));

    let all = periods.list_periods(fx.tenant, YEAR).await.unwrap();
    assert!(all.iter().all(|p| p.status == FiscalPeriodStatus::Locked));
    assert!(matches!(
        periods.reopen(fx.tenant, fx.actor, YEAR, 3).await,
        Err(LedgerError::PeriodLocked(_))
    ));
    assert!(matches!(
        periods.year_end_close(fx.tenant, fx.actor, YEAR, retained.id).await,
        Err(LedgerError::PeriodLocked(_))
    ));

    let reports = fx.core.reports();
    let tb = reports.trial_balance(fx.tenant, YEAR, 12).await.unwrap();
    let sales_row = tb.rows.iter().find(|r| r.code == "401").unwrap();
    assert!(sales_row.closing_debit.is_zero() && sales_row.closing_credit.is_zero());

    let sheet = reports.balance_sheet(fx.tenant, YEAR, 12).await.unwrap();
    assert_eq!(sheet.total_assets, dec!(40000000));
    assert_eq!(sheet.total_equity, dec!(40000000));
    assert!(sheet.is_balanced);
}

#[tokio::test]
async fn test_year_end_close_uses_only_the_year_movement() {
    let fx = Fixture::new().await;
    fx.core
        .periods()
        .create_periods(fx.tenant, fx.actor, YEAR - 1)
        .await
        .unwrap();
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let retained = fx.account("302", "Retained earnings", AccountType::Equity).await;
    let sales = fx.account("401", "Sales", AccountType::Revenue).await;
    let salaries = fx.account("501", "Salaries", AccountType::Expense).await;

    fx.transfer(date(YEAR - 1, 5, 10), cash.id, sales.id, dec!(10000000)).await;
    fx.transfer(date(YEAR, 3, 15), cash.id, sales.id, dec!(90000000)).await;
    fx.transfer(date(YEAR, 6, 30), salaries.id, cash.id, dec!(50000000)).await;

    let periods = fx.core.periods();
    let current = periods
        .year_end_close(fx.tenant, fx.actor, YEAR, retained.id)
        .await
        .unwrap();
    assert_eq!(current.net_income, dec!(40000000));
    let voucher = current.closing_voucher.unwrap();
    let sales_line = voucher.entries.iter().find(|e| e.account_id == sales.id).unwrap();
    assert_eq!(sales_line.debit, dec!(90000000));
    let re_line = voucher.entries.iter().find(|e| e.account_id == retained.id).unwrap();
    assert_eq!(re_line.credit, dec!(40000000));

    let previous = periods
        .year_end_close(fx.tenant, fx.actor, YEAR - 1, retained.id)
        .await
        .unwrap();
    assert_eq!(previous.net_income, dec!(10000000));

    let tb = fx.core.reports().trial_balance(fx.tenant, YEAR, 12).await.unwrap();
    let sales_row = tb.rows.iter().find(|r| r.account_id == sales.id).unwrap();
    assert!(sales_row.closing_debit.is_zero() && sales_row.closing_credit.is_zero());
    let salaries_row = tb.rows.iter().find(|r| r.account_id == salaries.id).unwrap();
    assert!(salaries_row.closing_debit.is_zero() && salaries_row.closing_credit.is_zero());
    let re_row = tb.rows.iter().find(|r| r.account_id == retained.id).unwrap();
    assert_eq!(re_row.closing_credit, dec!(50000000));
    assert!(tb.totals.is_balanced);
}

#[tokio::test]
async fn test_stored_tenant_settings_override_defaults() {
    let store = InMemoryStore::new();
    let custom = TenantId::new();
    store
        .put_tenant_settings(
            custom,
            TenantSettings {
                fiscal_year_start_month: 4,
                decimal_precision: 0,
            },
        )
        .await;
    let core = LedgerCore::new(store, TenantSettings::default());
    let fx = Fixture::for_tenant(core.clone(), custom).await;
    let other = Fixture::for_tenant(core, TenantId::new()).await;

    // Stored settings: April year start, whole amounts only.
    let first = fx.core.periods().get_period(fx.tenant, YEAR, 1).await.unwrap();
    assert_eq!(first.start_date, date(YEAR, 4, 1));
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let sales = fx.account("401", "Sales", AccountType::Revenue).await;
    let fractional = vec![
        EntryInput::debit(cash.id, dec!(10.5)),
        EntryInput::credit(sales.id, dec!(10.5)),
    ];
    assert!(matches!(
        fx.try_draft(date(YEAR, 5, 10), fractional).await,
        Err(LedgerError::EntryInvalidAmount { line: 1, .. })
    ));
    fx.transfer(date(YEAR, 5, 10), cash.id, sales.id, dec!(10)).await;
    let may = fx.core.ledger().get_period_balances(fx.tenant, YEAR, 2).await.unwrap();
    assert_eq!(may.len(), 2);

    // Defaults: calendar year, two decimals.
    let first = other.core.periods().get_period(other.tenant, YEAR, 1).await.unwrap();
    assert_eq!(first.start_date, date(YEAR, 1, 1));
    let cash = other.account("101", "Cash", AccountType::Asset).await;
    let sales = other.account("401", "Sales", AccountType::Revenue).await;
    other.transfer(date(YEAR, 5, 10), cash.id, sales.id, dec!(10.5)).await;
    let may = other.core.ledger().get_period_balances(other.tenant, YEAR, 5).await.unwrap();
    assert_eq!(may.len(), 2);
}

#[tokio::test]
async fn test_year_end_close_validates_inputs() {
    let fx = Fixture::new().await;
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let retained = fx.account("302", "Retained earnings", AccountType::Equity).await;
    let periods = fx.core.periods();

    assert!(matches!(
        periods.year_end_close(fx.tenant, fx.actor, YEAR, cash.id).await,
        Err(LedgerError::InvalidType { expected: AccountType::Equity, actual: AccountType::Asset })
    ));
    assert!(matches!(
        periods.year_end_close(fx.tenant, fx.actor, YEAR + 1, retained.id).await,
        Err(LedgerError::PeriodNotFound(key)) if key == PeriodKey::new(YEAR + 1, 1).unwrap()
    ));

    // Nothing to close: no voucher, but the year is still locked.
    let result = periods
        .year_end_close(fx.tenant, fx.actor, YEAR, retained.id)
        .await
        .unwrap();
    assert!(result.closing_voucher.is_none());
    assert!(result.net_income.is_zero());
    let december = periods.get_period(fx.tenant, YEAR, 12).await.unwrap();
    assert_eq!(december.status, FiscalPeriodStatus::Locked);
    assert_eq!(december.closed_by, Some(fx.actor));
}
