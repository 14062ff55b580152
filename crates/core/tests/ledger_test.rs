//! Balance maintenance, recalculation and report scenarios.

mod common;

use rust_decimal_macros::dec;

use common::{Fixture, YEAR, date};
use ledgerline_core::LedgerError;
use ledgerline_core::accounts::{AccountType, Nature};
use ledgerline_core::fiscal::PeriodKey;
use ledgerline_core::ledger::LedgerBalance;

fn sorted(mut rows: Vec<LedgerBalance>) -> Vec<LedgerBalance> {
    rows.sort_by_key(|r| r.account_id);
    rows
}

#[tokio::test]
async fn test_later_periods_roll_forward_when_earlier_ones_change() {
    let fx = Fixture::new().await;
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let sales = fx.account("401", "Sales", AccountType::Revenue).await;

    fx.transfer(date(YEAR, 1, 5), cash.id, sales.id, dec!(100)).await;
    fx.transfer(date(YEAR, 3, 3), cash.id, sales.id, dec!(50)).await;

    let ledger = fx.core.ledger();
    let march = ledger.get_period_balances(fx.tenant, YEAR, 3).await.unwrap();
    let row = march.iter().find(|r| r.account_id == cash.id).unwrap();
    assert_eq!(row.opening_balance(Nature::Debit), dec!(100));
    assert_eq!(row.closing_balance(Nature::Debit), dec!(150));

    // A late January posting must flow into the March opening.
    fx.transfer(date(YEAR, 1, 20), cash.id, sales.id, dec!(10)).await;
    let march = ledger.get_period_balances(fx.tenant, YEAR, 3).await.unwrap();
    let row = march.iter().find(|r| r.account_id == cash.id).unwrap();
    assert_eq!(row.opening_balance(Nature::Debit), dec!(110));
    assert_eq!(row.period_debit, dec!(50));
    assert_eq!(row.closing_balance(Nature::Debit), dec!(160));

    let sales_row = march.iter().find(|r| r.account_id == sales.id).unwrap();
    assert_eq!(sales_row.closing_credit, dec!(160));
    assert!(sales_row.closing_debit.is_zero());

    assert!(ledger.get_period_balances(fx.tenant, YEAR, 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recalculate_reproduces_posted_balances() {
    let fx = Fixture::new().await;
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let rent = fx.account("501", "Rent", AccountType::Expense).await;
    let sales = fx.account("401", "Sales", AccountType::Revenue).await;

    fx.transfer(date(YEAR, 2, 1), cash.id, sales.id, dec!(900.50)).await;
    fx.transfer(date(YEAR, 2, 2), rent.id, cash.id, dec!(300.25)).await;
    fx.transfer(date(YEAR, 4, 2), rent.id, cash.id, dec!(300.25)).await;

    let ledger = fx.core.ledger();
    let before_feb = sorted(ledger.get_period_balances(fx.tenant, YEAR, 2).await.unwrap());
    let before_apr = sorted(ledger.get_period_balances(fx.tenant, YEAR, 4).await.unwrap());

    let first = sorted(ledger.recalculate(fx.tenant, fx.actor, YEAR, 2).await.unwrap());
    let second = sorted(ledger.recalculate(fx.tenant, fx.actor, YEAR, 2).await.unwrap());
    assert_eq!(first, second);
    assert_eq!(first, before_feb);

    let after_apr = sorted(ledger.get_period_balances(fx.tenant, YEAR, 4).await.unwrap());
    assert_eq!(after_apr, before_apr);
}

#[tokio::test]
async fn test_account_ledger_opens_mid_period() {
    let fx = Fixture::new().await;
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let sales = fx.account("401", "Sales", AccountType::Revenue).await;

    fx.transfer(date(YEAR, 1, 5), cash.id, sales.id, dec!(100)).await;
    fx.transfer(date(YEAR, 1, 20), cash.id, sales.id, dec!(10)).await;
    fx.transfer(date(YEAR, 3, 3), cash.id, sales.id, dec!(50)).await;

    let ledger = fx
        .core
        .ledger()
        .get_account_ledger(fx.tenant, cash.id, date(YEAR, 1, 10), date(YEAR, 3, 31))
        .await
        .unwrap();
    assert_eq!(ledger.code, "101");
    assert_eq!(ledger.opening_balance, dec!(100));
    assert_eq!(ledger.lines.len(), 2);
    assert_eq!(ledger.lines[0].date, date(YEAR, 1, 20));
    assert_eq!(ledger.total_debit(), dec!(60));
    assert_eq!(ledger.closing_balance(), dec!(160));

    let later = fx
        .core
        .ledger()
        .get_account_ledger(fx.tenant, cash.id, date(YEAR, 3, 1), date(YEAR, 3, 31))
        .await
        .unwrap();
    assert_eq!(later.opening_balance, dec!(110));

    assert!(matches!(
        fx.core
            .ledger()
            .get_account_ledger(fx.tenant, cash.id, date(YEAR, 3, 2), date(YEAR, 3, 1))
            .await,
        Err(LedgerError::InvalidDate(_))
    ));
}

#[tokio::test]
async fn test_ranged_reports_sum_movements() {
    let fx = Fixture::new().await;
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let sales = fx.account("401", "Sales", AccountType::Revenue).await;
    let rent = fx.account("501", "Rent", AccountType::Expense).await;

    fx.transfer(date(YEAR, 1, 5), cash.id, sales.id, dec!(1000)).await;
    fx.transfer(date(YEAR, 2, 5), rent.id, cash.id, dec!(400)).await;
    fx.transfer(date(YEAR, 3, 5), cash.id, sales.id, dec!(200)).await;

    let from = PeriodKey::new(YEAR, 2).unwrap();
    let to = PeriodKey::new(YEAR, 3).unwrap();
    let reports = fx.core.reports();

    let tb = reports.trial_balance_range(fx.tenant, from, to).await.unwrap();
    let cash_row = tb.rows.iter().find(|r| r.code == "101").unwrap();
    assert_eq!(cash_row.opening_debit, dec!(1000));
    assert_eq!(cash_row.period_debit, dec!(200));
    assert_eq!(cash_row.period_credit, dec!(400));
    assert_eq!(cash_row.closing_debit, dec!(800));
    assert!(tb.totals.is_balanced);

    let income = reports.income_statement(fx.tenant, from, to).await.unwrap();
    assert_eq!(income.revenue.total, dec!(200));
    assert_eq!(income.expenses.total, dec!(400));
    assert_eq!(income.net_income, dec!(-200));

    let whole = reports
        .income_statement(fx.tenant, PeriodKey::new(YEAR, 1).unwrap(), to)
        .await
        .unwrap();
    assert_eq!(whole.net_income, dec!(800));

    assert!(matches!(
        reports.trial_balance_range(fx.tenant, to, from).await,
        Err(LedgerError::InvalidPeriod(_))
    ));
}

#[tokio::test]
async fn test_tenants_do_not_see_each_other() {
    let fx = Fixture::new().await;
    let cash = fx.account("101", "Cash", AccountType::Asset).await;
    let sales = fx.account("401", "Sales", AccountType::Revenue).await;
    fx.transfer(date(YEAR, 1, 5), cash.id, sales.id, dec!(100)).await;

    let other = ledgerline_shared::types::TenantId::new();
    let tb = fx.core.reports().trial_balance(other, YEAR, 1).await.unwrap();
    assert!(tb.rows.is_empty());
    assert!(matches!(
        fx.core.accounts().get(other, cash.id).await,
        Err(LedgerError::AccountNotFound(_))
    ));
}
