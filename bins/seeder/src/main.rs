//! Database seeder for Ledgerline development and testing.
//!
//! Seeds a demo tenant with settings, a small chart of accounts, the
//! periods of the current fiscal year and a handful of posted vouchers.
//! Running it twice leaves an already-seeded tenant alone.
//!
//! Usage: cargo run --bin seeder

use chrono::{Days, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use ledgerline_core::LedgerCore;
use ledgerline_core::accounts::{AccountFilter, AccountType, NewAccount};
use ledgerline_core::fiscal::{FiscalCalendar, PeriodKey};
use ledgerline_core::voucher::{EntryInput, NewVoucher, VoucherType};
use ledgerline_db::{SeaOrmStore, connect};
use ledgerline_shared::types::{AccountId, TenantId, UserId};
use ledgerline_shared::{AppConfig, telemetry};

/// Demo tenant (consistent for all seeds).
const DEMO_TENANT_ID: Uuid = Uuid::from_u128(1);
/// Demo user (consistent for all seeds).
const DEMO_USER_ID: Uuid = Uuid::from_u128(2);

/// (code, name, type, parent code, control)
const CHART: &[(&str, &str, AccountType, Option<&str>, bool)] = &[
    ("1000", "Assets", AccountType::Asset, None, true),
    ("1100", "Cash", AccountType::Asset, Some("1000"), false),
    ("1200", "Accounts receivable", AccountType::Asset, Some("1000"), false),
    ("2000", "Liabilities", AccountType::Liability, None, true),
    ("2100", "Accounts payable", AccountType::Liability, Some("2000"), false),
    ("3000", "Equity", AccountType::Equity, None, true),
    ("3100", "Share capital", AccountType::Equity, Some("3000"), false),
    ("3200", "Retained earnings", AccountType::Equity, Some("3000"), false),
    ("4000", "Revenue", AccountType::Revenue, None, true),
    ("4100", "Sales", AccountType::Revenue, Some("4000"), false),
    ("5000", "Expenses", AccountType::Expense, None, true),
    ("5100", "Rent", AccountType::Expense, Some("5000"), false),
    ("5200", "Salaries", AccountType::Expense, Some("5000"), false),
];

/// (day offset into the year, type, description, debit code, credit code, amount)
const VOUCHERS: &[(u64, VoucherType, &str, &str, &str, i64)] = &[
    (0, VoucherType::Receipt, "Initial capital", "1100", "3100", 500_000),
    (9, VoucherType::Sales, "Invoice INV-001", "1200", "4100", 110_000),
    (20, VoucherType::Receipt, "Payment for INV-001", "1100", "1200", 60_000),
    (27, VoucherType::Payment, "Office rent", "5100", "1100", 25_000),
    (30, VoucherType::Payment, "Salaries", "5200", "1100", 40_000),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(&config.logging);

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let tenant = TenantId::from_uuid(DEMO_TENANT_ID);
    let actor = UserId::from_uuid(DEMO_USER_ID);
    let settings = config.ledger.tenant_defaults();

    let store = SeaOrmStore::new(db);
    store.save_tenant_settings(tenant, settings).await?;
    let core = LedgerCore::new(store, settings);

    if !core
        .accounts()
        .list(tenant, &AccountFilter::default())
        .await?
        .is_empty()
    {
        info!(tenant_id = %tenant, "Demo tenant already seeded, skipping");
        return Ok(());
    }

    let calendar = FiscalCalendar::from_settings(&settings)?;
    let year = calendar.period_of(Utc::now().date_naive()).year;
    let periods = core.periods().create_periods(tenant, actor, year).await?;
    info!(year, periods = periods.len(), "Seeded fiscal periods");

    let mut ids: Vec<(&str, AccountId)> = Vec::with_capacity(CHART.len());
    for &(code, name, account_type, parent, is_control) in CHART {
        let parent_id = parent.and_then(|p| lookup(&ids, p));
        let account = core
            .accounts()
            .create(
                tenant,
                actor,
                NewAccount {
                    code: code.to_string(),
                    name: name.to_string(),
                    account_type,
                    nature: None,
                    parent_id,
                    is_control,
                    sort_order: 0,
                },
            )
            .await?;
        ids.push((code, account.id));
    }
    info!(accounts = ids.len(), "Seeded chart of accounts");

    let (year_start, _) = calendar.date_range(PeriodKey::new(year, 1)?)?;
    let vouchers = core.vouchers();
    for &(offset, voucher_type, description, debit, credit, amount) in VOUCHERS {
        let (Some(debit_id), Some(credit_id)) = (lookup(&ids, debit), lookup(&ids, credit)) else {
            anyhow::bail!("voucher {description} references an unknown account");
        };
        let date = year_start
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| anyhow::anyhow!("date overflow seeding {description}"))?;
        let amount = Decimal::from(amount);

        let voucher = vouchers
            .create(
                tenant,
                actor,
                NewVoucher {
                    date,
                    voucher_type,
                    description: description.to_string(),
                    reference: None,
                    entries: vec![
                        EntryInput::debit(debit_id, amount),
                        EntryInput::credit(credit_id, amount),
                    ],
                },
            )
            .await?;
        vouchers.submit(tenant, actor, voucher.id).await?;
        vouchers.approve(tenant, actor, voucher.id).await?;
        let posted = vouchers.post(tenant, actor, voucher.id).await?;
        info!(number = %posted.number, %date, "Seeded voucher");
    }

    let trial_balance = core.reports().trial_balance(tenant, year, 1).await?;
    info!(
        closing_debit = %trial_balance.totals.closing_debit,
        closing_credit = %trial_balance.totals.closing_credit,
        balanced = trial_balance.totals.is_balanced,
        "Seeding complete"
    );
    Ok(())
}

fn lookup(ids: &[(&str, AccountId)], code: &str) -> Option<AccountId> {
    ids.iter().find(|(c, _)| *c == code).map(|(_, id)| *id)
}
