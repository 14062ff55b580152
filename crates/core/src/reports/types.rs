//! Report data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{AccountId, TenantId};

use crate::accounts::{AccountType, Nature};
use crate::fiscal::PeriodKey;

/// One account in a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Account nature.
    pub nature: Nature,
    /// Depth in the chart of accounts.
    pub level: u32,
    /// Whether the account is a control account.
    pub is_control: bool,
    /// Opening debit at the start of the span.
    pub opening_debit: Decimal,
    /// Opening credit at the start of the span.
    pub opening_credit: Decimal,
    /// Debits posted during the span.
    pub period_debit: Decimal,
    /// Credits posted during the span.
    pub period_credit: Decimal,
    /// Closing debit at the end of the span.
    pub closing_debit: Decimal,
    /// Closing credit at the end of the span.
    pub closing_credit: Decimal,
}

/// Column totals of a trial balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Sum of opening debits.
    pub opening_debit: Decimal,
    /// Sum of opening credits.
    pub opening_credit: Decimal,
    /// Sum of period debits.
    pub period_debit: Decimal,
    /// Sum of period credits.
    pub period_credit: Decimal,
    /// Sum of closing debits.
    pub closing_debit: Decimal,
    /// Sum of closing credits.
    pub closing_credit: Decimal,
    /// Whether every debit column equals its credit column.
    pub is_balanced: bool,
}

/// Trial balance over a span of periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Tenant.
    pub tenant_id: TenantId,
    /// First period, inclusive.
    pub from: PeriodKey,
    /// Last period, inclusive.
    pub to: PeriodKey,
    /// Rows ordered by account code.
    pub rows: Vec<TrialBalanceRow>,
    /// Column totals.
    pub totals: TrialBalanceTotals,
}

/// An account amount on a financial statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Amount on the section's normal side; negative when the account is
    /// on the other side.
    pub amount: Decimal,
}

/// Accounts of one type and their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSection {
    /// Account type of the section.
    pub account_type: AccountType,
    /// Section total.
    pub total: Decimal,
    /// Lines ordered by account code.
    pub lines: Vec<StatementLine>,
}

impl StatementSection {
    /// Empty section for `account_type`.
    #[must_use]
    pub const fn new(account_type: AccountType) -> Self {
        Self {
            account_type,
            total: Decimal::ZERO,
            lines: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, line: StatementLine) {
        self.total += line.amount;
        self.lines.push(line);
    }
}

/// Balance sheet at the end of a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Tenant.
    pub tenant_id: TenantId,
    /// Period whose closing balances are shown.
    pub as_of: PeriodKey,
    /// Asset accounts, debit balances.
    pub assets: StatementSection,
    /// Liability accounts, credit balances.
    pub liabilities: StatementSection,
    /// Equity accounts, credit balances.
    pub equity: StatementSection,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// Income statement over a span of periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    /// Tenant.
    pub tenant_id: TenantId,
    /// First period, inclusive.
    pub from: PeriodKey,
    /// Last period, inclusive.
    pub to: PeriodKey,
    /// Revenue accounts, credit movement.
    pub revenue: StatementSection,
    /// Expense accounts, debit movement.
    pub expenses: StatementSection,
    /// Revenue minus expenses.
    pub net_income: Decimal,
}
