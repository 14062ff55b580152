//! Ledger balance projection types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{AccountId, TenantId, VoucherId};

use crate::accounts::Nature;
use crate::fiscal::PeriodKey;
use crate::voucher::VoucherEntry;

/// Balance of one account in one fiscal period.
///
/// Derived from posted vouchers; never edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBalance {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Account.
    pub account_id: AccountId,
    /// Fiscal period.
    pub period: PeriodKey,
    /// Opening debit (carried from the previous period's closing).
    pub opening_debit: Decimal,
    /// Opening credit.
    pub opening_credit: Decimal,
    /// Debits posted in the period.
    pub period_debit: Decimal,
    /// Credits posted in the period.
    pub period_credit: Decimal,
    /// Closing debit.
    pub closing_debit: Decimal,
    /// Closing credit.
    pub closing_credit: Decimal,
}

/// A posted entry together with its voucher header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedLine {
    /// Voucher.
    pub voucher_id: VoucherId,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher date.
    pub voucher_date: NaiveDate,
    /// Voucher header memo.
    pub voucher_description: String,
    /// The entry.
    pub entry: VoucherEntry,
}

/// Query for posted lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedLineQuery {
    /// First voucher date, inclusive.
    pub from: NaiveDate,
    /// Last voucher date, inclusive.
    pub to: NaiveDate,
    /// Restrict to one account.
    pub account_id: Option<AccountId>,
}

/// One line of an account ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedgerLine {
    /// Voucher date.
    pub date: NaiveDate,
    /// Voucher.
    pub voucher_id: VoucherId,
    /// Voucher number.
    pub voucher_number: String,
    /// Entry line number.
    pub line_number: u32,
    /// Entry memo, falling back to the voucher memo.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// Posting history of one account over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedger {
    /// Account.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account nature.
    pub nature: Nature,
    /// First date, inclusive.
    pub from: NaiveDate,
    /// Last date, inclusive.
    pub to: NaiveDate,
    /// Balance at the start of `from`, in nature terms.
    pub opening_balance: Decimal,
    /// Posted lines ordered by date, voucher number and line.
    pub lines: Vec<AccountLedgerLine>,
}

impl AccountLedger {
    /// Sum of line debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of line credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Opening plus movement, in nature terms.
    #[must_use]
    pub fn closing_balance(&self) -> Decimal {
        self.opening_balance + self.nature.signed(self.total_debit(), self.total_credit())
    }
}
