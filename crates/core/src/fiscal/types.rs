//! Fiscal period types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{AccountId, FiscalPeriodId, TenantId, UserId};

use crate::fiscal::calendar::PeriodKey;
use crate::voucher::Voucher;

/// Status of a fiscal period.
///
/// - Open → Closed (close)
/// - Closed → Open (reopen)
/// - Open | Closed → Locked (year-end close)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalPeriodStatus {
    /// Period accepts postings.
    Open,
    /// Period rejects postings but may be reopened.
    Closed,
    /// Period was locked by year-end close and can never reopen.
    Locked,
}

impl FiscalPeriodStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Locked => "locked",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "locked" => Some(Self::Locked),
            _ => None,
        }
    }
}

impl fmt::Display for FiscalPeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (year, month) accounting window of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Fiscal year and month.
    pub key: PeriodKey,
    /// Display name (e.g., "January 2026").
    pub name: String,
    /// First calendar date in the period.
    pub start_date: NaiveDate,
    /// Last calendar date in the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: FiscalPeriodStatus,
    /// Who last closed or locked the period.
    pub closed_by: Option<UserId>,
    /// When the period was last closed or locked.
    pub closed_at: Option<DateTime<Utc>>,
}

impl FiscalPeriod {
    /// Returns true if vouchers can be posted into this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == FiscalPeriodStatus::Open
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Outcome of a year-end close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearEndClose {
    /// Closed fiscal year.
    pub year: i32,
    /// Account that received the net result.
    pub retained_earnings_account_id: AccountId,
    /// Net income moved into retained earnings; negative for a loss.
    pub net_income: Decimal,
    /// Closing voucher, absent when every revenue and expense account was already zero.
    pub closing_voucher: Option<Voucher>,
    /// Periods now locked.
    pub locked_periods: Vec<PeriodKey>,
}
