//! Voucher domain types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{AccountId, TenantId, UserId, VoucherEntryId, VoucherId};

/// Business category of a voucher. Each type has its own number sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
    /// General journal.
    General,
    /// Sales journal.
    Sales,
    /// Purchase journal.
    Purchase,
    /// Cash/bank disbursement.
    Payment,
    /// Cash/bank receipt.
    Receipt,
}

impl VoucherType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::Payment => "payment",
            Self::Receipt => "receipt",
        }
    }

    /// Parses a type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "general" => Some(Self::General),
            "sales" => Some(Self::Sales),
            "purchase" => Some(Self::Purchase),
            "payment" => Some(Self::Payment),
            "receipt" => Some(Self::Receipt),
            _ => None,
        }
    }

    /// Voucher number prefix.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::General => "GV",
            Self::Sales => "SV",
            Self::Purchase => "PV",
            Self::Payment => "PY",
            Self::Receipt => "RV",
        }
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voucher status in the approval workflow.
///
/// - Draft → Pending (submit)
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
/// - Approved → Posted (post)
/// - Draft | Pending | Approved | Rejected → Cancelled (cancel)
/// - Rejected → Draft (edit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Being prepared; editable.
    Draft,
    /// Submitted and awaiting approval.
    Pending,
    /// Approved and ready for posting.
    Approved,
    /// Applied to ledger balances (immutable).
    Posted,
    /// Sent back by the approver; editable.
    Rejected,
    /// Abandoned before posting (immutable).
    Cancelled,
}

impl VoucherStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Posted => "posted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "posted" => Some(Self::Posted),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if header and entries may be changed.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link to the source document a voucher was raised from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherReference {
    /// Kind of document (e.g., "invoice", "year_end_close").
    pub kind: String,
    /// Identifier of the document within its kind.
    pub id: String,
}

/// Who did something and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    /// Acting user.
    pub by: UserId,
    /// Time of the action.
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    /// Stamp for `by` at the current time.
    #[must_use]
    pub fn now(by: UserId) -> Self {
        Self { by, at: Utc::now() }
    }
}

/// One debit or credit line of a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherEntry {
    /// Unique identifier.
    pub id: VoucherEntryId,
    /// 1-based position within the voucher.
    pub line_number: u32,
    /// Target account.
    pub account_id: AccountId,
    /// Debit amount; zero when `credit` is set.
    pub debit: Decimal,
    /// Credit amount; zero when `debit` is set.
    pub credit: Decimal,
    /// Line memo.
    pub description: Option<String>,
}

/// A journal transaction and its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Unique identifier.
    pub id: VoucherId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Tenant-unique number, e.g. `GV-202603-0001`.
    pub number: String,
    /// Accounting date; selects the fiscal period.
    pub date: NaiveDate,
    /// Business category.
    pub voucher_type: VoucherType,
    /// Workflow status.
    pub status: VoucherStatus,
    /// Header memo.
    pub description: String,
    /// Optional source document link.
    pub reference: Option<VoucherReference>,
    /// Sum of entry debits.
    pub total_debit: Decimal,
    /// Sum of entry credits.
    pub total_credit: Decimal,
    /// True for vouchers produced by `reverse`.
    pub is_reversal: bool,
    /// Voucher this one reverses.
    pub reversal_of_id: Option<VoucherId>,
    /// Voucher that reversed this one.
    pub reversed_by_id: Option<VoucherId>,
    /// Reason given on the last rejection.
    pub rejection_reason: Option<String>,
    /// Creation audit.
    pub created: AuditStamp,
    /// Last edit audit.
    pub updated: Option<AuditStamp>,
    /// Submission audit.
    pub submitted: Option<AuditStamp>,
    /// Approval audit.
    pub approved: Option<AuditStamp>,
    /// Rejection audit.
    pub rejected: Option<AuditStamp>,
    /// Posting audit.
    pub posted: Option<AuditStamp>,
    /// Cancellation audit.
    pub cancelled: Option<AuditStamp>,
    /// Entries ordered by line number.
    pub entries: Vec<VoucherEntry>,
}

impl Voucher {
    /// Returns true once a reversal voucher points back at this one.
    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        self.reversed_by_id.is_some()
    }

    /// Returns true if debit and credit totals match.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// Entry input for create/update/replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
    /// Target account.
    pub account_id: AccountId,
    /// Debit amount (zero if credit).
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount (zero if debit).
    #[serde(default)]
    pub credit: Decimal,
    /// Line memo.
    #[serde(default)]
    pub description: Option<String>,
}

impl EntryInput {
    /// Debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Sets the line memo.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for creating a voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVoucher {
    /// Accounting date.
    pub date: NaiveDate,
    /// Business category.
    pub voucher_type: VoucherType,
    /// Header memo.
    pub description: String,
    /// Optional source document link.
    #[serde(default)]
    pub reference: Option<VoucherReference>,
    /// Entries; may be empty while the voucher is a draft.
    #[serde(default)]
    pub entries: Vec<EntryInput>,
}

/// Partial update of a voucher. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoucherUpdate {
    /// New accounting date.
    pub date: Option<NaiveDate>,
    /// New header memo.
    pub description: Option<String>,
    /// New reference; `Some(None)` clears it.
    pub reference: Option<Option<VoucherReference>>,
    /// Replacement entry set.
    pub entries: Option<Vec<EntryInput>>,
}

/// Filter for listing vouchers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoucherFilter {
    /// Only this status.
    pub status: Option<VoucherStatus>,
    /// Only this type.
    pub voucher_type: Option<VoucherType>,
    /// Dated on or after.
    pub date_from: Option<NaiveDate>,
    /// Dated on or before.
    pub date_to: Option<NaiveDate>,
    /// Having at least one entry on this account.
    pub account_id: Option<AccountId>,
}

impl VoucherFilter {
    /// Returns true if the voucher passes the filter.
    #[must_use]
    pub fn matches(&self, voucher: &Voucher) -> bool {
        self.status.is_none_or(|s| voucher.status == s)
            && self.voucher_type.is_none_or(|t| voucher.voucher_type == t)
            && self.date_from.is_none_or(|d| voucher.date >= d)
            && self.date_to.is_none_or(|d| voucher.date <= d)
            && self
                .account_id
                .is_none_or(|a| voucher.entries.iter().any(|e| e.account_id == a))
    }
}
