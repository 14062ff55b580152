//! Ledger error taxonomy.
//!
//! Every failure the core can report is one variant of [`LedgerError`].
//! Callers switch on [`LedgerError::kind`] to pick a transport status and
//! on the variant itself for detail.

use rust_decimal::Decimal;
use thiserror::Error;

use ledgerline_shared::AppError;
use ledgerline_shared::types::{AccountId, VoucherId};

use crate::accounts::{AccountType, Nature};
use crate::fiscal::{FiscalPeriodStatus, PeriodKey};
use crate::store::StoreError;
use crate::voucher::VoucherStatus;

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is malformed or violates a bookkeeping rule.
    Validation,
    /// Current state does not permit the requested transition.
    Conflict,
    /// A referenced entity does not exist.
    NotFound,
    /// Storage or configuration failure.
    Internal,
}

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========================================================================
    // Validation
    // ========================================================================
    /// Debit and credit totals differ.
    #[error("Entries are unbalanced: debit {debit}, credit {credit}")]
    Unbalanced {
        /// Sum of debit amounts.
        debit: Decimal,
        /// Sum of credit amounts.
        credit: Decimal,
    },

    /// An entry amount is negative, two-sided, or too precise.
    #[error("Entry line {line} has an invalid amount: {reason}")]
    EntryInvalidAmount {
        /// 1-based line number.
        line: u32,
        /// What is wrong with the amount.
        reason: &'static str,
    },

    /// Both sides of an entry are zero.
    #[error("Entry line {line} has zero debit and zero credit")]
    EntryZeroAmount {
        /// 1-based line number.
        line: u32,
    },

    /// A voucher needs at least one entry.
    #[error("Voucher has no entries")]
    EmptyEntries,

    /// Account type conflicts with the expected type.
    #[error("Account type {actual} is not allowed here, expected {expected}")]
    InvalidType {
        /// Required type (the parent's type, or the type an operation needs).
        expected: AccountType,
        /// Type that was supplied.
        actual: AccountType,
    },

    /// Nature does not match the account type.
    #[error("Nature {nature} does not match account type {account_type}")]
    InvalidNature {
        /// Account type.
        account_type: AccountType,
        /// Requested nature.
        nature: Nature,
    },

    /// The new parent is the account itself or one of its descendants.
    #[error("Account {account_id} cannot be placed under {parent_id}: circular reference")]
    CircularReference {
        /// Account being moved.
        account_id: AccountId,
        /// Requested parent.
        parent_id: AccountId,
    },

    /// Account code format is invalid.
    #[error("Invalid account code: {0}")]
    InvalidCode(String),

    /// A date argument is invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A fiscal period key is malformed.
    #[error("Invalid fiscal period: {0}")]
    InvalidPeriod(String),

    /// A reason must be supplied.
    #[error("A reason is required")]
    ReasonRequired,

    // ========================================================================
    // Conflict
    // ========================================================================
    /// Voucher cannot be edited in its current status.
    #[error("Cannot edit voucher in status {status}")]
    CannotEdit {
        /// Current status.
        status: VoucherStatus,
    },

    /// Voucher cannot be submitted in its current status.
    #[error("Cannot submit voucher in status {status}")]
    CannotSubmit {
        /// Current status.
        status: VoucherStatus,
    },

    /// Voucher cannot be approved in its current status.
    #[error("Cannot approve voucher in status {status}")]
    CannotApprove {
        /// Current status.
        status: VoucherStatus,
    },

    /// Voucher cannot be rejected in its current status.
    #[error("Cannot reject voucher in status {status}")]
    CannotReject {
        /// Current status.
        status: VoucherStatus,
    },

    /// Voucher cannot be posted in its current status.
    #[error("Cannot post voucher in status {status}")]
    CannotPost {
        /// Current status.
        status: VoucherStatus,
    },

    /// Voucher cannot be cancelled in its current status.
    #[error("Cannot cancel voucher in status {status}")]
    CannotCancel {
        /// Current status.
        status: VoucherStatus,
    },

    /// Voucher cannot be reversed.
    #[error("Cannot reverse voucher in status {status} (reversal voucher: {is_reversal})")]
    CannotReverse {
        /// Current status.
        status: VoucherStatus,
        /// Whether the voucher is a reversal voucher.
        is_reversal: bool,
    },

    /// Voucher cannot be deleted in its current status.
    #[error("Cannot delete voucher in status {status}")]
    CannotDelete {
        /// Current status.
        status: VoucherStatus,
    },

    /// Voucher was already reversed.
    #[error("Voucher {voucher_id} was already reversed by {reversed_by}")]
    AlreadyReversed {
        /// Original voucher.
        voucher_id: VoucherId,
        /// Existing reversal voucher.
        reversed_by: VoucherId,
    },

    /// Entry targets a control account.
    #[error("Account {code} is a control account and cannot receive postings")]
    ControlAccountPosting {
        /// Account code.
        code: String,
    },

    /// Entry targets a deactivated account.
    #[error("Account {code} is inactive")]
    AccountInactive {
        /// Account code.
        code: String,
    },

    /// Account code already used by the tenant.
    #[error("Account code {0} already exists")]
    CodeExists(String),

    /// Account still has child accounts.
    #[error("Account {code} has child accounts")]
    HasChildren {
        /// Account code.
        code: String,
    },

    /// Account is referenced by voucher entries.
    #[error("Account {code} is referenced by {count} voucher entries")]
    HasEntries {
        /// Account code.
        code: String,
        /// Number of referencing entries.
        count: u64,
    },

    /// Period is already closed.
    #[error("Fiscal period {0} is already closed")]
    PeriodAlreadyClosed(PeriodKey),

    /// Period is locked by year-end close.
    #[error("Fiscal period {0} is locked")]
    PeriodLocked(PeriodKey),

    /// Period does not accept postings.
    #[error("Fiscal period {period} is {status}, postings require an open period")]
    PeriodNotOpen {
        /// Target period.
        period: PeriodKey,
        /// Current status.
        status: FiscalPeriodStatus,
    },

    /// Period must be closed for this operation.
    #[error("Fiscal period {period} is {status}, expected closed")]
    PeriodNotClosed {
        /// Target period.
        period: PeriodKey,
        /// Current status.
        status: FiscalPeriodStatus,
    },

    // ========================================================================
    // Not found
    // ========================================================================
    /// Account does not exist for the tenant.
    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    /// Parent account does not exist for the tenant.
    #[error("Parent account {0} not found")]
    ParentNotFound(AccountId),

    /// Voucher does not exist for the tenant.
    #[error("Voucher {0} not found")]
    VoucherNotFound(VoucherId),

    /// Fiscal period has not been created.
    #[error("Fiscal period {0} not found")]
    PeriodNotFound(PeriodKey),

    // ========================================================================
    // Internal
    // ========================================================================
    /// Tenant settings are out of range.
    #[error("Invalid tenant settings: {0}")]
    InvalidSettings(String),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unbalanced { .. }
            | Self::EntryInvalidAmount { .. }
            | Self::EntryZeroAmount { .. }
            | Self::EmptyEntries
            | Self::InvalidType { .. }
            | Self::InvalidNature { .. }
            | Self::CircularReference { .. }
            | Self::InvalidCode(_)
            | Self::InvalidDate(_)
            | Self::InvalidPeriod(_)
            | Self::ReasonRequired => ErrorKind::Validation,

            Self::CannotEdit { .. }
            | Self::CannotSubmit { .. }
            | Self::CannotApprove { .. }
            | Self::CannotReject { .. }
            | Self::CannotPost { .. }
            | Self::CannotCancel { .. }
            | Self::CannotReverse { .. }
            | Self::CannotDelete { .. }
            | Self::AlreadyReversed { .. }
            | Self::ControlAccountPosting { .. }
            | Self::AccountInactive { .. }
            | Self::CodeExists(_)
            | Self::HasChildren { .. }
            | Self::HasEntries { .. }
            | Self::PeriodAlreadyClosed(_)
            | Self::PeriodLocked(_)
            | Self::PeriodNotOpen { .. }
            | Self::PeriodNotClosed { .. } => ErrorKind::Conflict,

            Self::AccountNotFound(_)
            | Self::ParentNotFound(_)
            | Self::VoucherNotFound(_)
            | Self::PeriodNotFound(_) => ErrorKind::NotFound,

            Self::InvalidSettings(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unbalanced { .. } => "VOUCHER_UNBALANCED",
            Self::EntryInvalidAmount { .. } => "ENTRY_INVALID_AMOUNT",
            Self::EntryZeroAmount { .. } => "ENTRY_ZERO_AMOUNT",
            Self::EmptyEntries => "EMPTY_ENTRIES",
            Self::InvalidType { .. } => "INVALID_ACCOUNT_TYPE",
            Self::InvalidNature { .. } => "INVALID_ACCOUNT_NATURE",
            Self::CircularReference { .. } => "CIRCULAR_REFERENCE",
            Self::InvalidCode(_) => "INVALID_ACCOUNT_CODE",
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::CannotEdit { .. } => "CANNOT_EDIT",
            Self::CannotSubmit { .. } => "CANNOT_SUBMIT",
            Self::CannotApprove { .. } => "CANNOT_APPROVE",
            Self::CannotReject { .. } => "CANNOT_REJECT",
            Self::CannotPost { .. } => "CANNOT_POST",
            Self::CannotCancel { .. } => "CANNOT_CANCEL",
            Self::CannotReverse { .. } => "CANNOT_REVERSE",
            Self::CannotDelete { .. } => "CANNOT_DELETE",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
            Self::ControlAccountPosting { .. } => "CONTROL_ACCOUNT_POSTING",
            Self::AccountInactive { .. } => "ACCOUNT_INACTIVE",
            Self::CodeExists(_) => "ACCOUNT_CODE_EXISTS",
            Self::HasChildren { .. } => "ACCOUNT_HAS_CHILDREN",
            Self::HasEntries { .. } => "ACCOUNT_HAS_ENTRIES",
            Self::PeriodAlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::PeriodLocked(_) => "PERIOD_LOCKED",
            Self::PeriodNotOpen { .. } => "PERIOD_NOT_OPEN",
            Self::PeriodNotClosed { .. } => "PERIOD_NOT_CLOSED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::InvalidSettings(_) => "INVALID_SETTINGS",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }

    /// Name of the missing resource for not-found errors.
    const fn resource(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "account",
            Self::ParentNotFound(_) => "parent account",
            Self::VoucherNotFound(_) => "voucher",
            Self::PeriodNotFound(_) => "fiscal period",
            _ => "resource",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let code = err.error_code();
        match err.kind() {
            ErrorKind::Validation => Self::Validation {
                code,
                message: err.to_string(),
            },
            ErrorKind::Conflict => Self::Conflict {
                code,
                message: err.to_string(),
            },
            ErrorKind::NotFound => {
                tracing::debug!(error = %err, "not found");
                Self::NotFound(err.resource())
            }
            ErrorKind::Internal => {
                tracing::error!(error = %err, code, "internal ledger failure");
                Self::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unbalanced_carries_totals() {
        let err = LedgerError::Unbalanced {
            debit: dec!(100),
            credit: dec!(90),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.to_string(), "Entries are unbalanced: debit 100, credit 90");
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let err = LedgerError::CannotPost {
            status: VoucherStatus::Draft,
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "CANNOT_POST");
        assert_eq!(err.to_string(), "Cannot post voucher in status draft");
    }

    #[test]
    fn test_not_found_is_generic_for_callers() {
        let id = VoucherId::new();
        let app: AppError = LedgerError::VoucherNotFound(id).into();
        assert_eq!(app, AppError::NotFound("voucher"));
        assert!(!app.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_store_error_is_hidden_from_callers() {
        let err = LedgerError::from(StoreError::Backend(
            "relation \"vouchers\" does not exist".into(),
        ));
        assert_eq!(err.kind(), ErrorKind::Internal);
        let app: AppError = err.into();
        assert_eq!(app, AppError::Internal);
        assert!(!app.to_string().contains("vouchers"));
    }

    #[test]
    fn test_validation_keeps_detail_for_callers() {
        let app: AppError = LedgerError::Unbalanced {
            debit: dec!(100),
            credit: dec!(90),
        }
        .into();
        assert_eq!(app.error_code(), "VOUCHER_UNBALANCED");
        assert!(app.to_string().contains("debit 100, credit 90"));
    }
}
