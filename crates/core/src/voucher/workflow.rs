//! Voucher state machine.
//!
//! Pure transition checks. Each successful check yields a
//! [`VoucherAction`] carrying the audit stamp; [`Voucher::apply`] writes
//! it onto the aggregate.

use ledgerline_shared::types::UserId;

use crate::error::LedgerError;
use crate::voucher::types::{AuditStamp, Voucher, VoucherStatus};

/// A validated transition with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherAction {
    /// Draft → Pending.
    Submit {
        /// Who and when.
        stamp: AuditStamp,
    },
    /// Pending → Approved.
    Approve {
        /// Who and when.
        stamp: AuditStamp,
    },
    /// Pending → Rejected.
    Reject {
        /// Who and when.
        stamp: AuditStamp,
        /// Why.
        reason: String,
    },
    /// Approved → Posted.
    Post {
        /// Who and when.
        stamp: AuditStamp,
    },
    /// Not yet posted → Cancelled.
    Cancel {
        /// Who and when.
        stamp: AuditStamp,
    },
}

impl VoucherAction {
    /// Status after the transition.
    #[must_use]
    pub const fn new_status(&self) -> VoucherStatus {
        match self {
            Self::Submit { .. } => VoucherStatus::Pending,
            Self::Approve { .. } => VoucherStatus::Approved,
            Self::Reject { .. } => VoucherStatus::Rejected,
            Self::Post { .. } => VoucherStatus::Posted,
            Self::Cancel { .. } => VoucherStatus::Cancelled,
        }
    }
}

/// Stateless transition rules.
pub struct VoucherWorkflow;

impl VoucherWorkflow {
    /// Draft → Pending.
    ///
    /// # Errors
    ///
    /// `CannotSubmit` unless the voucher is a draft.
    pub fn submit(current: VoucherStatus, by: UserId) -> Result<VoucherAction, LedgerError> {
        match current {
            VoucherStatus::Draft => Ok(VoucherAction::Submit {
                stamp: AuditStamp::now(by),
            }),
            status => Err(LedgerError::CannotSubmit { status }),
        }
    }

    /// Pending → Approved.
    ///
    /// # Errors
    ///
    /// `CannotApprove` unless the voucher is pending.
    pub fn approve(current: VoucherStatus, by: UserId) -> Result<VoucherAction, LedgerError> {
        match current {
            VoucherStatus::Pending => Ok(VoucherAction::Approve {
                stamp: AuditStamp::now(by),
            }),
            status => Err(LedgerError::CannotApprove { status }),
        }
    }

    /// Pending → Rejected, recording the reason.
    ///
    /// # Errors
    ///
    /// `CannotReject` unless pending; `ReasonRequired` for a blank reason.
    pub fn reject(
        current: VoucherStatus,
        by: UserId,
        reason: &str,
    ) -> Result<VoucherAction, LedgerError> {
        if current != VoucherStatus::Pending {
            return Err(LedgerError::CannotReject { status: current });
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::ReasonRequired);
        }
        Ok(VoucherAction::Reject {
            stamp: AuditStamp::now(by),
            reason: reason.to_string(),
        })
    }

    /// Approved → Posted.
    ///
    /// # Errors
    ///
    /// `CannotPost` unless approved.
    pub fn post(current: VoucherStatus, by: UserId) -> Result<VoucherAction, LedgerError> {
        match current {
            VoucherStatus::Approved => Ok(VoucherAction::Post {
                stamp: AuditStamp::now(by),
            }),
            status => Err(LedgerError::CannotPost { status }),
        }
    }

    /// Any status before posting → Cancelled.
    ///
    /// # Errors
    ///
    /// `CannotCancel` for posted or already cancelled vouchers.
    pub fn cancel(current: VoucherStatus, by: UserId) -> Result<VoucherAction, LedgerError> {
        match current {
            VoucherStatus::Draft
            | VoucherStatus::Pending
            | VoucherStatus::Approved
            | VoucherStatus::Rejected => Ok(VoucherAction::Cancel {
                stamp: AuditStamp::now(by),
            }),
            status => Err(LedgerError::CannotCancel { status }),
        }
    }

    /// Header and entries may change only in draft or rejected.
    ///
    /// # Errors
    ///
    /// `CannotEdit` otherwise.
    pub fn ensure_editable(current: VoucherStatus) -> Result<(), LedgerError> {
        if current.is_editable() {
            Ok(())
        } else {
            Err(LedgerError::CannotEdit { status: current })
        }
    }

    /// Deletion follows the edit rule.
    ///
    /// # Errors
    ///
    /// `CannotDelete` outside draft or rejected.
    pub fn ensure_deletable(current: VoucherStatus) -> Result<(), LedgerError> {
        if current.is_editable() {
            Ok(())
        } else {
            Err(LedgerError::CannotDelete { status: current })
        }
    }

    /// A voucher can be reversed once, only when posted, and never if it is
    /// itself a reversal.
    ///
    /// # Errors
    ///
    /// `AlreadyReversed` or `CannotReverse`.
    pub fn ensure_reversible(voucher: &Voucher) -> Result<(), LedgerError> {
        if let Some(reversed_by) = voucher.reversed_by_id {
            return Err(LedgerError::AlreadyReversed {
                voucher_id: voucher.id,
                reversed_by,
            });
        }
        if voucher.status != VoucherStatus::Posted || voucher.is_reversal {
            return Err(LedgerError::CannotReverse {
                status: voucher.status,
                is_reversal: voucher.is_reversal,
            });
        }
        Ok(())
    }

    /// Whether `from → to` is a transition of the workflow.
    ///
    /// Rejected → Draft is the implicit transition made by editing.
    #[must_use]
    pub fn is_valid_transition(from: VoucherStatus, to: VoucherStatus) -> bool {
        matches!(
            (from, to),
            (VoucherStatus::Draft, VoucherStatus::Pending)
                | (
                    VoucherStatus::Pending,
                    VoucherStatus::Approved | VoucherStatus::Rejected
                )
                | (VoucherStatus::Approved, VoucherStatus::Posted)
                | (VoucherStatus::Rejected, VoucherStatus::Draft)
                | (
                    VoucherStatus::Draft
                        | VoucherStatus::Pending
                        | VoucherStatus::Approved
                        | VoucherStatus::Rejected,
                    VoucherStatus::Cancelled
                )
        )
    }
}

impl Voucher {
    /// Writes a validated transition onto the voucher.
    pub fn apply(&mut self, action: VoucherAction) {
        self.status = action.new_status();
        match action {
            VoucherAction::Submit { stamp } => self.submitted = Some(stamp),
            VoucherAction::Approve { stamp } => self.approved = Some(stamp),
            VoucherAction::Reject { stamp, reason } => {
                self.rejected = Some(stamp);
                self.rejection_reason = Some(reason);
            }
            VoucherAction::Post { stamp } => self.posted = Some(stamp),
            VoucherAction::Cancel { stamp } => self.cancelled = Some(stamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_from_draft() {
        let action = VoucherWorkflow::submit(VoucherStatus::Draft, UserId::new()).unwrap();
        assert_eq!(action.new_status(), VoucherStatus::Pending);
    }

    #[test]
    fn test_submit_from_pending_fails() {
        let result = VoucherWorkflow::submit(VoucherStatus::Pending, UserId::new());
        assert!(matches!(
            result,
            Err(LedgerError::CannotSubmit {
                status: VoucherStatus::Pending
            })
        ));
    }

    #[test]
    fn test_reject_requires_pending_then_reason() {
        let user = UserId::new();
        assert!(matches!(
            VoucherWorkflow::reject(VoucherStatus::Draft, user, "bad"),
            Err(LedgerError::CannotReject { .. })
        ));
        assert!(matches!(
            VoucherWorkflow::reject(VoucherStatus::Pending, user, "   "),
            Err(LedgerError::ReasonRequired)
        ));
        let action =
            VoucherWorkflow::reject(VoucherStatus::Pending, user, " wrong account ").unwrap();
        assert_eq!(action.new_status(), VoucherStatus::Rejected);
        assert!(matches!(
            action,
            VoucherAction::Reject { ref reason, .. } if reason == "wrong account"
        ));
    }

    #[test]
    fn test_cancel_rules() {
        let user = UserId::new();
        assert!(VoucherWorkflow::cancel(VoucherStatus::Approved, user).is_ok());
        assert!(matches!(
            VoucherWorkflow::cancel(VoucherStatus::Posted, user),
            Err(LedgerError::CannotCancel { .. })
        ));
        assert!(matches!(
            VoucherWorkflow::cancel(VoucherStatus::Cancelled, user),
            Err(LedgerError::CannotCancel { .. })
        ));
    }

    #[test]
    fn test_editability() {
        assert!(VoucherWorkflow::ensure_editable(VoucherStatus::Draft).is_ok());
        assert!(VoucherWorkflow::ensure_editable(VoucherStatus::Rejected).is_ok());
        assert!(matches!(
            VoucherWorkflow::ensure_editable(VoucherStatus::Approved),
            Err(LedgerError::CannotEdit { .. })
        ));
        assert!(matches!(
            VoucherWorkflow::ensure_deletable(VoucherStatus::Posted),
            Err(LedgerError::CannotDelete { .. })
        ));
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(VoucherWorkflow::is_valid_transition(
            VoucherStatus::Draft,
            VoucherStatus::Pending
        ));
        assert!(VoucherWorkflow::is_valid_transition(
            VoucherStatus::Pending,
            VoucherStatus::Rejected
        ));
        assert!(!VoucherWorkflow::is_valid_transition(
            VoucherStatus::Draft,
            VoucherStatus::Posted
        ));
        assert!(!VoucherWorkflow::is_valid_transition(
            VoucherStatus::Posted,
            VoucherStatus::Cancelled
        ));
    }
}
