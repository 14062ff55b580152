//! Voucher aggregate.
//!
//! - `types` - Voucher, entries, statuses and inputs
//! - `validation` - Entry rules and totals
//! - `workflow` - Approval state machine
//! - `reversal` - Reversing entries for posted vouchers
//! - `numbering` - Voucher number format
//! - `service` - Transactional lifecycle operations

pub mod numbering;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod reversal_props;
#[cfg(test)]
mod workflow_props;

pub use service::VoucherService;
pub use types::{
    AuditStamp, EntryInput, NewVoucher, Voucher, VoucherEntry, VoucherFilter, VoucherReference,
    VoucherStatus, VoucherType, VoucherUpdate,
};
pub use validation::VoucherTotals;
pub use workflow::{VoucherAction, VoucherWorkflow};
