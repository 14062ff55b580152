//! Ledger balances.
//!
//! - `types` - Balance rows and account ledger views
//! - `balance` - Row arithmetic and roll-forward
//! - `engine` - Posting and period rebuild inside a transaction
//! - `service` - Recalculation and read queries

pub mod balance;
pub mod engine;
pub mod service;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::roll_forward;
pub use engine::PostingEngine;
pub use service::LedgerService;
pub use types::{AccountLedger, AccountLedgerLine, LedgerBalance, PostedLine, PostedLineQuery};
