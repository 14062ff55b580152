//! Chart of accounts.
//!
//! - `types` - Account entity, type/nature rules, inputs and filters
//! - `hierarchy` - Tree index, cycle detection and code rules
//! - `service` - Directory operations over the repository interface

pub mod hierarchy;
pub mod service;
pub mod types;

#[cfg(test)]
mod hierarchy_props;

pub use hierarchy::AccountArena;
pub use service::AccountDirectory;
pub use types::{
    Account, AccountFilter, AccountNode, AccountType, AccountUpdate, Eligibility, Nature,
    NewAccount,
};
