//! Common types used across the workspace.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{fractional_digits, round_amount, MAX_DECIMAL_PRECISION};
pub use pagination::{PageMeta, PageRequest, PageResponse};
