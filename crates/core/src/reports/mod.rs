//! Financial reports.
//!
//! - Trial balance, single period or a span of periods
//! - Balance sheet
//! - Income statement
//!
//! Statements are derived from trial balance rows only.

pub mod builder;
pub mod service;
pub mod types;

pub use builder::ReportBuilder;
pub use service::ReportGenerator;
pub use types::*;
