//! Fiscal calendar and period lifecycle.
//!
//! - `calendar` - Date to (year, month) mapping and period keys
//! - `types` - Period entity and status
//! - `service` - Create, close, reopen and year-end close

pub mod calendar;
pub mod service;
pub mod types;

#[cfg(test)]
mod calendar_props;

pub use calendar::{FiscalCalendar, PeriodKey};
pub use service::FiscalPeriodManager;
pub use types::{FiscalPeriod, FiscalPeriodStatus, YearEndClose};
