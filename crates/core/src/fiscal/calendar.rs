//! Fiscal calendar arithmetic.
//!
//! A fiscal year is named after the calendar year in which it starts. With a
//! start month of April, fiscal year 2026 runs from 2026-04-01 to 2027-03-31
//! and its period 1 is April 2026.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use ledgerline_shared::TenantSettings;

use crate::error::LedgerError;

/// Earliest fiscal year accepted.
pub const MIN_YEAR: i32 = 1900;
/// Latest fiscal year accepted.
pub const MAX_YEAR: i32 = 9998;

/// A fiscal (year, month) pair. Months are fiscal months, 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Fiscal year.
    pub year: i32,
    /// Fiscal month within the year (1-12).
    pub month: u32,
}

impl PeriodKey {
    /// Creates a validated period key.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidPeriod` for a month outside 1-12 or a
    /// year outside the supported range.
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidPeriod(format!(
                "month must be 1-12, got {month}"
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(LedgerError::InvalidPeriod(format!(
                "year must be {MIN_YEAR}-{MAX_YEAR}, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The following period, rolling into the next fiscal year after month 12.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding period.
    #[must_use]
    pub const fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// All twelve periods of a fiscal year.
    #[must_use]
    pub fn year_periods(year: i32) -> Vec<Self> {
        (1..=12).map(|month| Self { year, month }).collect()
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = LedgerError;

    /// Parses `YYYY-MM` or `YYYY/MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed.split_once(['-', '/']).ok_or_else(|| {
            LedgerError::InvalidPeriod(format!("expected YYYY-MM, got {trimmed:?}"))
        })?;

        let year: i32 = year
            .parse()
            .map_err(|_| LedgerError::InvalidPeriod(format!("invalid year {year:?}")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| LedgerError::InvalidPeriod(format!("invalid month {month:?}")))?;

        Self::new(year, month)
    }
}

/// Maps calendar dates to fiscal periods for one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalCalendar {
    start_month: u32,
}

impl Default for FiscalCalendar {
    fn default() -> Self {
        Self { start_month: 1 }
    }
}

impl FiscalCalendar {
    /// Creates a calendar whose fiscal year starts in `start_month`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidSettings` if the month is outside 1-12.
    pub fn new(start_month: u32) -> Result<Self, LedgerError> {
        if (1..=12).contains(&start_month) {
            Ok(Self { start_month })
        } else {
            Err(LedgerError::InvalidSettings(format!(
                "fiscal year start month must be 1-12, got {start_month}"
            )))
        }
    }

    /// Builds the calendar from tenant settings.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidSettings` if the start month is invalid.
    pub fn from_settings(settings: &TenantSettings) -> Result<Self, LedgerError> {
        Self::new(settings.fiscal_year_start_month)
    }

    /// Calendar month in which the fiscal year starts.
    #[must_use]
    pub const fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Fiscal period containing `date`.
    #[must_use]
    pub fn period_of(&self, date: NaiveDate) -> PeriodKey {
        let month = date.month();
        let fiscal_month = (month + 12 - self.start_month) % 12 + 1;
        let year = if month >= self.start_month {
            date.year()
        } else {
            date.year() - 1
        };
        PeriodKey {
            year,
            month: fiscal_month,
        }
    }

    /// Calendar (year, month) covered by a fiscal period.
    #[must_use]
    pub const fn calendar_month(&self, key: PeriodKey) -> (i32, u32) {
        let index = self.start_month - 1 + key.month - 1;
        // index < 24, so the year offset is 0 or 1
        let year_offset = if index >= 12 { 1 } else { 0 };
        (key.year + year_offset, index % 12 + 1)
    }

    /// First and last calendar date of a fiscal period.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidPeriod` if the dates cannot be represented.
    pub fn date_range(&self, key: PeriodKey) -> Result<(NaiveDate, NaiveDate), LedgerError> {
        let (year, month) = self.calendar_month(key);
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| LedgerError::InvalidPeriod(key.to_string()))?;
        let end = last_day_of_month(year, month)
            .ok_or_else(|| LedgerError::InvalidPeriod(key.to_string()))?;
        Ok((start, end))
    }

    /// First and last calendar date of a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidPeriod` if the dates cannot be represented.
    pub fn year_range(&self, year: i32) -> Result<(NaiveDate, NaiveDate), LedgerError> {
        let (start, _) = self.date_range(PeriodKey { year, month: 1 })?;
        let (_, end) = self.date_range(PeriodKey { year, month: 12 })?;
        Ok((start, end))
    }

    /// Display name for a period, e.g. "April 2026".
    #[must_use]
    pub fn period_name(&self, key: PeriodKey) -> String {
        let (year, month) = self.calendar_month(key);
        format!("{} {year}", month_name(month))
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month?.pred_opt()
}

const fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
