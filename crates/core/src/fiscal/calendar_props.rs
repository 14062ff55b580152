//! Property-based tests for the fiscal calendar.

use chrono::NaiveDate;
use proptest::prelude::*;

use crate::fiscal::calendar::{FiscalCalendar, PeriodKey};

fn arb_calendar() -> impl Strategy<Value = FiscalCalendar> {
    (1u32..=12).prop_map(|m| FiscalCalendar::new(m).unwrap())
}

fn arb_key() -> impl Strategy<Value = PeriodKey> {
    (2000i32..2100, 1u32..=12).prop_map(|(year, month)| PeriodKey { year, month })
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Both ends of a period's date range map back to that period.
    #[test]
    fn test_prop_date_range_maps_back(calendar in arb_calendar(), key in arb_key()) {
        let (start, end) = calendar.date_range(key).unwrap();
        prop_assert!(start <= end);
        prop_assert_eq!(calendar.period_of(start), key);
        prop_assert_eq!(calendar.period_of(end), key);
    }

    /// Every date lies inside the range of the period it maps to.
    #[test]
    fn test_prop_date_inside_its_period(calendar in arb_calendar(), date in arb_date()) {
        let key = calendar.period_of(date);
        prop_assert!((1..=12).contains(&key.month));
        let (start, end) = calendar.date_range(key).unwrap();
        prop_assert!(start <= date && date <= end);
    }

    /// Consecutive periods are contiguous in calendar time.
    #[test]
    fn test_prop_periods_are_contiguous(calendar in arb_calendar(), key in arb_key()) {
        let (_, end) = calendar.date_range(key).unwrap();
        let (next_start, _) = calendar.date_range(key.next()).unwrap();
        prop_assert_eq!(end.succ_opt().unwrap(), next_start);
    }

    /// Display output parses back to the same key.
    #[test]
    fn test_prop_display_parses_back(key in arb_key()) {
        let parsed: PeriodKey = key.to_string().parse().unwrap();
        prop_assert_eq!(parsed, key);
    }
}
