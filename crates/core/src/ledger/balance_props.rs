//! Property-based tests for balance arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use ledgerline_shared::types::{AccountId, TenantId};

use crate::accounts::Nature;
use crate::fiscal::PeriodKey;
use crate::ledger::balance::roll_forward;
use crate::ledger::types::LedgerBalance;

fn arb_nature() -> impl Strategy<Value = Nature> {
    prop_oneof![Just(Nature::Debit), Just(Nature::Credit)]
}

fn arb_signed() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_movements() -> impl Strategy<Value = Vec<(Decimal, Decimal)>> {
    prop::collection::vec(
        (0i64..1_000_000i64, 0i64..1_000_000i64)
            .prop_map(|(d, c)| (Decimal::new(d, 2), Decimal::new(c, 2))),
        0..10,
    )
}

fn opened(nature: Nature, opening: Decimal, month: u32) -> LedgerBalance {
    LedgerBalance::opened(
        TenantId::new(),
        AccountId::new(),
        PeriodKey { year: 2026, month },
        nature,
        opening,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// closing = opening + movement in the account's nature, whatever the order of postings.
    #[test]
    fn test_prop_closing_is_opening_plus_movement(
        nature in arb_nature(),
        opening in arb_signed(),
        movements in arb_movements(),
    ) {
        let mut row = opened(nature, opening, 1);
        for (debit, credit) in &movements {
            row.add_movement(nature, *debit, *credit);
        }
        let total_debit: Decimal = movements.iter().map(|m| m.0).sum();
        let total_credit: Decimal = movements.iter().map(|m| m.1).sum();

        let expected = opening + nature.signed(total_debit, total_credit);
        prop_assert_eq!(row.closing_balance(nature), expected);
        prop_assert_eq!(row.opening_balance(nature), opening);
    }

    /// Opening and closing pairs are always one-sided and non-negative.
    #[test]
    fn test_prop_pairs_are_one_sided(
        nature in arb_nature(),
        opening in arb_signed(),
        movements in arb_movements(),
    ) {
        let mut row = opened(nature, opening, 1);
        for (debit, credit) in movements {
            row.add_movement(nature, debit, credit);
        }
        prop_assert!(row.opening_debit.is_zero() || row.opening_credit.is_zero());
        prop_assert!(row.closing_debit.is_zero() || row.closing_credit.is_zero());
        prop_assert!(row.closing_debit >= Decimal::ZERO && row.closing_credit >= Decimal::ZERO);
    }

    /// After a roll-forward every row opens at the previous row's closing.
    #[test]
    fn test_prop_roll_forward_links_periods(
        nature in arb_nature(),
        anchor in arb_signed(),
        movements in prop::collection::vec((0i64..100_000i64, 0i64..100_000i64), 1..12),
    ) {
        let mut rows: Vec<LedgerBalance> = (1u32..)
            .zip(&movements)
            .map(|(month, (d, c))| {
                let mut row = opened(nature, Decimal::ZERO, month);
                row.add_movement(nature, Decimal::new(*d, 2), Decimal::new(*c, 2));
                row
            })
            .collect();

        roll_forward(nature, anchor, &mut rows);

        let mut expected_opening = anchor;
        for row in &rows {
            prop_assert_eq!(row.opening_balance(nature), expected_opening);
            expected_opening = row.closing_balance(nature);
        }
    }
}
