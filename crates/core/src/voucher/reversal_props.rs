//! Property-based tests for reversal entries.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use ledgerline_shared::types::{AccountId, VoucherEntryId};
use uuid::Uuid;

use crate::voucher::reversal::reversing_entries;
use crate::voucher::types::VoucherEntry;
use crate::voucher::validation::totals_of;

fn arb_account() -> impl Strategy<Value = AccountId> {
    // A small pool so accounts repeat across lines.
    (0u128..4).prop_map(|n| AccountId::from_uuid(Uuid::from_u128(n + 1)))
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Balanced entry sets built from debit/credit pairs.
fn arb_entries() -> impl Strategy<Value = Vec<VoucherEntry>> {
    prop::collection::vec((arb_account(), arb_account(), arb_amount()), 1..6).prop_map(|pairs| {
        let mut entries = Vec::new();
        for (debit_account, credit_account, amount) in pairs {
            for (account_id, debit, credit) in [
                (debit_account, amount, Decimal::ZERO),
                (credit_account, Decimal::ZERO, amount),
            ] {
                let line_number = u32::try_from(entries.len() + 1).unwrap_or(u32::MAX);
                entries.push(VoucherEntry {
                    id: VoucherEntryId::new(),
                    line_number,
                    account_id,
                    debit,
                    credit,
                    description: None,
                });
            }
        }
        entries
    })
}

fn net_by_account(entries: &[VoucherEntry]) -> HashMap<AccountId, Decimal> {
    let mut net = HashMap::new();
    for e in entries {
        *net.entry(e.account_id).or_insert(Decimal::ZERO) += e.debit - e.credit;
    }
    net
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Original plus reversal leaves zero net movement on every account.
    #[test]
    fn test_prop_reversal_nets_to_zero(entries in arb_entries()) {
        let reversal = reversing_entries(&entries);
        let mut combined = entries.clone();
        combined.extend(reversal);

        for (_, net) in net_by_account(&combined) {
            prop_assert_eq!(net, Decimal::ZERO);
        }
    }

    /// The reversal is balanced with the same totals, sides swapped.
    #[test]
    fn test_prop_reversal_preserves_totals(entries in arb_entries()) {
        let original = totals_of(&entries);
        let reversed = totals_of(&reversing_entries(&entries));

        prop_assert!(reversed.is_balanced());
        prop_assert_eq!(reversed.total_debit, original.total_credit);
        prop_assert_eq!(reversed.total_credit, original.total_debit);
    }

    /// Every reversing line stays one-sided.
    #[test]
    fn test_prop_reversal_lines_one_sided(entries in arb_entries()) {
        for line in reversing_entries(&entries) {
            prop_assert!(line.debit.is_zero() != line.credit.is_zero());
        }
    }
}
