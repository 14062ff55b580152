//! Entry validation and totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{VoucherEntryId, fractional_digits, round_amount};

use crate::error::LedgerError;
use crate::voucher::types::{EntryInput, VoucherEntry};

/// Debit and credit sums of an entry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoucherTotals {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

impl VoucherTotals {
    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }

    /// Fails with `Unbalanced` carrying both totals.
    pub fn ensure_balanced(&self) -> Result<(), LedgerError> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(LedgerError::Unbalanced {
                debit: self.total_debit,
                credit: self.total_credit,
            })
        }
    }
}

/// Checks one entry: one-sided, non-negative, within `precision` digits.
pub fn validate_entry(line: u32, entry: &EntryInput, precision: u32) -> Result<(), LedgerError> {
    if entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO {
        return Err(LedgerError::EntryInvalidAmount {
            line,
            reason: "amounts must not be negative",
        });
    }

    match (entry.debit.is_zero(), entry.credit.is_zero()) {
        (true, true) => return Err(LedgerError::EntryZeroAmount { line }),
        (false, false) => {
            return Err(LedgerError::EntryInvalidAmount {
                line,
                reason: "an entry must be either a debit or a credit, not both",
            });
        }
        _ => {}
    }

    if fractional_digits(entry.debit) > precision || fractional_digits(entry.credit) > precision {
        return Err(LedgerError::EntryInvalidAmount {
            line,
            reason: "amount has more decimal places than the tenant precision",
        });
    }
    Ok(())
}

/// Validates every entry and the balance of the set.
///
/// An empty set is accepted here; leaving draft requires entries, see
/// [`require_entries`].
pub fn validate_entries(
    entries: &[EntryInput],
    precision: u32,
) -> Result<VoucherTotals, LedgerError> {
    let mut totals = VoucherTotals::default();
    for (line, entry) in (1u32..).zip(entries) {
        validate_entry(line, entry, precision)?;
        totals.total_debit += entry.debit;
        totals.total_credit += entry.credit;
    }
    totals.ensure_balanced()?;
    Ok(totals)
}

/// Fails with `EmptyEntries` when there is nothing to post.
pub fn require_entries<T>(entries: &[T]) -> Result<(), LedgerError> {
    if entries.is_empty() {
        Err(LedgerError::EmptyEntries)
    } else {
        Ok(())
    }
}

/// Totals of stored entries.
#[must_use]
pub fn totals_of(entries: &[VoucherEntry]) -> VoucherTotals {
    entries.iter().fold(VoucherTotals::default(), |acc, e| VoucherTotals {
        total_debit: acc.total_debit + e.debit,
        total_credit: acc.total_credit + e.credit,
    })
}

/// Turns validated inputs into numbered entries.
#[must_use]
pub fn build_entries(inputs: Vec<EntryInput>, precision: u32) -> Vec<VoucherEntry> {
    (1u32..)
        .zip(inputs)
        .map(|(line_number, input)| VoucherEntry {
            id: VoucherEntryId::new(),
            line_number,
            account_id: input.account_id,
            debit: round_amount(input.debit, precision),
            credit: round_amount(input.credit, precision),
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerline_shared::types::AccountId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balanced_entries() {
        let a = AccountId::new();
        let b = AccountId::new();
        let totals = validate_entries(
            &[
                EntryInput::debit(a, dec!(110000)),
                EntryInput::credit(b, dec!(110000)),
            ],
            2,
        )
        .unwrap();
        assert_eq!(totals.total_debit, dec!(110000));
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_unbalanced_reports_both_totals() {
        let a = AccountId::new();
        let b = AccountId::new();
        let err = validate_entries(
            &[EntryInput::debit(a, dec!(100)), EntryInput::credit(b, dec!(90))],
            2,
        )
        .unwrap_err();
        match err {
            LedgerError::Unbalanced { debit, credit } => {
                assert_eq!(debit, dec!(100));
                assert_eq!(credit, dec!(90));
            }
            other => panic!("expected Unbalanced, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_entry() {
        let entry = EntryInput::debit(AccountId::new(), Decimal::ZERO);
        assert!(matches!(
            validate_entry(3, &entry, 2),
            Err(LedgerError::EntryZeroAmount { line: 3 })
        ));
    }

    #[test]
    fn test_two_sided_entry() {
        let entry = EntryInput {
            account_id: AccountId::new(),
            debit: dec!(10),
            credit: dec!(10),
            description: None,
        };
        assert!(matches!(
            validate_entry(1, &entry, 2),
            Err(LedgerError::EntryInvalidAmount { line: 1, .. })
        ));
    }

    #[test]
    fn test_negative_entry() {
        let entry = EntryInput::credit(AccountId::new(), dec!(-5));
        assert!(matches!(
            validate_entry(2, &entry, 2),
            Err(LedgerError::EntryInvalidAmount { line: 2, .. })
        ));
    }

    #[test]
    fn test_precision_limit() {
        let entry = EntryInput::debit(AccountId::new(), dec!(10.125));
        assert!(validate_entry(1, &entry, 2).is_err());
        assert!(validate_entry(1, &entry, 3).is_ok());
        // trailing zeros do not count
        let entry = EntryInput::debit(AccountId::new(), dec!(10.500));
        assert!(validate_entry(1, &entry, 1).is_ok());
    }

    #[test]
    fn test_build_entries_numbers_lines() {
        let a = AccountId::new();
        let entries = build_entries(
            vec![
                EntryInput::debit(a, dec!(1)).with_description("  "),
                EntryInput::credit(a, dec!(1)).with_description(" memo "),
            ],
            2,
        );
        assert_eq!(entries[0].line_number, 1);
        assert_eq!(entries[1].line_number, 2);
        assert_eq!(entries[0].description, None);
        assert_eq!(entries[1].description.as_deref(), Some("memo"));
        assert_eq!(totals_of(&entries).total_credit, dec!(1));
    }

    #[test]
    fn test_require_entries() {
        assert!(matches!(
            require_entries::<EntryInput>(&[]),
            Err(LedgerError::EmptyEntries)
        ));
    }
}
