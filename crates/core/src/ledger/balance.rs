//! Balance row arithmetic.
//!
//! Stored pairs are one-sided: a row keeps its opening and closing as a
//! (debit, credit) pair where at most one side is non-zero. The signed
//! balance in the account's nature is the working value.

use rust_decimal::Decimal;

use ledgerline_shared::types::{AccountId, TenantId};

use crate::accounts::Nature;
use crate::fiscal::PeriodKey;
use crate::ledger::types::LedgerBalance;

impl LedgerBalance {
    /// A row with no movement, opening at `opening` (signed in `nature`).
    #[must_use]
    pub fn opened(
        tenant_id: TenantId,
        account_id: AccountId,
        period: PeriodKey,
        nature: Nature,
        opening: Decimal,
    ) -> Self {
        let (opening_debit, opening_credit) = nature.split(opening);
        Self {
            tenant_id,
            account_id,
            period,
            opening_debit,
            opening_credit,
            period_debit: Decimal::ZERO,
            period_credit: Decimal::ZERO,
            closing_debit: opening_debit,
            closing_credit: opening_credit,
        }
    }

    /// Signed opening balance.
    #[must_use]
    pub fn opening_balance(&self, nature: Nature) -> Decimal {
        nature.signed(self.opening_debit, self.opening_credit)
    }

    /// Signed closing balance.
    #[must_use]
    pub fn closing_balance(&self, nature: Nature) -> Decimal {
        nature.signed(self.closing_debit, self.closing_credit)
    }

    /// Signed movement of the period.
    #[must_use]
    pub fn movement(&self, nature: Nature) -> Decimal {
        nature.signed(self.period_debit, self.period_credit)
    }

    /// Adds posted amounts and recomputes the closing pair.
    pub fn add_movement(&mut self, nature: Nature, debit: Decimal, credit: Decimal) {
        self.period_debit += debit;
        self.period_credit += credit;
        self.recompute_closing(nature);
    }

    /// closing = opening + movement, split back onto one side.
    pub fn recompute_closing(&mut self, nature: Nature) {
        let closing = self.opening_balance(nature) + self.movement(nature);
        (self.closing_debit, self.closing_credit) = nature.split(closing);
    }

    /// Replaces the opening with `opening` and recomputes the closing.
    pub fn carry_from(&mut self, nature: Nature, opening: Decimal) {
        (self.opening_debit, self.opening_credit) = nature.split(opening);
        self.recompute_closing(nature);
    }
}

/// Re-chains `later` (ascending periods of one account) onto `anchor`, the
/// closing balance of the period before them.
///
/// Returns true if any row changed.
pub fn roll_forward(nature: Nature, anchor: Decimal, later: &mut [LedgerBalance]) -> bool {
    let mut carry = anchor;
    let mut changed = false;
    for row in later.iter_mut() {
        if row.opening_balance(nature) != carry {
            row.carry_from(nature, carry);
            changed = true;
        }
        carry = row.closing_balance(nature);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(nature: Nature, opening: Decimal, month: u32) -> LedgerBalance {
        LedgerBalance::opened(
            TenantId::new(),
            AccountId::new(),
            PeriodKey { year: 2026, month },
            nature,
            opening,
        )
    }

    #[test]
    fn test_debit_nature_closing() {
        let mut balance = row(Nature::Debit, dec!(1000), 3);
        balance.add_movement(Nature::Debit, dec!(500), dec!(200));

        assert_eq!(balance.opening_debit, dec!(1000));
        assert_eq!(balance.closing_debit, dec!(1300));
        assert_eq!(balance.closing_credit, Decimal::ZERO);
    }

    #[test]
    fn test_credit_nature_closing() {
        let mut balance = row(Nature::Credit, Decimal::ZERO, 3);
        balance.add_movement(Nature::Credit, Decimal::ZERO, dec!(110000));

        assert_eq!(balance.closing_credit, dec!(110000));
        assert_eq!(balance.closing_debit, Decimal::ZERO);
        assert_eq!(balance.closing_balance(Nature::Credit), dec!(110000));
    }

    #[test]
    fn test_overdrawn_balance_flips_side() {
        let mut balance = row(Nature::Debit, dec!(100), 3);
        balance.add_movement(Nature::Debit, Decimal::ZERO, dec!(250));

        assert_eq!(balance.closing_debit, Decimal::ZERO);
        assert_eq!(balance.closing_credit, dec!(150));
        assert_eq!(balance.closing_balance(Nature::Debit), dec!(-150));
    }

    #[test]
    fn test_roll_forward_chains_rows() {
        let mut later = vec![row(Nature::Debit, dec!(10), 4), row(Nature::Debit, dec!(10), 5)];
        later[0].add_movement(Nature::Debit, dec!(5), Decimal::ZERO);

        assert!(roll_forward(Nature::Debit, dec!(100), &mut later));
        assert_eq!(later[0].opening_debit, dec!(100));
        assert_eq!(later[0].closing_debit, dec!(105));
        assert_eq!(later[1].opening_debit, dec!(105));
        assert_eq!(later[1].closing_debit, dec!(105));

        assert!(!roll_forward(Nature::Debit, dec!(100), &mut later));
    }
}
