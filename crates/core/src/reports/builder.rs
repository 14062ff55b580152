//! Pure report assembly from balances.

use std::collections::HashMap;

use rust_decimal::Decimal;

use ledgerline_shared::types::{AccountId, TenantId};

use crate::accounts::{Account, AccountType};
use crate::fiscal::PeriodKey;
use crate::ledger::LedgerBalance;

use super::types::{
    BalanceSheet, IncomeStatement, StatementLine, StatementSection, TrialBalance,
    TrialBalanceRow, TrialBalanceTotals,
};

/// (debit, credit) pair per account.
pub type Pairs = HashMap<AccountId, (Decimal, Decimal)>;

/// Closing pairs of the given rows.
#[must_use]
pub fn closing_pairs(rows: &[LedgerBalance]) -> Pairs {
    rows.iter()
        .map(|b| (b.account_id, (b.closing_debit, b.closing_credit)))
        .collect()
}

/// Adds the period movement of `rows` into `into`.
pub fn add_movements(into: &mut Pairs, rows: &[LedgerBalance]) {
    for b in rows {
        let slot = into.entry(b.account_id).or_insert((Decimal::ZERO, Decimal::ZERO));
        slot.0 += b.period_debit;
        slot.1 += b.period_credit;
    }
}

/// Stateless report builder.
pub struct ReportBuilder;

impl ReportBuilder {
    /// One row per account, ordered by code. Accounts without a pair in a
    /// column show zero there.
    #[must_use]
    pub fn trial_balance(
        tenant_id: TenantId,
        from: PeriodKey,
        to: PeriodKey,
        mut accounts: Vec<Account>,
        opening: &Pairs,
        movement: &Pairs,
        closing: &Pairs,
    ) -> TrialBalance {
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        let zero = (Decimal::ZERO, Decimal::ZERO);

        let rows: Vec<TrialBalanceRow> = accounts
            .into_iter()
            .map(|account| {
                let (opening_debit, opening_credit) =
                    opening.get(&account.id).copied().unwrap_or(zero);
                let (period_debit, period_credit) =
                    movement.get(&account.id).copied().unwrap_or(zero);
                let (closing_debit, closing_credit) =
                    closing.get(&account.id).copied().unwrap_or(zero);
                TrialBalanceRow {
                    account_id: account.id,
                    code: account.code,
                    name: account.name,
                    account_type: account.account_type,
                    nature: account.nature,
                    level: account.level,
                    is_control: account.is_control,
                    opening_debit,
                    opening_credit,
                    period_debit,
                    period_credit,
                    closing_debit,
                    closing_credit,
                }
            })
            .collect();

        let totals = Self::totals(&rows);
        TrialBalance {
            tenant_id,
            from,
            to,
            rows,
            totals,
        }
    }

    /// Column sums and the balance check.
    #[must_use]
    pub fn totals(rows: &[TrialBalanceRow]) -> TrialBalanceTotals {
        let mut totals = rows.iter().fold(TrialBalanceTotals::default(), |mut t, r| {
            t.opening_debit += r.opening_debit;
            t.opening_credit += r.opening_credit;
            t.period_debit += r.period_debit;
            t.period_credit += r.period_credit;
            t.closing_debit += r.closing_debit;
            t.closing_credit += r.closing_credit;
            t
        });
        totals.is_balanced = totals.opening_debit == totals.opening_credit
            && totals.period_debit == totals.period_credit
            && totals.closing_debit == totals.closing_credit;
        totals
    }

    /// Balance sheet from the closing columns of a trial balance.
    ///
    /// Imbalance is reported, not corrected.
    #[must_use]
    pub fn balance_sheet(trial_balance: &TrialBalance) -> BalanceSheet {
        let mut assets = StatementSection::new(AccountType::Asset);
        let mut liabilities = StatementSection::new(AccountType::Liability);
        let mut equity = StatementSection::new(AccountType::Equity);

        for row in &trial_balance.rows {
            let section = match row.account_type {
                AccountType::Asset => &mut assets,
                AccountType::Liability => &mut liabilities,
                AccountType::Equity => &mut equity,
                AccountType::Revenue | AccountType::Expense => continue,
            };
            let amount = match row.account_type {
                AccountType::Asset => row.closing_debit - row.closing_credit,
                _ => row.closing_credit - row.closing_debit,
            };
            if let Some(line) = line_for(row, amount) {
                section.push(line);
            }
        }

        let liabilities_and_equity = liabilities.total + equity.total;
        BalanceSheet {
            tenant_id: trial_balance.tenant_id,
            as_of: trial_balance.to,
            total_assets: assets.total,
            total_liabilities: liabilities.total,
            total_equity: equity.total,
            liabilities_and_equity,
            is_balanced: assets.total == liabilities_and_equity,
            assets,
            liabilities,
            equity,
        }
    }

    /// Income statement from the movement columns of a trial balance.
    #[must_use]
    pub fn income_statement(trial_balance: &TrialBalance) -> IncomeStatement {
        let mut revenue = StatementSection::new(AccountType::Revenue);
        let mut expenses = StatementSection::new(AccountType::Expense);

        for row in &trial_balance.rows {
            let (section, amount) = match row.account_type {
                AccountType::Revenue => (&mut revenue, row.period_credit - row.period_debit),
                AccountType::Expense => (&mut expenses, row.period_debit - row.period_credit),
                _ => continue,
            };
            if let Some(line) = line_for(row, amount) {
                section.push(line);
            }
        }

        IncomeStatement {
            tenant_id: trial_balance.tenant_id,
            from: trial_balance.from,
            to: trial_balance.to,
            net_income: revenue.total - expenses.total,
            revenue,
            expenses,
        }
    }
}

fn line_for(row: &TrialBalanceRow, amount: Decimal) -> Option<StatementLine> {
    if row.is_control || amount.is_zero() {
        return None;
    }
    Some(StatementLine {
        account_id: row.account_id,
        code: row.code.clone(),
        name: row.name.clone(),
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn account(code: &str, account_type: AccountType) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            tenant_id: TenantId::new(),
            code: code.to_string(),
            name: format!("Account {code}"),
            account_type,
            nature: account_type.nature(),
            parent_id: None,
            level: 1,
            is_control: false,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn key(month: u32) -> PeriodKey {
        PeriodKey { year: 2026, month }
    }

    fn build(rows: &[(Account, (Decimal, Decimal))]) -> TrialBalance {
        let accounts: Vec<Account> = rows.iter().map(|(a, _)| a.clone()).collect();
        let pairs: Pairs = rows.iter().map(|(a, p)| (a.id, *p)).collect();
        ReportBuilder::trial_balance(
            TenantId::new(),
            key(3),
            key(3),
            accounts,
            &Pairs::new(),
            &pairs,
            &pairs,
        )
    }

    #[test]
    fn test_trial_balance_orders_by_code_and_balances() {
        let cash = account("101", AccountType::Asset);
        let sales = account("401", AccountType::Revenue);
        let tb = build(&[
            (sales, (Decimal::ZERO, dec!(110000))),
            (cash, (dec!(110000), Decimal::ZERO)),
        ]);

        assert_eq!(tb.rows[0].code, "101");
        assert_eq!(tb.rows[0].closing_debit, dec!(110000));
        assert_eq!(tb.rows[1].closing_credit, dec!(110000));
        assert!(tb.totals.is_balanced);
    }

    #[test]
    fn test_trial_balance_flags_imbalance() {
        let tb = build(&[(account("101", AccountType::Asset), (dec!(5), Decimal::ZERO))]);
        assert!(!tb.totals.is_balanced);
    }

    #[test]
    fn test_balance_sheet_imbalanced_without_equity() {
        let tb = build(&[
            (account("101", AccountType::Asset), (dec!(110000), Decimal::ZERO)),
            (account("401", AccountType::Revenue), (Decimal::ZERO, dec!(110000))),
        ]);
        let sheet = ReportBuilder::balance_sheet(&tb);

        assert_eq!(sheet.total_assets, dec!(110000));
        assert_eq!(sheet.liabilities_and_equity, Decimal::ZERO);
        assert!(!sheet.is_balanced);
    }

    #[test]
    fn test_balance_sheet_balanced_with_equity() {
        let tb = build(&[
            (account("101", AccountType::Asset), (dec!(500), Decimal::ZERO)),
            (account("201", AccountType::Liability), (Decimal::ZERO, dec!(200))),
            (account("301", AccountType::Equity), (Decimal::ZERO, dec!(300))),
        ]);
        let sheet = ReportBuilder::balance_sheet(&tb);

        assert_eq!(sheet.total_liabilities, dec!(200));
        assert_eq!(sheet.total_equity, dec!(300));
        assert!(sheet.is_balanced);
    }

    #[rstest]
    #[case(dec!(90000000), dec!(50000000), dec!(40000000))]
    #[case(dec!(10), dec!(25), dec!(-15))]
    #[case(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)]
    fn test_income_statement_net(
        #[case] revenue: Decimal,
        #[case] expense: Decimal,
        #[case] expected: Decimal,
    ) {
        let tb = build(&[
            (account("401", AccountType::Revenue), (Decimal::ZERO, revenue)),
            (account("501", AccountType::Expense), (expense, Decimal::ZERO)),
        ]);
        let statement = ReportBuilder::income_statement(&tb);

        assert_eq!(statement.revenue.total, revenue);
        assert_eq!(statement.expenses.total, expense);
        assert_eq!(statement.net_income, expected);
    }

    #[test]
    fn test_zero_and_control_accounts_are_omitted() {
        let mut parent = account("100", AccountType::Asset);
        parent.is_control = true;
        let tb = build(&[
            (parent, (dec!(1), Decimal::ZERO)),
            (account("102", AccountType::Asset), (Decimal::ZERO, Decimal::ZERO)),
        ]);
        let sheet = ReportBuilder::balance_sheet(&tb);
        assert!(sheet.assets.lines.is_empty());
    }
}
