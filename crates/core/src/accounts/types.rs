//! Chart of accounts types.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{AccountId, TenantId};

/// Top-level account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in statement order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses a type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Normal balance side for this type.
    ///
    /// Asset/Expense are debit-normal; Liability/Equity/Revenue are credit-normal.
    #[must_use]
    pub const fn nature(&self) -> Nature {
        match self {
            Self::Asset | Self::Expense => Nature::Debit,
            Self::Liability | Self::Equity | Self::Revenue => Nature::Credit,
        }
    }

    /// Returns true for types closed into retained earnings at year end.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side on which an account's balance normally sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    /// Balance grows with debits.
    Debit,
    /// Balance grows with credits.
    Credit,
}

impl Nature {
    /// Returns the string representation of the nature.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a nature from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Balance change contributed by a debit/credit pair.
    ///
    /// Debit-nature: `debit - credit`. Credit-nature: `credit - debit`.
    #[must_use]
    pub fn signed(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// Splits a signed balance back into a one-sided (debit, credit) pair.
    ///
    /// A positive balance lands on the normal side, a negative one on the other.
    #[must_use]
    pub fn split(self, balance: Decimal) -> (Decimal, Decimal) {
        let (normal, other) = if balance < Decimal::ZERO {
            (Decimal::ZERO, -balance)
        } else {
            (balance, Decimal::ZERO)
        };
        match self {
            Self::Debit => (normal, other),
            Self::Credit => (other, normal),
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Code, unique per tenant.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Normal balance side, always `account_type.nature()`.
    pub nature: Nature,
    /// Parent in the same tenant.
    pub parent_id: Option<AccountId>,
    /// Depth in the tree, 1 for roots.
    pub level: u32,
    /// Aggregation account that never receives direct postings.
    pub is_control: bool,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
    /// Ordering among siblings.
    pub sort_order: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Returns true if entries may target this account.
    #[must_use]
    pub const fn accepts_postings(&self) -> bool {
        self.is_active && !self.is_control
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Code, unique per tenant.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Optional explicit nature; must agree with the type when given.
    pub nature: Option<Nature>,
    /// Optional parent.
    pub parent_id: Option<AccountId>,
    /// Control account flag.
    #[serde(default)]
    pub is_control: bool,
    /// Ordering among siblings.
    #[serde(default)]
    pub sort_order: i32,
}

/// Partial update of an account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// New code.
    pub code: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New type.
    pub account_type: Option<AccountType>,
    /// New explicit nature.
    pub nature: Option<Nature>,
    /// New parent; `Some(None)` makes the account a root.
    pub parent_id: Option<Option<AccountId>>,
    /// New control flag.
    pub is_control: Option<bool>,
    /// New sort order.
    pub sort_order: Option<i32>,
}

/// Filter for listing accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountFilter {
    /// Only this type.
    pub account_type: Option<AccountType>,
    /// Only active or only inactive accounts.
    pub is_active: Option<bool>,
    /// Only direct children of this account.
    pub parent_id: Option<AccountId>,
}

impl AccountFilter {
    /// Returns true if the account passes the filter.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        self.account_type.is_none_or(|t| account.account_type == t)
            && self.is_active.is_none_or(|a| account.is_active == a)
            && self.parent_id.is_none_or(|p| account.parent_id == Some(p))
    }
}

/// Answer to "may I do this?" with a reason when the answer is no.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    /// Whether the operation would succeed.
    pub allowed: bool,
    /// Human-readable explanation when not allowed.
    pub reason: Option<String>,
}

impl Eligibility {
    /// Operation is permitted.
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// Operation is refused for `reason`.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// An account with its children, for tree views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountNode {
    /// The account.
    pub account: Account,
    /// Direct children, ordered by sort order then code.
    pub children: Vec<AccountNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountType::Asset, Nature::Debit)]
    #[case(AccountType::Expense, Nature::Debit)]
    #[case(AccountType::Liability, Nature::Credit)]
    #[case(AccountType::Equity, Nature::Credit)]
    #[case(AccountType::Revenue, Nature::Credit)]
    fn test_nature_from_type(#[case] account_type: AccountType, #[case] nature: Nature) {
        assert_eq!(account_type.nature(), nature);
        assert_eq!(AccountType::parse(account_type.as_str()), Some(account_type));
    }

    #[test]
    fn test_signed_balance_change() {
        assert_eq!(Nature::Debit.signed(dec!(100), dec!(30)), dec!(70));
        assert_eq!(Nature::Credit.signed(dec!(100), dec!(30)), dec!(-70));
    }

    #[rstest]
    #[case(Nature::Debit, dec!(70), (dec!(70), dec!(0)))]
    #[case(Nature::Debit, dec!(-70), (dec!(0), dec!(70)))]
    #[case(Nature::Credit, dec!(70), (dec!(0), dec!(70)))]
    #[case(Nature::Credit, dec!(-70), (dec!(70), dec!(0)))]
    #[case(Nature::Credit, dec!(0), (dec!(0), dec!(0)))]
    fn test_split_balance(
        #[case] nature: Nature,
        #[case] balance: Decimal,
        #[case] expected: (Decimal, Decimal),
    ) {
        assert_eq!(nature.split(balance), expected);
    }

    #[test]
    fn test_unknown_type_does_not_parse() {
        assert_eq!(AccountType::parse("contra"), None);
        assert_eq!(Nature::parse("DEBIT"), Some(Nature::Debit));
    }
}
