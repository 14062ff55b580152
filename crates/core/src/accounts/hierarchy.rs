//! Chart of accounts hierarchy rules.
//!
//! The tree is kept as rows keyed by id with a parent column. Cycle checks
//! walk ancestors through an [`AccountArena`] index and stop after as many
//! steps as there are accounts, so even corrupt data cannot loop forever.

use std::collections::HashMap;

use ledgerline_shared::types::AccountId;

use crate::accounts::types::{Account, AccountNode, AccountType, Nature};
use crate::error::LedgerError;

/// Maximum length of an account code.
pub const MAX_CODE_LEN: usize = 20;

/// Parent/child index over one tenant's accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountArena {
    parents: HashMap<AccountId, Option<AccountId>>,
    children: HashMap<AccountId, Vec<AccountId>>,
}

impl AccountArena {
    /// Indexes the given accounts.
    #[must_use]
    pub fn from_accounts(accounts: &[Account]) -> Self {
        Self::from_edges(accounts.iter().map(|a| (a.id, a.parent_id)))
    }

    /// Indexes (id, parent) pairs.
    pub fn from_edges(edges: impl IntoIterator<Item = (AccountId, Option<AccountId>)>) -> Self {
        let mut arena = Self::default();
        for (id, parent) in edges {
            arena.parents.insert(id, parent);
            if let Some(parent) = parent {
                arena.children.entry(parent).or_default().push(id);
            }
        }
        arena
    }

    /// Number of indexed accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if no accounts are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns true if `candidate` is `root` or lies below it.
    ///
    /// A loop in the stored parent chain also answers true.
    #[must_use]
    pub fn is_in_subtree(&self, candidate: AccountId, root: AccountId) -> bool {
        let mut current = Some(candidate);
        for _ in 0..=self.len() {
            match current {
                Some(id) if id == root => return true,
                Some(id) => current = self.parents.get(&id).copied().flatten(),
                None => return false,
            }
        }
        true
    }

    /// All accounts below `root`, parents before children.
    #[must_use]
    pub fn descendants(&self, root: AccountId) -> Vec<AccountId> {
        let mut out = Vec::new();
        let mut stack: Vec<AccountId> = self.children.get(&root).cloned().unwrap_or_default();
        while let Some(id) = stack.pop() {
            if id == root || out.contains(&id) {
                continue;
            }
            out.push(id);
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }
        out
    }

    /// Depth of an account, 1 for roots.
    #[must_use]
    pub fn depth(&self, id: AccountId) -> u32 {
        let mut depth = 1;
        let mut current = self.parents.get(&id).copied().flatten();
        while let Some(parent) = current {
            if depth as usize > self.len() {
                break;
            }
            depth += 1;
            current = self.parents.get(&parent).copied().flatten();
        }
        depth
    }

    /// Re-points `id` at a new parent.
    pub fn reparent(&mut self, id: AccountId, new_parent: Option<AccountId>) {
        if let Some(Some(old)) = self.parents.get(&id).copied()
            && let Some(siblings) = self.children.get_mut(&old)
        {
            siblings.retain(|c| *c != id);
        }
        self.parents.insert(id, new_parent);
        if let Some(parent) = new_parent {
            self.children.entry(parent).or_default().push(id);
        }
    }
}

/// Checks the code format: 1-20 ASCII alphanumerics, `.` or `-`.
pub fn validate_code(code: &str) -> Result<(), LedgerError> {
    if code.is_empty() {
        return Err(LedgerError::InvalidCode("code is empty".to_string()));
    }
    if code.len() > MAX_CODE_LEN {
        return Err(LedgerError::InvalidCode(format!(
            "code {code:?} is longer than {MAX_CODE_LEN} characters"
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(LedgerError::InvalidCode(format!(
            "code {code:?} may only contain letters, digits, '.' and '-'"
        )));
    }
    Ok(())
}

/// Returns the nature for `account_type`, rejecting a contradicting request.
pub fn resolve_nature(
    account_type: AccountType,
    requested: Option<Nature>,
) -> Result<Nature, LedgerError> {
    let nature = account_type.nature();
    match requested {
        Some(requested) if requested != nature => Err(LedgerError::InvalidNature {
            account_type,
            nature: requested,
        }),
        _ => Ok(nature),
    }
}

/// A child must share its parent's type.
pub fn check_parent_type(parent: &Account, child_type: AccountType) -> Result<(), LedgerError> {
    if parent.account_type == child_type {
        Ok(())
    } else {
        Err(LedgerError::InvalidType {
            expected: parent.account_type,
            actual: child_type,
        })
    }
}

/// Assembles accounts into trees ordered by sort order then code.
///
/// Accounts whose parent is not in the input become roots.
#[must_use]
pub fn build_tree(accounts: Vec<Account>) -> Vec<AccountNode> {
    let known: std::collections::HashSet<AccountId> = accounts.iter().map(|a| a.id).collect();
    let mut by_parent: HashMap<Option<AccountId>, Vec<Account>> = HashMap::new();
    for account in accounts {
        let parent = account.parent_id.filter(|p| known.contains(p));
        by_parent.entry(parent).or_default().push(account);
    }
    attach(None, &mut by_parent)
}

fn attach(
    parent: Option<AccountId>,
    by_parent: &mut HashMap<Option<AccountId>, Vec<Account>>,
) -> Vec<AccountNode> {
    let mut siblings = by_parent.remove(&parent).unwrap_or_default();
    siblings.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.code.cmp(&b.code)));
    siblings
        .into_iter()
        .map(|account| {
            let children = attach(Some(account.id), by_parent);
            AccountNode { account, children }
        })
        .collect()
}
