//! Account directory operations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ledgerline_shared::types::{AccountId, TenantId, UserId};

use crate::accounts::hierarchy::{
    AccountArena, build_tree, check_parent_type, resolve_nature, validate_code,
};
use crate::accounts::types::{
    Account, AccountFilter, AccountNode, AccountUpdate, Eligibility, NewAccount,
};
use crate::error::LedgerError;
use crate::store::{AccountRepository, LedgerStore, LedgerTx, StoreError};

/// Chart of accounts maintenance for all tenants of a store.
#[derive(Debug)]
pub struct AccountDirectory<S> {
    store: Arc<S>,
}

impl<S> Clone for AccountDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> AccountDirectory<S> {
    /// Creates a directory over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// - `InvalidCode` if the code format is wrong
    /// - `InvalidNature` if an explicit nature contradicts the type
    /// - `CodeExists` if the tenant already uses the code
    /// - `ParentNotFound` if the parent is missing
    /// - `InvalidType` if the parent has a different type
    pub async fn create(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        input: NewAccount,
    ) -> Result<Account, LedgerError> {
        let code = input.code.trim().to_string();
        validate_code(&code)?;
        let nature = resolve_nature(input.account_type, input.nature)?;

        let mut tx = self.store.begin().await?;
        if tx.find_account_by_code(tenant_id, &code).await?.is_some() {
            return Err(LedgerError::CodeExists(code));
        }

        let level = match input.parent_id {
            Some(parent_id) => {
                let parent = tx
                    .find_account(tenant_id, parent_id)
                    .await?
                    .ok_or(LedgerError::ParentNotFound(parent_id))?;
                check_parent_type(&parent, input.account_type)?;
                parent.level + 1
            }
            None => 1,
        };

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            tenant_id,
            code,
            name: input.name.trim().to_string(),
            account_type: input.account_type,
            nature,
            parent_id: input.parent_id,
            level,
            is_control: input.is_control,
            is_active: true,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        };
        tx.insert_account(&account)
            .await
            .map_err(|e| code_conflict(e, &account.code))?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            account_id = %account.id,
            code = %account.code,
            account_type = %account.account_type,
            "account created"
        );
        Ok(account)
    }

    /// Applies a partial update.
    ///
    /// Changing the parent follows the same rules as [`Self::move_account`].
    /// The type can only change while the account has no entries, and must
    /// stay consistent with both parent and children.
    ///
    /// # Errors
    ///
    /// Everything `create` returns, plus `AccountNotFound`, `CircularReference`
    /// and `HasEntries`.
    pub async fn update(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut account = tx
            .find_account(tenant_id, id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;

        if let Some(code) = update.code.map(|c| c.trim().to_string())
            && code != account.code
        {
            validate_code(&code)?;
            if tx.find_account_by_code(tenant_id, &code).await?.is_some() {
                return Err(LedgerError::CodeExists(code));
            }
            account.code = code;
        }

        let new_type = update.account_type.unwrap_or(account.account_type);
        account.nature = resolve_nature(new_type, update.nature)?;
        if new_type != account.account_type {
            ensure_no_entries(&mut tx, &account).await?;
            let children = tx
                .list_accounts(
                    tenant_id,
                    &AccountFilter {
                        parent_id: Some(id),
                        ..AccountFilter::default()
                    },
                )
                .await?;
            if let Some(child) = children.iter().find(|c| c.account_type != new_type) {
                return Err(LedgerError::InvalidType {
                    expected: new_type,
                    actual: child.account_type,
                });
            }
            account.account_type = new_type;
        }

        if update.is_control == Some(true) && !account.is_control {
            ensure_no_entries(&mut tx, &account).await?;
        }
        if let Some(is_control) = update.is_control {
            account.is_control = is_control;
        }
        if let Some(name) = update.name {
            account.name = name.trim().to_string();
        }
        if let Some(sort_order) = update.sort_order {
            account.sort_order = sort_order;
        }

        match update.parent_id {
            Some(new_parent) if new_parent != account.parent_id => {
                reparent(&mut tx, &mut account, new_parent).await?;
            }
            _ => {
                if let Some(parent_id) = account.parent_id {
                    let parent = tx
                        .find_account(tenant_id, parent_id)
                        .await?
                        .ok_or(LedgerError::ParentNotFound(parent_id))?;
                    check_parent_type(&parent, account.account_type)?;
                }
            }
        }

        account.updated_at = Utc::now();
        tx.update_account(&account)
            .await
            .map_err(|e| code_conflict(e, &account.code))?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            account_id = %id,
            code = %account.code,
            "account updated"
        );
        Ok(account)
    }

    /// Re-parents an account and recomputes levels for its whole subtree.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` / `ParentNotFound`
    /// - `CircularReference` if `new_parent` is the account or a descendant;
    ///   the tree is left unchanged
    /// - `InvalidType` if the new parent has a different type
    pub async fn move_account(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: AccountId,
        new_parent: Option<AccountId>,
    ) -> Result<Account, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut account = tx
            .find_account(tenant_id, id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;

        if account.parent_id == new_parent {
            return Ok(account);
        }

        reparent(&mut tx, &mut account, new_parent).await?;
        account.updated_at = Utc::now();
        tx.update_account(&account).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            account_id = %id,
            parent_id = ?new_parent,
            level = account.level,
            "account moved"
        );
        Ok(account)
    }

    /// Hard-deletes an account with no children and no entries.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`, `HasChildren` or `HasEntries`.
    pub async fn delete(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: AccountId,
    ) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        let account = tx
            .find_account(tenant_id, id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;

        if tx.count_children(tenant_id, id).await? > 0 {
            return Err(LedgerError::HasChildren { code: account.code });
        }
        ensure_no_entries(&mut tx, &account).await?;

        tx.delete_account(tenant_id, id).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            account_id = %id,
            code = %account.code,
            "account deleted"
        );
        Ok(())
    }

    /// Marks an account inactive. Inactive accounts keep their history but
    /// reject new postings.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`.
    pub async fn deactivate(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: AccountId,
    ) -> Result<Account, LedgerError> {
        self.set_active(tenant_id, actor, id, false).await
    }

    /// Marks an account active again.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`.
    pub async fn activate(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: AccountId,
    ) -> Result<Account, LedgerError> {
        self.set_active(tenant_id, actor, id, true).await
    }

    async fn set_active(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: AccountId,
        is_active: bool,
    ) -> Result<Account, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut account = tx
            .find_account(tenant_id, id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;
        if account.is_active == is_active {
            return Ok(account);
        }
        account.is_active = is_active;
        account.updated_at = Utc::now();
        tx.update_account(&account).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            account_id = %id,
            is_active,
            "account activation changed"
        );
        Ok(account)
    }

    /// Whether [`Self::delete`] would succeed.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`.
    pub async fn can_delete(
        &self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<Eligibility, LedgerError> {
        let mut tx = self.store.begin().await?;
        let account = tx
            .find_account(tenant_id, id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;

        let children = tx.count_children(tenant_id, id).await?;
        if children > 0 {
            return Ok(Eligibility::denied(format!(
                "Account {} has {children} child account(s)",
                account.code
            )));
        }
        let entries = tx.count_entries(tenant_id, id).await?;
        if entries > 0 {
            return Ok(Eligibility::denied(format!(
                "Account {} is used by {entries} voucher entr{}; deactivate it instead",
                account.code,
                if entries == 1 { "y" } else { "ies" }
            )));
        }
        Ok(Eligibility::allowed())
    }

    /// Whether voucher entries may target the account.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`.
    pub async fn can_post(
        &self,
        tenant_id: TenantId,
        id: AccountId,
    ) -> Result<Eligibility, LedgerError> {
        let account = self.get(tenant_id, id).await?;
        Ok(posting_eligibility(&account))
    }

    /// Fetches one account.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`.
    pub async fn get(&self, tenant_id: TenantId, id: AccountId) -> Result<Account, LedgerError> {
        let mut tx = self.store.begin().await?;
        tx.find_account(tenant_id, id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, LedgerError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_accounts(tenant_id, filter).await?)
    }

    /// The tenant's chart of accounts as a forest.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn tree(&self, tenant_id: TenantId) -> Result<Vec<AccountNode>, LedgerError> {
        let accounts = self.list(tenant_id, &AccountFilter::default()).await?;
        Ok(build_tree(accounts))
    }
}

/// Posting eligibility of a loaded account.
#[must_use]
pub fn posting_eligibility(account: &Account) -> Eligibility {
    if account.is_control {
        Eligibility::denied(format!(
            "Account {} is a control account; post to one of its children",
            account.code
        ))
    } else if !account.is_active {
        Eligibility::denied(format!("Account {} is inactive", account.code))
    } else {
        Eligibility::allowed()
    }
}

/// Rejects postings to control or inactive accounts.
pub(crate) fn ensure_postable(account: &Account) -> Result<(), LedgerError> {
    if account.is_control {
        return Err(LedgerError::ControlAccountPosting {
            code: account.code.clone(),
        });
    }
    if !account.is_active {
        return Err(LedgerError::AccountInactive {
            code: account.code.clone(),
        });
    }
    Ok(())
}

async fn ensure_no_entries<T: AccountRepository + Send>(
    tx: &mut T,
    account: &Account,
) -> Result<(), LedgerError> {
    let count = tx.count_entries(account.tenant_id, account.id).await?;
    if count > 0 {
        return Err(LedgerError::HasEntries {
            code: account.code.clone(),
            count,
        });
    }
    Ok(())
}

/// Points `account` at `new_parent`, rejecting cycles, and rewrites the
/// levels of every descendant. The caller persists `account` itself.
async fn reparent<T: LedgerTx>(
    tx: &mut T,
    account: &mut Account,
    new_parent: Option<AccountId>,
) -> Result<(), LedgerError> {
    let tenant_id = account.tenant_id;
    let accounts = tx.list_accounts(tenant_id, &AccountFilter::default()).await?;
    let mut arena = AccountArena::from_accounts(&accounts);
    let by_id: HashMap<AccountId, &Account> = accounts.iter().map(|a| (a.id, a)).collect();

    if let Some(parent_id) = new_parent {
        let parent = by_id
            .get(&parent_id)
            .ok_or(LedgerError::ParentNotFound(parent_id))?;
        if arena.is_in_subtree(parent_id, account.id) {
            return Err(LedgerError::CircularReference {
                account_id: account.id,
                parent_id,
            });
        }
        check_parent_type(parent, account.account_type)?;
    }

    arena.reparent(account.id, new_parent);
    account.parent_id = new_parent;
    account.level = arena.depth(account.id);

    let now = Utc::now();
    for id in arena.descendants(account.id) {
        let Some(existing) = by_id.get(&id) else {
            continue;
        };
        let level = arena.depth(id);
        if existing.level != level {
            let mut child = (*existing).clone();
            child.level = level;
            child.updated_at = now;
            tx.update_account(&child).await?;
        }
    }
    Ok(())
}

fn code_conflict(err: StoreError, code: &str) -> LedgerError {
    match err {
        StoreError::UniqueViolation(_) => LedgerError::CodeExists(code.to_string()),
        other => other.into(),
    }
}
