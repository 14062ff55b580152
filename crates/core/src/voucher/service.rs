//! Voucher lifecycle operations.
//!
//! Every operation runs in one transaction and locks the voucher row for
//! update, so two callers racing on the same voucher are serialised by the
//! store and the loser sees the winner's status.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{AccountId, PageRequest, PageResponse, TenantId, UserId, VoucherId};

use crate::accounts::service::ensure_postable;
use crate::error::LedgerError;
use crate::fiscal::FiscalCalendar;
use crate::ledger::PostingEngine;
use crate::store::{
    AccountRepository, LedgerStore, LedgerTx, RowLock, VoucherRepository, resolve_settings,
};
use crate::voucher::numbering::allocate_number;
use crate::voucher::reversal::build_reversal;
use crate::voucher::types::{
    AuditStamp, EntryInput, NewVoucher, Voucher, VoucherFilter, VoucherStatus, VoucherUpdate,
};
use crate::voucher::validation::{build_entries, require_entries, totals_of, validate_entries};
use crate::voucher::workflow::{VoucherAction, VoucherWorkflow};

/// Voucher aggregate operations for all tenants of a store.
#[derive(Debug)]
pub struct VoucherService<S> {
    store: Arc<S>,
    defaults: TenantSettings,
}

impl<S> Clone for VoucherService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            defaults: self.defaults,
        }
    }
}

impl<S: LedgerStore> VoucherService<S> {
    /// Creates the service; `defaults` apply to tenants without stored settings.
    #[must_use]
    pub const fn new(store: Arc<S>, defaults: TenantSettings) -> Self {
        Self { store, defaults }
    }

    /// Creates a draft voucher with a freshly allocated number.
    ///
    /// Nothing is written unless every entry is valid and the set balances.
    ///
    /// # Errors
    ///
    /// - `EntryInvalidAmount` / `EntryZeroAmount` / `Unbalanced`
    /// - `AccountNotFound`, `ControlAccountPosting`, `AccountInactive`
    pub async fn create(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        input: NewVoucher,
    ) -> Result<Voucher, LedgerError> {
        let mut tx = self.store.begin().await?;
        let settings = resolve_settings(&mut tx, tenant_id, self.defaults).await?;
        let totals = validate_entries(&input.entries, settings.decimal_precision)?;
        check_entry_accounts(&mut tx, tenant_id, &input.entries).await?;

        let number = allocate_number(&mut tx, tenant_id, input.voucher_type, input.date).await?;
        let voucher = Voucher {
            id: VoucherId::new(),
            tenant_id,
            number,
            date: input.date,
            voucher_type: input.voucher_type,
            status: VoucherStatus::Draft,
            description: input.description.trim().to_string(),
            reference: input.reference,
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            is_reversal: false,
            reversal_of_id: None,
            reversed_by_id: None,
            rejection_reason: None,
            created: AuditStamp::now(actor),
            updated: None,
            submitted: None,
            approved: None,
            rejected: None,
            posted: None,
            cancelled: None,
            entries: build_entries(input.entries, settings.decimal_precision),
        };
        tx.insert_voucher(&voucher).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            voucher_id = %voucher.id,
            voucher_number = %voucher.number,
            entries = voucher.entries.len(),
            "voucher created"
        );
        Ok(voucher)
    }

    /// Edits header fields and optionally the entry set.
    ///
    /// Editing a rejected voucher puts it back into draft.
    ///
    /// # Errors
    ///
    /// `VoucherNotFound`, `CannotEdit`, plus the entry errors of [`Self::create`].
    pub async fn update(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
        update: VoucherUpdate,
    ) -> Result<Voucher, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut voucher = load_voucher(&mut tx, tenant_id, id, RowLock::Exclusive).await?;
        VoucherWorkflow::ensure_editable(voucher.status)?;

        if let Some(date) = update.date {
            voucher.date = date;
        }
        if let Some(description) = update.description {
            voucher.description = description.trim().to_string();
        }
        if let Some(reference) = update.reference {
            voucher.reference = reference;
        }
        let entries_changed = match update.entries {
            Some(entries) => {
                self.set_entries(&mut tx, &mut voucher, entries).await?;
                true
            }
            None => false,
        };

        touch(&mut voucher, actor);
        tx.update_voucher(&voucher).await?;
        if entries_changed {
            tx.replace_entries(&voucher).await?;
        }
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            voucher_id = %id,
            voucher_number = %voucher.number,
            entries_changed,
            "voucher updated"
        );
        Ok(voucher)
    }

    /// Discards and re-inserts the whole entry set.
    ///
    /// # Errors
    ///
    /// `VoucherNotFound`, `CannotEdit`, plus the entry errors of [`Self::create`].
    pub async fn replace_entries(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
        entries: Vec<EntryInput>,
    ) -> Result<Voucher, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut voucher = load_voucher(&mut tx, tenant_id, id, RowLock::Exclusive).await?;
        VoucherWorkflow::ensure_editable(voucher.status)?;

        self.set_entries(&mut tx, &mut voucher, entries).await?;
        touch(&mut voucher, actor);
        tx.update_voucher(&voucher).await?;
        tx.replace_entries(&voucher).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            voucher_id = %id,
            entries = voucher.entries.len(),
            "voucher entries replaced"
        );
        Ok(voucher)
    }

    /// Deletes a draft or rejected voucher.
    ///
    /// # Errors
    ///
    /// `VoucherNotFound` or `CannotDelete`.
    pub async fn delete(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
    ) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        let voucher = load_voucher(&mut tx, tenant_id, id, RowLock::Exclusive).await?;
        VoucherWorkflow::ensure_deletable(voucher.status)?;
        tx.delete_voucher(tenant_id, id).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            voucher_id = %id,
            voucher_number = %voucher.number,
            "voucher deleted"
        );
        Ok(())
    }

    /// Draft → Pending. The entry set must be non-empty and balanced.
    ///
    /// # Errors
    ///
    /// `CannotSubmit`, `EmptyEntries` or `Unbalanced`.
    pub async fn submit(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
    ) -> Result<Voucher, LedgerError> {
        self.transition(tenant_id, actor, id, |voucher| {
            let action = VoucherWorkflow::submit(voucher.status, actor)?;
            require_entries(&voucher.entries)?;
            totals_of(&voucher.entries).ensure_balanced()?;
            Ok(action)
        })
        .await
    }

    /// Pending → Approved.
    ///
    /// # Errors
    ///
    /// `CannotApprove`.
    pub async fn approve(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
    ) -> Result<Voucher, LedgerError> {
        self.transition(tenant_id, actor, id, |voucher| {
            VoucherWorkflow::approve(voucher.status, actor)
        })
        .await
    }

    /// Pending → Rejected with a reason.
    ///
    /// # Errors
    ///
    /// `CannotReject` or `ReasonRequired`.
    pub async fn reject(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
        reason: &str,
    ) -> Result<Voucher, LedgerError> {
        self.transition(tenant_id, actor, id, |voucher| {
            VoucherWorkflow::reject(voucher.status, actor, reason)
        })
        .await
    }

    /// Cancels a voucher that has not been posted.
    ///
    /// # Errors
    ///
    /// `CannotCancel`.
    pub async fn cancel(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
    ) -> Result<Voucher, LedgerError> {
        self.transition(tenant_id, actor, id, |voucher| {
            VoucherWorkflow::cancel(voucher.status, actor)
        })
        .await
    }

    /// Approved → Posted, applying the entries to ledger balances.
    ///
    /// If the balances cannot be updated the voucher stays approved.
    ///
    /// # Errors
    ///
    /// - `CannotPost` unless approved
    /// - `PeriodNotFound` / `PeriodNotOpen` for the voucher date's period
    /// - `ControlAccountPosting` / `AccountInactive`
    pub async fn post(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
    ) -> Result<Voucher, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut voucher = load_voucher(&mut tx, tenant_id, id, RowLock::Exclusive).await?;
        let action = VoucherWorkflow::post(voucher.status, actor)?;
        require_entries(&voucher.entries)?;
        totals_of(&voucher.entries).ensure_balanced()?;

        let account_ids: Vec<AccountId> = voucher.entries.iter().map(|e| e.account_id).collect();
        check_accounts(&mut tx, tenant_id, &account_ids).await?;

        let settings = resolve_settings(&mut tx, tenant_id, self.defaults).await?;
        let calendar = FiscalCalendar::from_settings(&settings)?;
        let period = match PostingEngine::apply(&mut tx, &voucher, &calendar).await {
            Ok(period) => period,
            Err(err) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    actor = %actor,
                    voucher_id = %id,
                    voucher_number = %voucher.number,
                    error = %err,
                    "voucher post rejected"
                );
                return Err(err);
            }
        };

        voucher.apply(action);
        tx.update_voucher(&voucher).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            voucher_id = %id,
            voucher_number = %voucher.number,
            year = period.year,
            month = period.month,
            "voucher posted"
        );
        Ok(voucher)
    }

    /// Creates and posts the reversal of a posted voucher, dated `date`.
    ///
    /// Returns the new reversal voucher; the original keeps its posted
    /// status and points at the reversal through `reversed_by_id`.
    ///
    /// # Errors
    ///
    /// - `AlreadyReversed` / `CannotReverse`
    /// - `InvalidDate` if `date` precedes the original's date
    /// - `PeriodNotFound` / `PeriodNotOpen` for the reversal period
    pub async fn reverse(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
        date: NaiveDate,
        description: Option<&str>,
    ) -> Result<Voucher, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut original = load_voucher(&mut tx, tenant_id, id, RowLock::Exclusive).await?;
        VoucherWorkflow::ensure_reversible(&original)?;

        let settings = resolve_settings(&mut tx, tenant_id, self.defaults).await?;
        let calendar = FiscalCalendar::from_settings(&settings)?;
        let stamp = AuditStamp::now(actor);
        let number = allocate_number(&mut tx, tenant_id, original.voucher_type, date).await?;
        let reversal = build_reversal(&original, number, date, description, stamp)?;

        PostingEngine::apply(&mut tx, &reversal, &calendar).await?;
        tx.insert_voucher(&reversal).await?;
        original.reversed_by_id = Some(reversal.id);
        original.updated = Some(stamp);
        tx.update_voucher(&original).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            voucher_id = %id,
            voucher_number = %original.number,
            reversal_id = %reversal.id,
            reversal_number = %reversal.number,
            "voucher reversed"
        );
        Ok(reversal)
    }

    /// Fetches a voucher with its entries.
    ///
    /// # Errors
    ///
    /// `VoucherNotFound`.
    pub async fn get(&self, tenant_id: TenantId, id: VoucherId) -> Result<Voucher, LedgerError> {
        let mut tx = self.store.begin().await?;
        load_voucher(&mut tx, tenant_id, id, RowLock::None).await
    }

    /// Lists vouchers newest first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        filter: &VoucherFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Voucher>, LedgerError> {
        let page = PageRequest::new(page.page, page.per_page);
        let mut tx = self.store.begin().await?;
        let (data, total) = tx.list_vouchers(tenant_id, filter, page).await?;
        Ok(PageResponse::new(data, page, total))
    }

    async fn transition<F>(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        id: VoucherId,
        decide: F,
    ) -> Result<Voucher, LedgerError>
    where
        F: FnOnce(&Voucher) -> Result<VoucherAction, LedgerError> + Send,
    {
        let mut tx = self.store.begin().await?;
        let mut voucher = load_voucher(&mut tx, tenant_id, id, RowLock::Exclusive).await?;
        let from = voucher.status;
        let action = decide(&voucher)?;
        voucher.apply(action);
        tx.update_voucher(&voucher).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = %actor,
            voucher_id = %id,
            voucher_number = %voucher.number,
            from = %from,
            to = %voucher.status,
            "voucher status changed"
        );
        Ok(voucher)
    }

    async fn set_entries(
        &self,
        tx: &mut S::Tx,
        voucher: &mut Voucher,
        entries: Vec<EntryInput>,
    ) -> Result<(), LedgerError> {
        let settings = resolve_settings(tx, voucher.tenant_id, self.defaults).await?;
        let totals = validate_entries(&entries, settings.decimal_precision)?;
        check_entry_accounts(tx, voucher.tenant_id, &entries).await?;
        voucher.total_debit = totals.total_debit;
        voucher.total_credit = totals.total_credit;
        voucher.entries = build_entries(entries, settings.decimal_precision);
        Ok(())
    }
}

/// Records an edit and moves a rejected voucher back to draft.
fn touch(voucher: &mut Voucher, actor: UserId) {
    if voucher.status == VoucherStatus::Rejected {
        voucher.status = VoucherStatus::Draft;
    }
    voucher.updated = Some(AuditStamp::now(actor));
}

async fn load_voucher<T: VoucherRepository + Send>(
    tx: &mut T,
    tenant_id: TenantId,
    id: VoucherId,
    lock: RowLock,
) -> Result<Voucher, LedgerError> {
    tx.find_voucher(tenant_id, id, lock)
        .await?
        .ok_or(LedgerError::VoucherNotFound(id))
}

async fn check_entry_accounts<T: AccountRepository + Send>(
    tx: &mut T,
    tenant_id: TenantId,
    entries: &[EntryInput],
) -> Result<(), LedgerError> {
    let ids: Vec<AccountId> = entries.iter().map(|e| e.account_id).collect();
    check_accounts(tx, tenant_id, &ids).await
}

/// Every referenced account must exist and accept postings.
async fn check_accounts<T: AccountRepository + Send>(
    tx: &mut T,
    tenant_id: TenantId,
    ids: &[AccountId],
) -> Result<(), LedgerError> {
    if ids.is_empty() {
        return Ok(());
    }
    let unique: Vec<AccountId> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let found: HashMap<AccountId, _> = tx
        .find_accounts(tenant_id, &unique)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    // Report in entry order so the first bad line is the one named.
    for id in ids {
        let account = found.get(id).ok_or(LedgerError::AccountNotFound(*id))?;
        ensure_postable(account)?;
    }
    Ok(())
}
