//! Shared fixtures for ledger scenario tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use ledgerline_core::LedgerCore;
use ledgerline_core::LedgerError;
use ledgerline_core::accounts::{Account, AccountType, NewAccount};
use ledgerline_core::store::InMemoryStore;
use ledgerline_core::voucher::{EntryInput, NewVoucher, Voucher, VoucherType};
use ledgerline_shared::TenantSettings;
use ledgerline_shared::types::{AccountId, TenantId, UserId};

pub const YEAR: i32 = 2026;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A tenant with the 2026 periods created.
pub struct Fixture {
    pub core: LedgerCore<InMemoryStore>,
    pub tenant: TenantId,
    pub actor: UserId,
}

impl Fixture {
    pub async fn new() -> Self {
        let core = LedgerCore::new(InMemoryStore::new(), TenantSettings::default());
        Self::for_tenant(core, TenantId::new()).await
    }

    /// `tenant` on an existing core, with its periods for `YEAR` created.
    pub async fn for_tenant(core: LedgerCore<InMemoryStore>, tenant: TenantId) -> Self {
        let fixture = Self {
            core,
            tenant,
            actor: UserId::new(),
        };
        fixture
            .core
            .periods()
            .create_periods(fixture.tenant, fixture.actor, YEAR)
            .await
            .unwrap();
        fixture
    }

    pub async fn account(&self, code: &str, name: &str, account_type: AccountType) -> Account {
        self.child_account(code, name, account_type, None).await
    }

    pub async fn child_account(
        &self,
        code: &str,
        name: &str,
        account_type: AccountType,
        parent_id: Option<AccountId>,
    ) -> Account {
        self.core
            .accounts()
            .create(
                self.tenant,
                self.actor,
                NewAccount {
                    code: code.to_string(),
                    name: name.to_string(),
                    account_type,
                    nature: None,
                    parent_id,
                    is_control: false,
                    sort_order: 0,
                },
            )
            .await
            .unwrap()
    }

    pub async fn draft(&self, on: NaiveDate, entries: Vec<EntryInput>) -> Voucher {
        self.try_draft(on, entries).await.unwrap()
    }

    pub async fn try_draft(
        &self,
        on: NaiveDate,
        entries: Vec<EntryInput>,
    ) -> Result<Voucher, LedgerError> {
        self.core
            .vouchers()
            .create(
                self.tenant,
                self.actor,
                NewVoucher {
                    date: on,
                    voucher_type: VoucherType::General,
                    description: "Test voucher".to_string(),
                    reference: None,
                    entries,
                },
            )
            .await
    }

    /// Draft, submitted and approved.
    pub async fn approved(&self, on: NaiveDate, entries: Vec<EntryInput>) -> Voucher {
        let vouchers = self.core.vouchers();
        let voucher = self.draft(on, entries).await;
        vouchers.submit(self.tenant, self.actor, voucher.id).await.unwrap();
        vouchers.approve(self.tenant, self.actor, voucher.id).await.unwrap()
    }

    /// Runs the whole workflow through to posted.
    pub async fn posted(&self, on: NaiveDate, entries: Vec<EntryInput>) -> Voucher {
        let voucher = self.approved(on, entries).await;
        self.core
            .vouchers()
            .post(self.tenant, self.actor, voucher.id)
            .await
            .unwrap()
    }

    /// Posts `amount` from `debit` to `credit`.
    pub async fn transfer(
        &self,
        on: NaiveDate,
        debit: AccountId,
        credit: AccountId,
        amount: Decimal,
    ) -> Voucher {
        self.posted(
            on,
            vec![EntryInput::debit(debit, amount), EntryInput::credit(credit, amount)],
        )
        .await
    }
}
