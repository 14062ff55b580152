//! General-ledger core for Ledgerline.
//!
//! This crate holds the bookkeeping rules with no database or web
//! dependencies. Storage is reached through the repository traits in
//! [`store`]; an in-memory adapter ships for tests and embedding.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts hierarchy and rules
//! - `voucher` - Voucher aggregate and approval workflow
//! - `ledger` - Posting engine and balance projection
//! - `fiscal` - Fiscal calendar, period lifecycle, year-end close
//! - `reports` - Trial balance, balance sheet, income statement
//! - `store` - Persistence interface

use std::sync::Arc;

use ledgerline_shared::TenantSettings;

pub mod accounts;
pub mod error;
pub mod fiscal;
pub mod ledger;
pub mod reports;
pub mod store;
pub mod voucher;

pub use error::{ErrorKind, LedgerError};

use accounts::AccountDirectory;
use fiscal::FiscalPeriodManager;
use ledger::LedgerService;
use reports::ReportGenerator;
use store::LedgerStore;
use voucher::VoucherService;

/// All ledger components over one store.
///
/// Cheap to clone; every component shares the same store handle.
#[derive(Debug)]
pub struct LedgerCore<S> {
    store: Arc<S>,
    defaults: TenantSettings,
}

impl<S> Clone for LedgerCore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            defaults: self.defaults,
        }
    }
}

impl<S: LedgerStore> LedgerCore<S> {
    /// Wraps `store`. `defaults` apply to tenants without stored settings.
    #[must_use]
    pub fn new(store: S, defaults: TenantSettings) -> Self {
        Self {
            store: Arc::new(store),
            defaults,
        }
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Chart of accounts.
    #[must_use]
    pub fn accounts(&self) -> AccountDirectory<S> {
        AccountDirectory::new(Arc::clone(&self.store))
    }

    /// Voucher lifecycle.
    #[must_use]
    pub fn vouchers(&self) -> VoucherService<S> {
        VoucherService::new(Arc::clone(&self.store), self.defaults)
    }

    /// Ledger balances.
    #[must_use]
    pub fn ledger(&self) -> LedgerService<S> {
        LedgerService::new(Arc::clone(&self.store), self.defaults)
    }

    /// Fiscal periods.
    #[must_use]
    pub fn periods(&self) -> FiscalPeriodManager<S> {
        FiscalPeriodManager::new(Arc::clone(&self.store), self.defaults)
    }

    /// Financial reports.
    #[must_use]
    pub fn reports(&self) -> ReportGenerator<S> {
        ReportGenerator::new(Arc::clone(&self.store))
    }
}
