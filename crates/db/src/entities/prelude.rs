//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::fiscal_periods::Entity as FiscalPeriods;
pub use super::ledger_balances::Entity as LedgerBalances;
pub use super::tenant_settings::Entity as TenantSettings;
pub use super::voucher_entries::Entity as VoucherEntries;
pub use super::voucher_sequences::Entity as VoucherSequences;
pub use super::vouchers::Entity as Vouchers;
