//! `SeaORM` entities for the ledger schema.

pub mod prelude;

pub mod accounts;
pub mod fiscal_periods;
pub mod ledger_balances;
pub mod sea_orm_active_enums;
pub mod tenant_settings;
pub mod voucher_entries;
pub mod voucher_sequences;
pub mod vouchers;
