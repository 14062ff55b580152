//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountNature, AccountType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub nature: AccountNature,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub is_control: bool,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SelfRef,
    #[sea_orm(has_many = "super::voucher_entries::Entity")]
    VoucherEntries,
    #[sea_orm(has_many = "super::ledger_balances::Entity")]
    LedgerBalances,
}

impl Related<super::voucher_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherEntries.def()
    }
}

impl Related<super::ledger_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
