//! `SeaORM` Entity for ledger_balances table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tenant_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub period_year: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub period_month: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub opening_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub opening_credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub period_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub period_credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub closing_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub closing_credit: Decimal,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
