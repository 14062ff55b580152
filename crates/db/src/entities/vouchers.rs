//! `SeaORM` Entity for vouchers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{VoucherStatus, VoucherType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub number: String,
    pub voucher_date: Date,
    pub voucher_type: VoucherType,
    pub status: VoucherStatus,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub reference_kind: Option<String>,
    pub reference_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub total_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub total_credit: Decimal,
    pub is_reversal: bool,
    pub reversal_of_id: Option<Uuid>,
    pub reversed_by_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTimeWithTimeZone>,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTimeWithTimeZone>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTimeWithTimeZone>,
    pub posted_by: Option<Uuid>,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::voucher_entries::Entity")]
    VoucherEntries,
}

impl Related<super::voucher_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
