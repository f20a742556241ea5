//! `SeaORM` Entity for expenses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub submitter_id: Uuid,
    pub submitter_name: String,
    pub category: String,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub amount: Decimal,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub base_amount: Decimal,
    pub base_currency: String,
    #[sea_orm(column_type = "Decimal(Some((28, 10)))")]
    pub conversion_rate: Decimal,
    pub rate_degraded: bool,
    pub expense_date: Date,
    #[sea_orm(column_type = "JsonBinary")]
    pub approval_flow: Json,
    pub current_approver_index: Option<i32>,
    pub status: String,
    pub status_role: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub history: Json,
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SubmitterId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
