use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A concrete, trackable instance of one routing step, scoped to a
/// single work order. The `actual_*` fields are populated later by
/// execution tracking; this layer only seeds their defaults.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_order_operations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub wo_operation_id: i64,
    pub wo_id: i64,
    pub routing_operation_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub actual_labor_time: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub actual_machine_time: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_order::Entity",
        from = "Column::WoId",
        to = "super::work_order::Column::WoId"
    )]
    WorkOrder,
    #[sea_orm(
        belongs_to = "super::routing_operation::Entity",
        from = "Column::RoutingOperationId",
        to = "super::routing_operation::Column::OperationId"
    )]
    RoutingOperation,
}

impl Related<super::work_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrder.def()
    }
}

impl Related<super::routing_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoutingOperation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
