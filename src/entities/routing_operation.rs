use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One step of a routing template. `sequence_number` defines the
/// iteration order used when a work order is expanded.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "routing_operations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub operation_id: i64,
    pub routing_id: i64,
    pub sequence_number: i32,
    pub name: String,
    pub work_center_id: Option<i64>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub setup_time: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub run_time: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::routing::Entity",
        from = "Column::RoutingId",
        to = "super::routing::Column::RoutingId"
    )]
    Routing,
    #[sea_orm(
        belongs_to = "super::work_center::Entity",
        from = "Column::WorkCenterId",
        to = "super::work_center::Column::WorkCenterId"
    )]
    WorkCenter,
    #[sea_orm(has_many = "super::work_order_operation::Entity")]
    WorkOrderOperations,
}

impl Related<super::routing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Routing.def()
    }
}

impl Related<super::work_center::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkCenter.def()
    }
}

impl Related<super::work_order_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrderOperations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
