use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A production authorization: build `planned_quantity` of an item per
/// a specific BOM and routing. `wo_number` is server-generated, unique
/// and immutable once set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub wo_id: i64,
    #[sea_orm(unique)]
    pub wo_number: String,
    pub wo_date: NaiveDate,
    pub item_id: i64,
    pub bom_id: i64,
    pub routing_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub planned_quantity: Decimal,
    pub planned_start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::ItemId"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::bom::Entity",
        from = "Column::BomId",
        to = "super::bom::Column::BomId"
    )]
    Bom,
    #[sea_orm(
        belongs_to = "super::routing::Entity",
        from = "Column::RoutingId",
        to = "super::routing::Column::RoutingId"
    )]
    Routing,
    #[sea_orm(has_many = "super::work_order_operation::Entity")]
    Operations,
    #[sea_orm(has_many = "super::production_order::Entity")]
    ProductionOrders,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::bom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bom.def()
    }
}

impl Related<super::routing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Routing.def()
    }
}

impl Related<super::work_order_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl Related<super::production_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
