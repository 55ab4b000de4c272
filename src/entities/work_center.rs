use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_centers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub work_center_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::routing_operation::Entity")]
    RoutingOperations,
}

impl Related<super::routing_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoutingOperations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
