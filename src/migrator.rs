// The `MigrationTrait` signatures in sea-orm-migration elide the
// `SchemaManager` lifetime in a way impls must mirror exactly (E0195),
// so the crate-wide `rust_2018_idioms` deny cannot apply here.
#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_catalog_tables::Migration),
            Box::new(m20240601_000002_create_bom_tables::Migration),
            Box::new(m20240601_000003_create_routing_tables::Migration),
            Box::new(m20240601_000004_create_work_order_tables::Migration),
            Box::new(m20240601_000005_create_production_orders_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240601_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::ItemId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Description).string())
                        .col(ColumnDef::new(Items::UomCode).string())
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Items::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkCenters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkCenters::WorkCenterId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkCenters::Name).string().not_null())
                        .col(ColumnDef::new(WorkCenters::Description).string())
                        .col(
                            ColumnDef::new(WorkCenters::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkCenters::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkCenters::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Items {
        Table,
        ItemId,
        Name,
        Description,
        UomCode,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum WorkCenters {
        Table,
        WorkCenterId,
        Name,
        Description,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000002_create_bom_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_catalog_tables::Items;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_bom_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Boms::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Boms::BomId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Boms::ItemId).big_integer())
                        .col(ColumnDef::new(Boms::Name).string().not_null())
                        .col(ColumnDef::new(Boms::Revision).string())
                        .col(
                            ColumnDef::new(Boms::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Boms::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_boms_item_id")
                                .from(Boms::Table, Boms::ItemId)
                                .to(Items::Table, Items::ItemId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BomLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BomLines::BomLineId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BomLines::BomId).big_integer().not_null())
                        .col(
                            ColumnDef::new(BomLines::ComponentItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomLines::Quantity)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(BomLines::UomCode).string())
                        .col(
                            ColumnDef::new(BomLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_lines_bom_id")
                                .from(BomLines::Table, BomLines::BomId)
                                .to(Boms::Table, Boms::BomId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_lines_component_item_id")
                                .from(BomLines::Table, BomLines::ComponentItemId)
                                .to(Items::Table, Items::ItemId),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BomLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Boms::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Boms {
        Table,
        BomId,
        ItemId,
        Name,
        Revision,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum BomLines {
        Table,
        BomLineId,
        BomId,
        ComponentItemId,
        Quantity,
        UomCode,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_routing_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_catalog_tables::{Items, WorkCenters};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_routing_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Routings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Routings::RoutingId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Routings::ItemId).big_integer())
                        .col(ColumnDef::new(Routings::Name).string().not_null())
                        .col(
                            ColumnDef::new(Routings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Routings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_routings_item_id")
                                .from(Routings::Table, Routings::ItemId)
                                .to(Items::Table, Items::ItemId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RoutingOperations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RoutingOperations::OperationId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::RoutingId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::SequenceNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RoutingOperations::Name).string().not_null())
                        .col(ColumnDef::new(RoutingOperations::WorkCenterId).big_integer())
                        .col(ColumnDef::new(RoutingOperations::SetupTime).decimal_len(19, 4))
                        .col(ColumnDef::new(RoutingOperations::RunTime).decimal_len(19, 4))
                        .col(
                            ColumnDef::new(RoutingOperations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_routing_operations_routing_id")
                                .from(RoutingOperations::Table, RoutingOperations::RoutingId)
                                .to(Routings::Table, Routings::RoutingId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_routing_operations_work_center_id")
                                .from(RoutingOperations::Table, RoutingOperations::WorkCenterId)
                                .to(WorkCenters::Table, WorkCenters::WorkCenterId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_routing_operations_routing_seq")
                        .table(RoutingOperations::Table)
                        .col(RoutingOperations::RoutingId)
                        .col(RoutingOperations::SequenceNumber)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RoutingOperations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Routings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Routings {
        Table,
        RoutingId,
        ItemId,
        Name,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum RoutingOperations {
        Table,
        OperationId,
        RoutingId,
        SequenceNumber,
        Name,
        WorkCenterId,
        SetupTime,
        RunTime,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000004_create_work_order_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_catalog_tables::Items;
    use super::m20240601_000002_create_bom_tables::Boms;
    use super::m20240601_000003_create_routing_tables::{RoutingOperations, Routings};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_work_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WorkOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkOrders::WoId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkOrders::WoNumber).string().not_null())
                        .col(ColumnDef::new(WorkOrders::WoDate).date().not_null())
                        .col(ColumnDef::new(WorkOrders::ItemId).big_integer().not_null())
                        .col(ColumnDef::new(WorkOrders::BomId).big_integer().not_null())
                        .col(
                            ColumnDef::new(WorkOrders::RoutingId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::PlannedQuantity)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::PlannedStartDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::PlannedEndDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::Status)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_orders_item_id")
                                .from(WorkOrders::Table, WorkOrders::ItemId)
                                .to(Items::Table, Items::ItemId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_orders_bom_id")
                                .from(WorkOrders::Table, WorkOrders::BomId)
                                .to(Boms::Table, Boms::BomId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_orders_routing_id")
                                .from(WorkOrders::Table, WorkOrders::RoutingId)
                                .to(Routings::Table, Routings::RoutingId),
                        )
                        .to_owned(),
                )
                .await?;

            // The unique index is the arbiter of concurrent number
            // allocation; creation retries on violations of it.
            manager
                .create_index(
                    Index::create()
                        .name("idx_work_orders_wo_number")
                        .table(WorkOrders::Table)
                        .col(WorkOrders::WoNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkOrderOperations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkOrderOperations::WoOperationId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::WoId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::RoutingOperationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ScheduledStart)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ScheduledEnd)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ActualStart)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ActualEnd)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ActualLaborTime)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ActualMachineTime)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::Status)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_order_operations_wo_id")
                                .from(WorkOrderOperations::Table, WorkOrderOperations::WoId)
                                .to(WorkOrders::Table, WorkOrders::WoId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_order_operations_routing_operation_id")
                                .from(
                                    WorkOrderOperations::Table,
                                    WorkOrderOperations::RoutingOperationId,
                                )
                                .to(RoutingOperations::Table, RoutingOperations::OperationId),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkOrderOperations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WorkOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum WorkOrders {
        Table,
        WoId,
        WoNumber,
        WoDate,
        ItemId,
        BomId,
        RoutingId,
        PlannedQuantity,
        PlannedStartDate,
        PlannedEndDate,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum WorkOrderOperations {
        Table,
        WoOperationId,
        WoId,
        RoutingOperationId,
        ScheduledStart,
        ScheduledEnd,
        ActualStart,
        ActualEnd,
        ActualLaborTime,
        ActualMachineTime,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000005_create_production_orders_table {
    use sea_orm_migration::prelude::*;

    use super::m20240601_000004_create_work_order_tables::WorkOrders;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_production_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionOrders::ProductionOrderId)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::WoId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::Quantity).decimal_len(19, 4))
                        .col(ColumnDef::new(ProductionOrders::Status).string_len(50))
                        .col(
                            ColumnDef::new(ProductionOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_production_orders_wo_id")
                                .from(ProductionOrders::Table, ProductionOrders::WoId)
                                .to(WorkOrders::Table, WorkOrders::WoId),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ProductionOrders {
        Table,
        ProductionOrderId,
        WoId,
        Quantity,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}
