use crate::{
    db::DbPool,
    entities::{
        bom, bom_line, item, production_order, routing, routing_operation, work_center,
        work_order, work_order_operation,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    IntoActiveModel, JoinType, LoaderTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, SqlErr, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Work order status labels are free-form strings at this layer. The
/// alias marks every place a future state machine would plug in
/// without changing the wire contract.
pub type WoStatus = String;

/// Initial status of every expanded work order operation.
pub const OPERATION_STATUS_PENDING: &str = "Pending";

/// Maximum status label length accepted on create/update.
pub const STATUS_MAX_LEN: usize = 50;

const WO_NUMBER_SEQ_WIDTH: usize = 5;
const WO_NUMBER_SEQ_MAX: u32 = 99_999;

/// Attempts of the generate+insert transaction before giving up when
/// concurrent creations keep winning the unique-index race.
const CREATE_MAX_ATTEMPTS: u32 = 5;

/// Builds the year-scoped prefix, e.g. `J-25-` for 2025.
fn wo_number_prefix(year: i32) -> String {
    format!("J-{:02}-", year.rem_euclid(100))
}

/// Computes the next number in a year's sequence from the latest
/// allocated one. Lexicographic max equals numeric max because the
/// suffix is fixed-width and zero-padded.
fn next_in_sequence(prefix: &str, latest: Option<&str>) -> Result<String, ServiceError> {
    let next = match latest {
        None => 1,
        Some(number) => {
            let tail_start = number.len().saturating_sub(WO_NUMBER_SEQ_WIDTH);
            let last: u32 = number
                .get(tail_start..)
                .and_then(|tail| tail.parse().ok())
                .ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "work order number {number} has a malformed sequence suffix"
                    ))
                })?;
            last + 1
        }
    };

    if next > WO_NUMBER_SEQ_MAX {
        return Err(ServiceError::InternalError(format!(
            "work order sequence exhausted for prefix {prefix}"
        )));
    }

    Ok(format!("{prefix}{next:0width$}", width = WO_NUMBER_SEQ_WIDTH))
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Input payload for creating a work order. `wo_number` is
/// intentionally absent: it is always server-generated.
#[derive(Debug, Clone)]
pub struct CreateWorkOrderInput {
    pub wo_date: NaiveDate,
    pub item_id: i64,
    pub bom_id: i64,
    pub routing_id: i64,
    pub planned_quantity: Decimal,
    pub planned_start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    pub status: WoStatus,
}

/// Partial update payload. `wo_number` is immutable and has no field
/// here, so client attempts to change it are silently dropped.
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkOrderInput {
    pub wo_date: Option<NaiveDate>,
    pub item_id: Option<i64>,
    pub bom_id: Option<i64>,
    pub routing_id: Option<i64>,
    pub planned_quantity: Option<Decimal>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub status: Option<WoStatus>,
}

/// Filters for the list endpoint. All are independent and combinable.
#[derive(Debug, Clone, Default)]
pub struct WorkOrderListFilter {
    pub status: Option<String>,
    pub exclude_status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
}

/// Listing view: work order with its direct associations expanded.
#[derive(Debug, Serialize)]
pub struct WorkOrderSummary {
    #[serde(flatten)]
    pub work_order: work_order::Model,
    pub item: Option<item::Model>,
    pub bom: Option<bom::Model>,
    pub routing: Option<routing::Model>,
}

#[derive(Debug, Serialize)]
pub struct BomLineDetail {
    #[serde(flatten)]
    pub line: bom_line::Model,
    pub item: Option<item::Model>,
}

#[derive(Debug, Serialize)]
pub struct BomDetail {
    #[serde(flatten)]
    pub bom: bom::Model,
    pub lines: Vec<BomLineDetail>,
}

#[derive(Debug, Serialize)]
pub struct RoutingOperationDetail {
    #[serde(flatten)]
    pub operation: routing_operation::Model,
    pub work_center: Option<work_center::Model>,
}

#[derive(Debug, Serialize)]
pub struct RoutingDetail {
    #[serde(flatten)]
    pub routing: routing::Model,
    pub operations: Vec<RoutingOperationDetail>,
}

#[derive(Debug, Serialize)]
pub struct WorkOrderOperationDetail {
    #[serde(flatten)]
    pub operation: work_order_operation::Model,
    pub routing_operation: Option<routing_operation::Model>,
}

/// Full nested graph returned by the show endpoint.
#[derive(Debug, Serialize)]
pub struct WorkOrderDetail {
    #[serde(flatten)]
    pub work_order: work_order::Model,
    pub item: Option<item::Model>,
    pub bom: Option<BomDetail>,
    pub routing: Option<RoutingDetail>,
    pub operations: Vec<WorkOrderOperationDetail>,
}

/// Service for managing manufacturing work orders. Owns every
/// transaction boundary: creation (number allocation + operation
/// expansion) and deletion are each a single atomic unit of work.
#[derive(Clone)]
pub struct WorkOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    /// Number races the service should deliberately lose, so the
    /// retry path can be driven on a single connection.
    #[cfg(test)]
    races_to_lose: Arc<std::sync::atomic::AtomicU32>,
}

impl WorkOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
            #[cfg(test)]
            races_to_lose: Arc::new(std::sync::atomic::AtomicU32::new(0)),
        }
    }

    fn connection(&self) -> &DbPool {
        self.db_pool.as_ref()
    }

    /// Computes the next work order number for the current year.
    ///
    /// Outside a creation transaction this is a non-binding preview:
    /// the value is a hint, not a reservation, and a concurrent
    /// creation may claim it first.
    pub async fn next_wo_number(&self) -> Result<String, ServiceError> {
        next_wo_number_on(self.connection()).await
    }

    /// Creates a work order and expands its routing into operations,
    /// all in one transaction. The unique index on `wo_number` is the
    /// arbiter of the read-then-insert race: on a unique violation the
    /// whole transaction is retried with a freshly generated number.
    #[instrument(skip(self, input), err)]
    pub async fn create_work_order(
        &self,
        input: CreateWorkOrderInput,
    ) -> Result<WorkOrderDetail, ServiceError> {
        validate_create(&input)?;
        self.validate_references(input.item_id, input.bom_id, input.routing_id)
            .await?;

        let db = self.connection();
        let mut attempt = 0;
        let created = loop {
            attempt += 1;
            let txn = db.begin().await?;
            match self.try_create(&txn, &input).await {
                Ok(model) => {
                    txn.commit().await?;
                    break model;
                }
                Err(ServiceError::DatabaseError(db_err)) if is_unique_violation(&db_err) => {
                    // txn rolls back on drop
                    if attempt >= CREATE_MAX_ATTEMPTS {
                        return Err(ServiceError::InternalError(format!(
                            "failed to allocate a work order number after {CREATE_MAX_ATTEMPTS} attempts"
                        )));
                    }
                    warn!(attempt, "work order number taken by a concurrent creation, retrying");
                }
                Err(e) => return Err(e),
            }
        };

        self.event_sender
            .send_or_log(Event::WorkOrderCreated {
                wo_id: created.wo_id,
                wo_number: created.wo_number.clone(),
            })
            .await;

        self.get_work_order(created.wo_id)
            .await?
            .ok_or_else(|| ServiceError::InternalError("created work order not readable".into()))
    }

    /// Lists work orders with associations expanded, newest first.
    #[instrument(skip(self), err)]
    pub async fn list_work_orders(
        &self,
        filter: WorkOrderListFilter,
    ) -> Result<Vec<WorkOrderSummary>, ServiceError> {
        let db = self.connection();
        let mut query = work_order::Entity::find();

        if let Some(status) = &filter.status {
            query = query.filter(work_order::Column::Status.eq(status.clone()));
        }
        if let Some(exclude) = &filter.exclude_status {
            query = query.filter(work_order::Column::Status.ne(exclude.clone()));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(work_order::Column::WoDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(work_order::Column::WoDate.lte(to));
        }
        if let Some(search) = &filter.search {
            query = query
                .join(JoinType::LeftJoin, work_order::Relation::Item.def())
                .filter(
                    Condition::any()
                        .add(work_order::Column::WoNumber.contains(search.clone()))
                        .add(item::Column::Name.contains(search.clone())),
                );
        }

        let orders = query
            .order_by_desc(work_order::Column::WoId)
            .all(db)
            .await?;

        let items = orders.load_one(item::Entity, db).await?;
        let boms = orders.load_one(bom::Entity, db).await?;
        let routings = orders.load_one(routing::Entity, db).await?;

        let summaries = orders
            .into_iter()
            .zip(items)
            .zip(boms)
            .zip(routings)
            .map(|(((work_order, item), bom), routing)| WorkOrderSummary {
                work_order,
                item,
                bom,
                routing,
            })
            .collect();

        Ok(summaries)
    }

    /// Fetches a work order with its full nested graph.
    #[instrument(skip(self), err)]
    pub async fn get_work_order(&self, wo_id: i64) -> Result<Option<WorkOrderDetail>, ServiceError> {
        let db = self.connection();
        let Some(work_order) = work_order::Entity::find_by_id(wo_id).one(db).await? else {
            return Ok(None);
        };

        let item = work_order.find_related(item::Entity).one(db).await?;

        let bom = match work_order.find_related(bom::Entity).one(db).await? {
            Some(bom) => {
                let lines = bom
                    .find_related(bom_line::Entity)
                    .order_by_asc(bom_line::Column::BomLineId)
                    .all(db)
                    .await?;
                let line_items = lines.load_one(item::Entity, db).await?;
                let lines = lines
                    .into_iter()
                    .zip(line_items)
                    .map(|(line, item)| BomLineDetail { line, item })
                    .collect();
                Some(BomDetail { bom, lines })
            }
            None => None,
        };

        let routing = match work_order.find_related(routing::Entity).one(db).await? {
            Some(routing) => {
                let operations = routing
                    .find_related(routing_operation::Entity)
                    .order_by_asc(routing_operation::Column::SequenceNumber)
                    .all(db)
                    .await?;
                let work_centers = operations.load_one(work_center::Entity, db).await?;
                let operations = operations
                    .into_iter()
                    .zip(work_centers)
                    .map(|(operation, work_center)| RoutingOperationDetail {
                        operation,
                        work_center,
                    })
                    .collect();
                Some(RoutingDetail {
                    routing,
                    operations,
                })
            }
            None => None,
        };

        let operations = work_order
            .find_related(work_order_operation::Entity)
            .order_by_asc(work_order_operation::Column::WoOperationId)
            .all(db)
            .await?;
        let routing_operations = operations.load_one(routing_operation::Entity, db).await?;
        let operations = operations
            .into_iter()
            .zip(routing_operations)
            .map(|(operation, routing_operation)| WorkOrderOperationDetail {
                operation,
                routing_operation,
            })
            .collect();

        Ok(Some(WorkOrderDetail {
            work_order,
            item,
            bom,
            routing,
            operations,
        }))
    }

    /// Applies a partial update. The work order number is immutable;
    /// cross-field date validation runs on the merged values.
    #[instrument(skip(self, input), err)]
    pub async fn update_work_order(
        &self,
        wo_id: i64,
        input: UpdateWorkOrderInput,
    ) -> Result<work_order::Model, ServiceError> {
        let db = self.connection();
        let model = work_order::Entity::find_by_id(wo_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("work order {wo_id} not found")))?;

        validate_update(&model, &input)?;
        self.validate_references(
            input.item_id.unwrap_or(model.item_id),
            input.bom_id.unwrap_or(model.bom_id),
            input.routing_id.unwrap_or(model.routing_id),
        )
        .await?;

        let mut active = model.into_active_model();
        if let Some(wo_date) = input.wo_date {
            active.wo_date = Set(wo_date);
        }
        if let Some(item_id) = input.item_id {
            active.item_id = Set(item_id);
        }
        if let Some(bom_id) = input.bom_id {
            active.bom_id = Set(bom_id);
        }
        if let Some(routing_id) = input.routing_id {
            active.routing_id = Set(routing_id);
        }
        if let Some(quantity) = input.planned_quantity {
            active.planned_quantity = Set(quantity);
        }
        if let Some(start) = input.planned_start_date {
            active.planned_start_date = Set(start);
        }
        if let Some(end) = input.planned_end_date {
            active.planned_end_date = Set(end);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;

        self.event_sender
            .send_or_log(Event::WorkOrderUpdated { wo_id })
            .await;

        Ok(updated)
    }

    /// Deletes a work order and its operations atomically. Blocked
    /// without side effects when production orders depend on it.
    #[instrument(skip(self), err)]
    pub async fn delete_work_order(&self, wo_id: i64) -> Result<(), ServiceError> {
        let db = self.connection();
        work_order::Entity::find_by_id(wo_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("work order {wo_id} not found")))?;

        let dependents = production_order::Entity::find()
            .filter(production_order::Column::WoId.eq(wo_id))
            .count(db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "cannot delete work order {wo_id}: it has associated production orders"
            )));
        }

        let txn = db.begin().await?;
        work_order_operation::Entity::delete_many()
            .filter(work_order_operation::Column::WoId.eq(wo_id))
            .exec(&txn)
            .await?;
        work_order::Entity::delete_by_id(wo_id).exec(&txn).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::WorkOrderDeleted { wo_id })
            .await;

        Ok(())
    }

    async fn validate_references(
        &self,
        item_id: i64,
        bom_id: i64,
        routing_id: i64,
    ) -> Result<(), ServiceError> {
        let db = self.connection();
        let mut missing = Vec::new();

        if item::Entity::find_by_id(item_id).one(db).await?.is_none() {
            missing.push(format!("item_id: item {item_id} does not exist"));
        }
        if bom::Entity::find_by_id(bom_id).one(db).await?.is_none() {
            missing.push(format!("bom_id: BOM {bom_id} does not exist"));
        }
        if routing::Entity::find_by_id(routing_id)
            .one(db)
            .await?
            .is_none()
        {
            missing.push(format!("routing_id: routing {routing_id} does not exist"));
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(missing.join("; ")))
        }
    }

    /// One attempt at the atomic create: allocate a number, insert the
    /// work order, expand the routing into operations.
    async fn try_create(
        &self,
        txn: &DatabaseTransaction,
        input: &CreateWorkOrderInput,
    ) -> Result<work_order::Model, ServiceError> {
        let now = Utc::now();
        let wo_number = next_wo_number_on(txn).await?;

        #[cfg(test)]
        self.lose_number_race(txn, input, &wo_number).await?;

        let work_order = work_order::ActiveModel {
            wo_number: Set(wo_number),
            wo_date: Set(input.wo_date),
            item_id: Set(input.item_id),
            bom_id: Set(input.bom_id),
            routing_id: Set(input.routing_id),
            planned_quantity: Set(input.planned_quantity),
            planned_start_date: Set(input.planned_start_date),
            planned_end_date: Set(input.planned_end_date),
            status: Set(input.status.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        let routing_operations = routing_operation::Entity::find()
            .filter(routing_operation::Column::RoutingId.eq(input.routing_id))
            .order_by_asc(routing_operation::Column::SequenceNumber)
            .all(txn)
            .await?;

        for routing_operation in &routing_operations {
            // Both scheduled bounds default to the creation instant, not
            // the planned dates. Real scheduling fills them in later.
            work_order_operation::ActiveModel {
                wo_id: Set(work_order.wo_id),
                routing_operation_id: Set(routing_operation.operation_id),
                scheduled_start: Set(now),
                scheduled_end: Set(now),
                actual_start: Set(None),
                actual_end: Set(None),
                actual_labor_time: Set(Decimal::ZERO),
                actual_machine_time: Set(Decimal::ZERO),
                status: Set(OPERATION_STATUS_PENDING.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?;
        }

        Ok(work_order)
    }
}

#[cfg(test)]
impl WorkOrderService {
    fn lose_next_races(&self, count: u32) {
        self.races_to_lose
            .store(count, std::sync::atomic::Ordering::SeqCst);
    }

    /// Claims `wo_number` on the transaction before the real insert,
    /// the way a concurrent creation would win the window between the
    /// sequence read and the write.
    async fn lose_number_race(
        &self,
        txn: &DatabaseTransaction,
        input: &CreateWorkOrderInput,
        wo_number: &str,
    ) -> Result<(), ServiceError> {
        use std::sync::atomic::Ordering;

        if self.races_to_lose.load(Ordering::SeqCst) == 0 {
            return Ok(());
        }
        self.races_to_lose.fetch_sub(1, Ordering::SeqCst);

        let now = Utc::now();
        work_order::ActiveModel {
            wo_number: Set(wo_number.to_string()),
            wo_date: Set(input.wo_date),
            item_id: Set(input.item_id),
            bom_id: Set(input.bom_id),
            routing_id: Set(input.routing_id),
            planned_quantity: Set(input.planned_quantity),
            planned_start_date: Set(input.planned_start_date),
            planned_end_date: Set(input.planned_end_date),
            status: Set(input.status.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(())
    }
}

/// Generates the next work order number against `conn`. Called inside
/// the creation transaction, and directly (non-binding) by the preview
/// endpoint.
pub async fn next_wo_number_on<C: ConnectionTrait>(conn: &C) -> Result<String, ServiceError> {
    let prefix = wo_number_prefix(Utc::now().year());
    let latest = work_order::Entity::find()
        .filter(work_order::Column::WoNumber.starts_with(&prefix))
        .order_by_desc(work_order::Column::WoNumber)
        .one(conn)
        .await?;
    next_in_sequence(&prefix, latest.as_ref().map(|m| m.wo_number.as_str()))
}

fn validate_create(input: &CreateWorkOrderInput) -> Result<(), ServiceError> {
    let mut problems = Vec::new();

    if input.planned_quantity <= Decimal::ZERO {
        problems.push("planned_quantity: must be positive".to_string());
    }
    if input.planned_end_date < input.planned_start_date {
        problems.push(
            "planned_end_date: must be on or after planned_start_date".to_string(),
        );
    }
    if input.status.is_empty() {
        problems.push("status: must not be empty".to_string());
    }
    if input.status.chars().count() > STATUS_MAX_LEN {
        problems.push(format!("status: must be at most {STATUS_MAX_LEN} characters"));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(problems.join("; ")))
    }
}

fn validate_update(
    current: &work_order::Model,
    input: &UpdateWorkOrderInput,
) -> Result<(), ServiceError> {
    let mut problems = Vec::new();

    if let Some(quantity) = input.planned_quantity {
        if quantity <= Decimal::ZERO {
            problems.push("planned_quantity: must be positive".to_string());
        }
    }

    let start = input
        .planned_start_date
        .unwrap_or(current.planned_start_date);
    let end = input.planned_end_date.unwrap_or(current.planned_end_date);
    if end < start {
        problems.push("planned_end_date: must be on or after planned_start_date".to_string());
    }

    if let Some(status) = &input.status {
        if status.is_empty() {
            problems.push("status: must not be empty".to_string());
        }
        if status.chars().count() > STATUS_MAX_LEN {
            problems.push(format!("status: must be at most {STATUS_MAX_LEN} characters"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(problems.join("; ")))
    }
}
