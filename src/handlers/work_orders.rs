use super::common::{created_response, none_if_empty, success_response, validate_input};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::work_orders::{CreateWorkOrderInput, UpdateWorkOrderInput, WorkOrderListFilter},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Creates the router for work order endpoints
pub fn work_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_work_orders).post(create_work_order))
        .route("/next-number", get(next_wo_number))
        .route(
            "/:id",
            get(get_work_order)
                .patch(update_work_order)
                .delete(delete_work_order),
        )
}

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkOrderRequest {
    pub wo_date: NaiveDate,
    pub item_id: i64,
    pub bom_id: i64,
    pub routing_id: i64,
    pub planned_quantity: Decimal,
    pub planned_start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    #[validate(length(min = 1, max = 50))]
    pub status: String,
}

/// Partial update payload. A `wo_number` key in the body is not part
/// of the schema and is silently dropped during deserialization.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkOrderRequest {
    pub wo_date: Option<NaiveDate>,
    pub item_id: Option<i64>,
    pub bom_id: Option<i64>,
    pub routing_id: Option<i64>,
    pub planned_quantity: Option<Decimal>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 50))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkOrderListQuery {
    pub status: Option<String>,
    pub exclude_status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
}

// Handler functions

/// List work orders with optional filtering
#[utoipa::path(
    get,
    path = "/api/v1/work-orders",
    params(WorkOrderListQuery),
    responses(
        (status = 200, description = "List work orders with item/bom/routing expanded"),
    ),
    tag = "work-orders"
)]
pub async fn list_work_orders(
    State(state): State<AppState>,
    Query(query): Query<WorkOrderListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = WorkOrderListFilter {
        status: none_if_empty(query.status),
        exclude_status: none_if_empty(query.exclude_status),
        date_from: query.date_from,
        date_to: query.date_to,
        search: none_if_empty(query.search),
    };

    let work_orders = state.work_order_service().list_work_orders(filter).await?;

    Ok(success_response(json!({ "data": work_orders })))
}

/// Create a work order; the number is generated server-side and the
/// routing is expanded into operations in the same transaction.
#[utoipa::path(
    post,
    path = "/api/v1/work-orders",
    request_body = CreateWorkOrderRequest,
    responses(
        (status = 201, description = "Work order created with operations expanded"),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 500, description = "Creation rolled back", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn create_work_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let input = CreateWorkOrderInput {
        wo_date: payload.wo_date,
        item_id: payload.item_id,
        bom_id: payload.bom_id,
        routing_id: payload.routing_id,
        planned_quantity: payload.planned_quantity,
        planned_start_date: payload.planned_start_date,
        planned_end_date: payload.planned_end_date,
        status: payload.status,
    };

    let detail = state.work_order_service().create_work_order(input).await?;

    info!(
        wo_id = detail.work_order.wo_id,
        wo_number = %detail.work_order.wo_number,
        "work order created"
    );

    Ok(created_response(json!({
        "data": detail,
        "message": "Work order created successfully"
    })))
}

/// Get a work order with its full nested graph
#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}",
    params(("id" = i64, Path, description = "Work order ID")),
    responses(
        (status = 200, description = "Work order details"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state
        .work_order_service()
        .get_work_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("work order {id} not found")))?;

    Ok(success_response(json!({ "data": detail })))
}

/// Update a work order; the work order number is immutable
#[utoipa::path(
    patch,
    path = "/api/v1/work-orders/{id}",
    params(("id" = i64, Path, description = "Work order ID")),
    request_body = UpdateWorkOrderRequest,
    responses(
        (status = 200, description = "Work order updated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn update_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateWorkOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let input = UpdateWorkOrderInput {
        wo_date: payload.wo_date,
        item_id: payload.item_id,
        bom_id: payload.bom_id,
        routing_id: payload.routing_id,
        planned_quantity: payload.planned_quantity,
        planned_start_date: payload.planned_start_date,
        planned_end_date: payload.planned_end_date,
        status: payload.status,
    };

    let updated = state.work_order_service().update_work_order(id, input).await?;

    Ok(success_response(json!({
        "data": updated,
        "message": "Work order updated successfully"
    })))
}

/// Delete a work order and its operations atomically
#[utoipa::path(
    delete,
    path = "/api/v1/work-orders/{id}",
    params(("id" = i64, Path, description = "Work order ID")),
    responses(
        (status = 200, description = "Work order deleted"),
        (status = 400, description = "Blocked by production orders", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    tag = "work-orders"
)]
pub async fn delete_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.work_order_service().delete_work_order(id).await?;

    Ok(success_response(json!({
        "message": "Work order deleted successfully"
    })))
}

/// Preview the next work order number. Non-binding: the value is a
/// hint computed outside any transaction, not a reservation.
#[utoipa::path(
    get,
    path = "/api/v1/work-orders/next-number",
    responses(
        (status = 200, description = "Next work order number preview"),
    ),
    tag = "work-orders"
)]
pub async fn next_wo_number(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let next = state.work_order_service().next_wo_number().await?;

    Ok(success_response(json!({ "next_wo_number": next })))
}
