use utoipa::OpenApi;

use crate::errors::ErrorResponse;
use crate::handlers::work_orders::{
    self, CreateWorkOrderRequest, UpdateWorkOrderRequest,
};

/// Aggregated OpenAPI document, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Work Order API",
        description = "Manufacturing work order management: year-scoped work order numbering, routing expansion into trackable operations"
    ),
    paths(
        work_orders::list_work_orders,
        work_orders::create_work_order,
        work_orders::next_wo_number,
        work_orders::get_work_order,
        work_orders::update_work_order,
        work_orders::delete_work_order,
    ),
    components(schemas(CreateWorkOrderRequest, UpdateWorkOrderRequest, ErrorResponse)),
    tags(
        (name = "work-orders", description = "Work order lifecycle endpoints")
    )
)]
pub struct ApiDoc;
