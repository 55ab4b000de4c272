pub mod common;
pub mod health;
pub mod work_orders;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::work_orders::WorkOrderService;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub work_orders: Arc<WorkOrderService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            work_orders: Arc::new(WorkOrderService::new(db_pool, event_sender)),
        }
    }
}
