//! Manufacturing work order API library.
//!
//! Core responsibilities: concurrency-safe generation of year-scoped
//! work order numbers (`J-YY-NNNNN`) and expansion of a routing's
//! operation template into trackable work order operations, both
//! inside a single creation transaction. The rest is CRUD plumbing
//! over the relational store.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn work_order_service(&self) -> Arc<services::work_orders::WorkOrderService> {
        self.services.work_orders.clone()
    }
}

/// Builds the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api-docs/openapi.json", get(serve_openapi))
        .nest(
            "/api/v1/work-orders",
            handlers::work_orders::work_order_routes(),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

async fn serve_openapi() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi as _;
    axum::Json(openapi::ApiDoc::openapi())
}
