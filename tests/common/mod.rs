use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::ActiveModelTrait;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use workorder_api::{
    config::AppConfig,
    db,
    entities::{bom, bom_line, item, production_order, routing, routing_operation, work_center, work_order},
    events,
    handlers::AppServices,
    AppState,
};

/// Helper harness backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        // A single pooled connection keeps the in-memory database alive
        // for the whole test.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = events::EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };
        let router = workorder_api::app(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Issue a request against the router and decode the JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse response body")
        };
        (status, value)
    }

    pub async fn seed_item(&self, name: &str) -> item::Model {
        let now = Utc::now();
        item::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            uom_code: Set(Some("EA".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed item")
    }

    pub async fn seed_bom(&self, item_id: i64, component_item_id: i64) -> bom::Model {
        let now = Utc::now();
        let bom = bom::ActiveModel {
            item_id: Set(Some(item_id)),
            name: Set(format!("BOM for item {item_id}")),
            revision: Set(Some("A".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed bom");

        bom_line::ActiveModel {
            bom_id: Set(bom.bom_id),
            component_item_id: Set(component_item_id),
            quantity: Set(Decimal::new(2, 0)),
            uom_code: Set(Some("EA".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed bom line");

        bom
    }

    pub async fn seed_work_center(&self, name: &str) -> work_center::Model {
        let now = Utc::now();
        work_center::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed work center")
    }

    /// Seed a routing with `operation_count` ordered operations, all
    /// assigned to one work center.
    pub async fn seed_routing(&self, item_id: i64, operation_count: usize) -> routing::Model {
        let now = Utc::now();
        let routing = routing::ActiveModel {
            item_id: Set(Some(item_id)),
            name: Set(format!("Routing for item {item_id}")),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed routing");

        if operation_count > 0 {
            let work_center = self.seed_work_center("Assembly").await;
            for sequence in 1..=operation_count {
                routing_operation::ActiveModel {
                    routing_id: Set(routing.routing_id),
                    sequence_number: Set((sequence * 10) as i32),
                    name: Set(format!("Operation {sequence}")),
                    work_center_id: Set(Some(work_center.work_center_id)),
                    setup_time: Set(Some(Decimal::new(5, 1))),
                    run_time: Set(Some(Decimal::new(15, 1))),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(self.state.db.as_ref())
                .await
                .expect("seed routing operation");
            }
        }

        routing
    }

    /// Insert a work order row directly, bypassing the service. Used
    /// to stage prior-year numbers for sequence-reset tests.
    pub async fn seed_raw_work_order(
        &self,
        wo_number: &str,
        item_id: i64,
        bom_id: i64,
        routing_id: i64,
    ) -> work_order::Model {
        let now = Utc::now();
        work_order::ActiveModel {
            wo_number: Set(wo_number.to_string()),
            wo_date: Set(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")),
            item_id: Set(item_id),
            bom_id: Set(bom_id),
            routing_id: Set(routing_id),
            planned_quantity: Set(Decimal::new(10, 0)),
            planned_start_date: Set(NaiveDate::from_ymd_opt(2024, 6, 5).expect("valid date")),
            planned_end_date: Set(NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date")),
            status: Set("Closed".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed raw work order")
    }

    pub async fn seed_production_order(&self, wo_id: i64) -> production_order::Model {
        let now = Utc::now();
        production_order::ActiveModel {
            wo_id: Set(wo_id),
            quantity: Set(Some(Decimal::new(10, 0))),
            status: Set(Some("Released".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed production order")
    }
}

/// Two-digit prefix of the current year, as the number generator sees it.
pub fn current_year_prefix() -> String {
    use chrono::Datelike;
    format!("J-{:02}-", Utc::now().year() % 100)
}
