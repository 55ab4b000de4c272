mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{current_year_prefix, TestApp};

struct Fixture {
    item_id: i64,
    bom_id: i64,
    routing_id: i64,
}

async fn seed_fixture(app: &TestApp, item_name: &str, operations: usize) -> Fixture {
    let item = app.seed_item(item_name).await;
    let bom = app.seed_bom(item.item_id, item.item_id).await;
    let routing = app.seed_routing(item.item_id, operations).await;
    Fixture {
        item_id: item.item_id,
        bom_id: bom.bom_id,
        routing_id: routing.routing_id,
    }
}

fn create_body(fixture: &Fixture) -> Value {
    json!({
        "wo_date": "2025-06-01",
        "item_id": fixture.item_id,
        "bom_id": fixture.bom_id,
        "routing_id": fixture.routing_id,
        "planned_quantity": "100",
        "planned_start_date": "2025-06-05",
        "planned_end_date": "2025-06-10",
        "status": "Draft"
    })
}

async fn create_work_order(app: &TestApp, fixture: &Fixture) -> Value {
    let (status, body) = app
        .request(Method::POST, "/api/v1/work-orders", Some(create_body(fixture)))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn create_returns_201_with_number_and_expanded_operations() {
    let app = TestApp::new().await;
    let fixture = seed_fixture(&app, "Widget", 3).await;

    let (status, body) = app
        .request(Method::POST, "/api/v1/work-orders", Some(create_body(&fixture)))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Work order created successfully");

    let data = &body["data"];
    assert_eq!(
        data["wo_number"],
        format!("{}00001", current_year_prefix())
    );
    assert_eq!(data["status"], "Draft");

    let operations = data["operations"].as_array().expect("operations array");
    assert_eq!(operations.len(), 3);
    for operation in operations {
        assert_eq!(operation["status"], "Pending");
        assert!(operation["actual_start"].is_null());
        assert!(operation["actual_end"].is_null());
    }
}

#[tokio::test]
async fn create_rejects_invalid_payloads_with_422() {
    let app = TestApp::new().await;
    let fixture = seed_fixture(&app, "Widget", 1).await;

    // Missing required fields.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/work-orders",
            Some(json!({ "wo_date": "2025-06-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // References that do not exist.
    let mut body = create_body(&fixture);
    body["item_id"] = json!(9999);
    let (status, response) = app
        .request(Method::POST, "/api/v1/work-orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["message"]
        .as_str()
        .unwrap()
        .contains("item_id"));

    // Planned end before planned start.
    let mut body = create_body(&fixture);
    body["planned_end_date"] = json!("2025-06-01");
    let (status, _) = app
        .request(Method::POST, "/api/v1/work-orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Status over the length limit.
    let mut body = create_body(&fixture);
    body["status"] = json!("x".repeat(51));
    let (status, _) = app
        .request(Method::POST, "/api/v1/work-orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was persisted by the rejected attempts.
    let (_, list) = app.request(Method::GET, "/api/v1/work-orders", None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn get_returns_the_full_nested_graph() {
    let app = TestApp::new().await;
    let fixture = seed_fixture(&app, "Gadget", 2).await;
    let created = create_work_order(&app, &fixture).await;
    let wo_id = created["wo_id"].as_i64().unwrap();

    let (status, body) = app
        .request(Method::GET, &format!("/api/v1/work-orders/{wo_id}"), None)
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["item"]["name"], "Gadget");
    assert_eq!(data["bom"]["lines"].as_array().unwrap().len(), 1);

    let routing_ops = data["routing"]["operations"].as_array().unwrap();
    assert_eq!(routing_ops.len(), 2);
    assert_eq!(routing_ops[0]["sequence_number"], 10);
    assert_eq!(routing_ops[0]["work_center"]["name"], "Assembly");

    let operations = data["operations"].as_array().unwrap();
    assert_eq!(operations.len(), 2);
    assert_eq!(
        operations[0]["routing_operation"]["sequence_number"],
        routing_ops[0]["sequence_number"]
    );
}

#[tokio::test]
async fn missing_work_orders_return_404() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(Method::GET, "/api/v1/work-orders/123", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::PATCH,
            "/api/v1/work-orders/123",
            Some(json!({ "status": "Released" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::DELETE, "/api/v1/work-orders/123", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_updates_fields_but_never_the_number() {
    let app = TestApp::new().await;
    let fixture = seed_fixture(&app, "Widget", 1).await;
    let created = create_work_order(&app, &fixture).await;
    let wo_id = created["wo_id"].as_i64().unwrap();
    let original_number = created["wo_number"].as_str().unwrap().to_string();

    // A wo_number key in the payload is not part of the schema and
    // must be ignored.
    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/work-orders/{wo_id}"),
            Some(json!({
                "status": "Released",
                "wo_number": "J-99-99999"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "Released");
    assert_eq!(body["data"]["wo_number"], original_number.as_str());

    let (_, fetched) = app
        .request(Method::GET, &format!("/api/v1/work-orders/{wo_id}"), None)
        .await;
    assert_eq!(fetched["data"]["wo_number"], original_number.as_str());
    assert_eq!(fetched["data"]["status"], "Released");
}

#[tokio::test]
async fn delete_removes_the_work_order_and_its_operations() {
    let app = TestApp::new().await;
    let fixture = seed_fixture(&app, "Widget", 2).await;
    let created = create_work_order(&app, &fixture).await;
    let wo_id = created["wo_id"].as_i64().unwrap();

    let (status, body) = app
        .request(Method::DELETE, &format!("/api/v1/work-orders/{wo_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Work order deleted successfully");

    let (status, _) = app
        .request(Method::GET, &format!("/api/v1/work-orders/{wo_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_is_blocked_by_production_orders() {
    let app = TestApp::new().await;
    let fixture = seed_fixture(&app, "Widget", 1).await;
    let created = create_work_order(&app, &fixture).await;
    let wo_id = created["wo_id"].as_i64().unwrap();
    app.seed_production_order(wo_id).await;

    let (status, body) = app
        .request(Method::DELETE, &format!("/api/v1/work-orders/{wo_id}"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("production orders"));

    // Still fully intact.
    let (status, fetched) = app
        .request(Method::GET, &format!("/api/v1/work-orders/{wo_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["operations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_supports_all_filters() {
    let app = TestApp::new().await;
    let widget = seed_fixture(&app, "Widget", 1).await;
    let sprocket = seed_fixture(&app, "Sprocket", 1).await;

    let mut first = create_body(&widget);
    first["wo_date"] = json!("2025-06-01");
    let (status, _) = app
        .request(Method::POST, "/api/v1/work-orders", Some(first))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut second = create_body(&sprocket);
    second["wo_date"] = json!("2025-07-01");
    second["status"] = json!("Released");
    let (status, _) = app
        .request(Method::POST, "/api/v1/work-orders", Some(second))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Unfiltered, newest first.
    let (status, body) = app.request(Method::GET, "/api/v1/work-orders", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["status"], "Released");

    let (_, body) = app
        .request(Method::GET, "/api/v1/work-orders?status=Draft", None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], "Draft");

    let (_, body) = app
        .request(Method::GET, "/api/v1/work-orders?exclude_status=Draft", None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], "Released");

    let (_, body) = app
        .request(
            Method::GET,
            "/api/v1/work-orders?date_from=2025-06-15&date_to=2025-07-15",
            None,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["wo_date"], "2025-07-01");

    // Search covers the related item name.
    let (_, body) = app
        .request(Method::GET, "/api/v1/work-orders?search=Sprock", None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["item"]["name"], "Sprocket");

    // And the number itself.
    let (_, body) = app
        .request(Method::GET, "/api/v1/work-orders?search=00002", None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // An empty parameter means no filter.
    let (_, body) = app
        .request(Method::GET, "/api/v1/work-orders?status=", None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn next_number_endpoint_previews_without_reserving() {
    let app = TestApp::new().await;
    let fixture = seed_fixture(&app, "Widget", 1).await;

    let expected = format!("{}00001", current_year_prefix());

    let (status, body) = app
        .request(Method::GET, "/api/v1/work-orders/next-number", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next_wo_number"], expected.as_str());

    // Previewing twice changes nothing.
    let (_, body) = app
        .request(Method::GET, "/api/v1/work-orders/next-number", None)
        .await;
    assert_eq!(body["next_wo_number"], expected.as_str());

    let created = create_work_order(&app, &fixture).await;
    assert_eq!(created["wo_number"], expected.as_str());
}

#[tokio::test]
async fn openapi_document_is_served_and_lists_every_route() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().expect("paths object");
    assert!(paths.contains_key("/api/v1/work-orders"));
    assert!(paths.contains_key("/api/v1/work-orders/next-number"));
    assert!(paths.contains_key("/api/v1/work-orders/{id}"));
    assert!(body["components"]["schemas"]["CreateWorkOrderRequest"].is_object());
    assert!(body["components"]["schemas"]["ErrorResponse"].is_object());
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
