mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{test_password, TestContext};

#[tokio::test]
async fn vehicle_crud_roundtrip() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&token).await;

    let list = ctx
        .server
        .get("/api/vehicles")
        .authorization_bearer(&token)
        .await;
    list.assert_status_ok();
    let vehicles: serde_json::Value = list.json();
    assert_eq!(vehicles.as_array().unwrap().len(), 1);
    assert_eq!(vehicles[0]["make"], "Honda");

    // Patch only the odometer; everything else stays.
    let patch = ctx
        .server
        .put(&format!("/api/vehicles/{vehicle_id}"))
        .authorization_bearer(&token)
        .json(&json!({ "odometer": 12_500 }))
        .await;
    patch.assert_status_ok();

    let fetched = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}"))
        .authorization_bearer(&token)
        .await;
    let vehicle: serde_json::Value = fetched.json();
    assert_eq!(vehicle["odometer"], 12_500);
    assert_eq!(vehicle["model"], "Civic");

    let delete = ctx
        .server
        .delete(&format!("/api/vehicles/{vehicle_id}"))
        .authorization_bearer(&token)
        .await;
    delete.assert_status_ok();

    let gone = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}"))
        .authorization_bearer(&token)
        .await;
    gone.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn foreign_vehicles_look_nonexistent() {
    let ctx = TestContext::new().await;
    let alice = ctx.register_and_login("alice", test_password()).await;
    let bob = ctx.register_and_login("bob", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&alice).await;

    let response = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}"))
        .authorization_bearer(&bob)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let records = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}/service-records"))
        .authorization_bearer(&bob)
        .await;
    records.assert_status(StatusCode::NOT_FOUND);

    let export = ctx
        .server
        .get(&format!(
            "/api/export/service_records?vehicle_id={vehicle_id}"
        ))
        .authorization_bearer(&bob)
        .await;
    export.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fuel_economy_is_derived_from_the_previous_fill_up() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&token).await;

    // First fill-up has nothing to compare against.
    let first = ctx
        .server
        .post(&format!("/api/vehicles/{vehicle_id}/fuel-records"))
        .authorization_bearer(&token)
        .json(&json!({
            "date": "2024-01-01",
            "odometer": 10_000,
            "fuel_amount": 18.0,
            "cost": 54.0,
        }))
        .await;
    first.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = first.json();
    assert!(body["fuel_economy"].is_null());

    // 400 miles on 20 units is 20.0 MPG.
    let second = ctx
        .server
        .post(&format!("/api/vehicles/{vehicle_id}/fuel-records"))
        .authorization_bearer(&token)
        .json(&json!({
            "date": "2024-01-20",
            "odometer": 10_400,
            "fuel_amount": 20.0,
            "cost": 60.0,
        }))
        .await;
    second.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = second.json();
    assert_eq!(body["fuel_economy"], 20.0);

    let list = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}/fuel-records"))
        .authorization_bearer(&token)
        .await;
    list.assert_status_ok();
    let records: serde_json::Value = list.json();
    assert_eq!(records.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn service_records_nest_under_their_vehicle() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&token).await;

    let created = ctx
        .server
        .post(&format!("/api/vehicles/{vehicle_id}/service-records"))
        .authorization_bearer(&token)
        .json(&json!({
            "date": "2024-02-01",
            "odometer": 10_200,
            "description": "Oil change",
            "cost": 45.0,
            "category": "maintenance",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = created.json();
    let record_id = body["id"].as_i64().unwrap();

    let patch = ctx
        .server
        .put(&format!(
            "/api/vehicles/{vehicle_id}/service-records/{record_id}"
        ))
        .authorization_bearer(&token)
        .json(&json!({ "cost": 49.5 }))
        .await;
    patch.assert_status_ok();

    let fetched = ctx
        .server
        .get(&format!(
            "/api/vehicles/{vehicle_id}/service-records/{record_id}"
        ))
        .authorization_bearer(&token)
        .await;
    let record: serde_json::Value = fetched.json();
    assert_eq!(record["cost"], 49.5);
    assert_eq!(record["description"], "Oil change");
    assert_eq!(record["date"], "2024-02-01");
}

#[tokio::test]
async fn completed_reminders_drop_out_of_the_list() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&token).await;

    let created = ctx
        .server
        .post(&format!("/api/vehicles/{vehicle_id}/reminders"))
        .authorization_bearer(&token)
        .json(&json!({
            "description": "Renew registration",
            "due_date": "2024-06-01",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = created.json();
    let reminder_id = body["id"].as_i64().unwrap();

    let open = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}/reminders"))
        .authorization_bearer(&token)
        .await;
    let reminders: serde_json::Value = open.json();
    assert_eq!(reminders.as_array().unwrap().len(), 1);

    ctx.server
        .put(&format!("/api/vehicles/{vehicle_id}/reminders/{reminder_id}"))
        .authorization_bearer(&token)
        .json(&json!({ "completed": true }))
        .await
        .assert_status_ok();

    let after = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}/reminders"))
        .authorization_bearer(&token)
        .await;
    let reminders: serde_json::Value = after.json();
    assert!(reminders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn recurring_expense_due_date_and_soft_cancel() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&token).await;

    let created = ctx
        .server
        .post(&format!("/api/vehicles/{vehicle_id}/recurring-expenses"))
        .authorization_bearer(&token)
        .json(&json!({
            "expense_type": "insurance",
            "description": "Liability insurance",
            "amount": 85.0,
            "frequency": "monthly",
            "start_date": "2024-01-15",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = created.json();
    let expense_id = body["id"].as_i64().unwrap();

    let fetched = ctx
        .server
        .get(&format!(
            "/api/vehicles/{vehicle_id}/recurring-expenses/{expense_id}"
        ))
        .authorization_bearer(&token)
        .await;
    let expense: serde_json::Value = fetched.json();
    // Monthly means thirty days out, computed once at creation.
    assert_eq!(expense["next_due_date"], "2024-02-14");
    assert_eq!(expense["is_active"], true);

    ctx.server
        .delete(&format!(
            "/api/vehicles/{vehicle_id}/recurring-expenses/{expense_id}"
        ))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    // Cancelled schedules disappear from the active list but stay fetchable.
    let list = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}/recurring-expenses"))
        .authorization_bearer(&token)
        .await;
    let expenses: serde_json::Value = list.json();
    assert!(expenses.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn todo_type_field_round_trips() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&token).await;

    let created = ctx
        .server
        .post(&format!("/api/vehicles/{vehicle_id}/todos"))
        .authorization_bearer(&token)
        .json(&json!({
            "description": "Replace cabin filter",
            "type": "maintenance",
            "priority": "low",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);

    let list = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}/todos"))
        .authorization_bearer(&token)
        .await;
    let todos: serde_json::Value = list.json();
    assert_eq!(todos[0]["type"], "maintenance");
    assert_eq!(todos[0]["priority"], "low");
    assert_eq!(todos[0]["status"], "planned");
}

#[tokio::test]
async fn csv_export_contains_records() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&token).await;

    ctx.server
        .post(&format!("/api/vehicles/{vehicle_id}/service-records"))
        .authorization_bearer(&token)
        .json(&json!({
            "date": "2024-02-01",
            "odometer": 10_200,
            "description": "Oil change",
            "cost": 45.0,
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let export = ctx
        .server
        .get(&format!(
            "/api/export/service_records?vehicle_id={vehicle_id}"
        ))
        .authorization_bearer(&token)
        .await;
    export.assert_status_ok();
    let body = export.text();
    assert!(body.starts_with("Date,Odometer,Description"));
    assert!(body.contains("Oil change"));

    let bad_type = ctx
        .server
        .get(&format!("/api/export/unknown?vehicle_id={vehicle_id}"))
        .authorization_bearer(&token)
        .await;
    bad_type.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_all_returns_a_zip_archive() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;
    let vehicle_id = ctx.create_vehicle(&token).await;

    let export = ctx
        .server
        .get(&format!("/api/vehicles/{vehicle_id}/export-all"))
        .authorization_bearer(&token)
        .await;
    export.assert_status_ok();
    // Zip magic bytes.
    let bytes = export.as_bytes();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let ctx = TestContext::new().await;
    let response = ctx.server.get("/api/vehicles").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
