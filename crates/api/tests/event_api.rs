//! HTTP-level integration tests for the event type and event endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use sqlx::SqlitePool;

const PROJECT_A: &str = "11111111-1111-1111-1111-111111111111";

// ---------------------------------------------------------------------------
// Event type catalogue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_event_type_returns_201(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/event-types",
        serde_json::json!({"name": "project:created"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "project:created");
    assert_eq!(json["scope_project"], true);
    assert_eq!(json["scope_job"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_invalid_name_returns_400(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/event-types",
        serde_json::json!({"name": "NoColons"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reregister_with_different_shape_returns_409(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/event-types",
        serde_json::json!({"name": "project:created"}),
    )
    .await;

    // Same name, explicitly different shape.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/event-types",
        serde_json::json!({
            "name": "project:created",
            "shape": {
                "project": true, "pipeline": false, "job": true,
                "run": false, "build": false, "environment": false
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_event_type_by_name(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/event-types",
        serde_json::json!({"name": "project:pipeline:interactive-pipeline-run:succeeded"}),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = get(
        app,
        "/api/v1/event-types/project:pipeline:interactive-pipeline-run:succeeded",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["scope_project"], true);
    assert_eq!(json["scope_pipeline"], true);
    assert_eq!(json["scope_run"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_unknown_event_type_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/event-types/project:nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Event recording
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_record_event_returns_201(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/event-types",
        serde_json::json!({"name": "project:created"}),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/events",
        serde_json::json!({
            "type": "project:created",
            "scope": {"project_uuid": PROJECT_A},
            "payload": {"name": "demo"}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["id"].is_number());
    assert_eq!(json["project_uuid"], PROJECT_A);
    assert_eq!(json["payload"]["name"], "demo");
    assert_eq!(json["delivery_ids"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_record_event_with_unknown_type_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/events",
        serde_json::json!({"type": "project:nope", "payload": {}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_EVENT_TYPE");

    // The rejected event was never appended.
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/events").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_record_event_with_bad_scope_returns_400(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/event-types",
        serde_json::json!({"name": "project:created"}),
    )
    .await;

    // Missing the required project_uuid.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/events",
        serde_json::json!({"type": "project:created", "payload": {}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SCOPE_MISMATCH");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_event_and_deliveries(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/event-types",
        serde_json::json!({"name": "project:created"}),
    )
    .await;
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(
            app,
            "/api/v1/events",
            serde_json::json!({
                "type": "project:created",
                "scope": {"project_uuid": PROJECT_A},
                "payload": {}
            }),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/events/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/events/{id}/deliveries")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_nonexistent_event_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/events/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
