//! Web API Import Tests
//!
//! Integration tests for the bulk import endpoint.

#![cfg(feature = "sqlite")]

mod common;

use axum::body::Bytes;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::{json, Value};

use common::{create_test_server, create_test_server_with_limit, table_counts};

fn folder_with_file() -> Value {
    json!({
        "items": [
            {"id": "1", "type": "FOLDER"},
            {"id": "2", "parentId": "1", "type": "FILE", "size": 10}
        ],
        "updateDate": "2022-01-01T00:00:00.000000Z"
    })
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

#[tokio::test]
async fn test_import_folder_with_file() {
    let (server, db) = create_test_server().await;

    let response = server.post("/imports").json(&folder_with_file()).await;
    response.assert_status(StatusCode::CREATED);
    assert!(response.text().is_empty());

    assert_eq!(table_counts(&db).await, (1, 2, 2));

    let (id, size): (String, i64) = sqlx::query_as("SELECT id, size FROM aggregates")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(id, "1");
    assert_eq!(size, 10);

    let dates: Vec<NaiveDate> = sqlx::query_scalar("SELECT update_date FROM import_history")
        .fetch_all(db.pool())
        .await
        .unwrap();
    let expected = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    assert_eq!(dates, vec![expected, expected]);

    let (parent_id, node_type): (Option<String>, String) =
        sqlx::query_as("SELECT parent_id, node_type FROM nodes WHERE id = '2'")
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(parent_id.as_deref(), Some("1"));
    assert_eq!(node_type, "FILE");
}

#[tokio::test]
async fn test_reimport_conflicts() {
    let (server, db) = create_test_server().await;

    server
        .post("/imports")
        .json(&folder_with_file())
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.post("/imports").json(&folder_with_file()).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(error_code(&response.json::<Value>()), "CONFLICT");

    // First import is untouched.
    assert_eq!(table_counts(&db).await, (1, 2, 2));
}

#[tokio::test]
async fn test_unknown_parent_rolls_back() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/imports")
        .json(&json!({
            "items": [
                {"id": "a", "type": "FOLDER"},
                {"id": "b", "parentId": "does-not-exist", "type": "FILE", "size": 4}
            ],
            "updateDate": "2022-01-01T00:00:00.000000Z"
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_code(&response.json::<Value>()),
        "UNPROCESSABLE_ENTITY"
    );
    assert_eq!(table_counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn test_invalid_field_reports_details() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/imports")
        .json(&json!({
            "items": [
                {"id": "1", "type": "FOLDER"},
                {"id": "2", "parentId": "1", "type": "FILE", "size": -10}
            ],
            "updateDate": "2022-01-01T00:00:00.000000Z"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
    assert!(body["error"]["details"]["items[1].size"].is_array());
    assert!(body["error"]["details"].get("items[0].id").is_none());

    assert_eq!(table_counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn test_empty_id_rejected() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/imports")
        .json(&json!({
            "items": [{"id": "", "type": "FOLDER"}],
            "updateDate": "2022-01-01T00:00:00.000000Z"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(body["error"]["details"]["items[0].id"].is_array());
    assert_eq!(table_counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn test_bad_update_date_rejected() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/imports")
        .json(&json!({
            "items": [{"id": "1", "type": "FOLDER"}],
            "updateDate": "01.01.2022"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "VALIDATION_ERROR");
    assert_eq!(table_counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn test_duplicate_ids_rejected() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/imports")
        .json(&json!({
            "items": [
                {"id": "1", "type": "FOLDER"},
                {"id": "1", "type": "FILE", "size": 1}
            ],
            "updateDate": "2022-01-01T00:00:00.000000Z"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "VALIDATION_ERROR");
    assert_eq!(table_counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn test_unknown_type_is_bad_request() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/imports")
        .json(&json!({
            "items": [{"id": "1", "type": "SYMLINK"}],
            "updateDate": "2022-01-01T00:00:00.000000Z"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "BAD_REQUEST");
}

#[tokio::test]
async fn test_missing_update_date_is_bad_request() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/imports")
        .json(&json!({"items": []}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/imports")
        .content_type("application/json")
        .bytes(Bytes::from_static(b"{\"items\": ["))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "BAD_REQUEST");
    assert_eq!(table_counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn test_empty_import_succeeds() {
    let (server, db) = create_test_server().await;

    server
        .post("/imports")
        .json(&json!({"items": [], "updateDate": "2022-01-01T00:00:00Z"}))
        .await
        .assert_status(StatusCode::CREATED);

    assert_eq!(table_counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn test_large_import_with_small_ceiling() {
    // Two node rows per statement.
    let (server, db) = create_test_server_with_limit(12).await;

    let mut items = vec![json!({"id": "root", "type": "FOLDER"})];
    for i in 0..300 {
        items.push(json!({
            "id": format!("file-{}", i),
            "parentId": "root",
            "url": format!("/files/{}", i),
            "type": "FILE",
            "size": i
        }));
    }

    server
        .post("/imports")
        .json(&json!({"items": items, "updateDate": "2022-05-28T21:12:01.000Z"}))
        .await
        .assert_status(StatusCode::CREATED);

    assert_eq!(table_counts(&db).await, (1, 301, 301));

    let size: i64 = sqlx::query_scalar("SELECT size FROM aggregates WHERE id = 'root'")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(size, (0..300).sum::<i64>());
}

#[tokio::test]
async fn test_conflict_in_last_batch_rolls_back() {
    let (server, db) = create_test_server_with_limit(12).await;

    server
        .post("/imports")
        .json(&json!({
            "items": [{"id": "existing", "type": "FOLDER"}],
            "updateDate": "2022-01-01T00:00:00Z"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let mut items = vec![json!({"id": "root", "type": "FOLDER"})];
    for i in 0..50 {
        items.push(json!({
            "id": format!("file-{}", i),
            "parentId": "root",
            "type": "FILE",
            "size": 1
        }));
    }
    items.push(json!({"id": "existing", "type": "FOLDER"}));

    let response = server
        .post("/imports")
        .json(&json!({"items": items, "updateDate": "2022-01-02T00:00:00Z"}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(table_counts(&db).await, (0, 1, 1));
}

#[tokio::test]
async fn test_health_check() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
