//! Test helpers for import API tests.
//!
//! Provides a TestServer backed by an in-memory database and helpers for
//! inspecting stored rows.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use disk::db::{AGGREGATES_TABLE, HISTORY_TABLE, NODES_TABLE};
use disk::web::handlers::AppState;
use disk::web::router::{create_health_router, create_router};
use disk::{Database, ImportLimits};

/// Default request body limit for tests.
pub const TEST_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Create a test server with an in-memory database.
pub async fn create_test_server() -> (TestServer, Arc<Database>) {
    create_test_server_with_limit(disk::config::DEFAULT_MAX_QUERY_ARGS).await
}

/// Create a test server whose statements bind at most `max_query_args`
/// parameters.
pub async fn create_test_server_with_limit(max_query_args: usize) -> (TestServer, Arc<Database>) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let shared_db = Arc::new(db);

    let limits = ImportLimits::new(max_query_args).expect("Invalid import limits");
    let app_state = Arc::new(AppState::new(shared_db.clone(), limits));

    let router = create_router(app_state, TEST_BODY_LIMIT).merge(create_health_router());

    let server = TestServer::new(router).expect("Failed to create test server");
    (server, shared_db)
}

/// Row counts of (aggregates, nodes, import_history).
pub async fn table_counts(db: &Database) -> (i64, i64, i64) {
    (
        db.count_rows(&AGGREGATES_TABLE).await.unwrap(),
        db.count_rows(&NODES_TABLE).await.unwrap(),
        db.count_rows(&HISTORY_TABLE).await.unwrap(),
    )
}
