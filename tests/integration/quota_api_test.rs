//! Router-level tests for the per-user quota endpoints.

use http::StatusCode;
use uuid::Uuid;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_get_limits_creates_default_record() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;

    let resp = app
        .request("GET", &format!("/api/users/{user}/limits"), None)
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let data = &resp.body["data"];
    assert_eq!(data["memory_limit"], 2048);
    assert_eq!(data["cpu_limit"], 100);
    assert_eq!(data["disk_limit"], 4096);
    assert_eq!(data["server_limit"], 1);
    assert_eq!(data["database_limit"], 3);
    assert_eq!(data["backup_limit"], 5);
    assert_eq!(data["allocation_limit"], 5);
    assert_eq!(app.quota_row_count(user).await, 1);
}

#[tokio::test]
async fn test_get_limits_for_unknown_user_is_404() {
    let Some(app) = TestApp::new().await else {
        return;
    };

    let resp = app
        .request("GET", &format!("/api/users/{}/limits", Uuid::new_v4()), None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_patch_limits_updates_fields() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;

    let resp = app
        .request(
            "PATCH",
            &format!("/api/users/{user}/limits"),
            Some(serde_json::json!({ "memory_limit": 4096, "server_limit": 3 })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["memory_limit"], 4096);
    assert_eq!(resp.body["data"]["server_limit"], 3);
    // Untouched fields keep their defaults.
    assert_eq!(resp.body["data"]["cpu_limit"], 100);
}

#[tokio::test]
async fn test_patch_limits_reports_every_negative_field() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;

    let resp = app
        .request(
            "PATCH",
            &format!("/api/users/{user}/limits"),
            Some(serde_json::json!({ "memory_limit": -1, "backup_limit": -2, "cpu_limit": 50 })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "VALIDATION_ERROR");
    let violations = resp.body["details"]["violations"]
        .as_array()
        .expect("violations missing");
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0]["field"], "memory_limit");
    assert_eq!(violations[1]["field"], "backup_limit");
}

#[tokio::test]
async fn test_patch_limits_rejects_empty_payload() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;

    let resp = app
        .request(
            "PATCH",
            &format!("/api/users/{user}/limits"),
            Some(serde_json::json!({})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_adjust_endpoint_applies_delta() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;

    let resp = app
        .request(
            "POST",
            &format!("/api/users/{user}/limits/adjust"),
            Some(serde_json::json!({ "resource": "database_limit", "delta": 4 })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["database_limit"], 7);
}

#[tokio::test]
async fn test_adjust_endpoint_rejects_unknown_resource() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;

    let resp = app
        .request(
            "POST",
            &format!("/api/users/{user}/limits/adjust"),
            Some(serde_json::json!({ "resource": "gpu_limit", "delta": 1 })),
        )
        .await;
    assert!(resp.status.is_client_error());
}

#[tokio::test]
async fn test_delete_limits_removes_record() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;
    app.request("GET", &format!("/api/users/{user}/limits"), None)
        .await;

    let resp = app
        .request("DELETE", &format!("/api/users/{user}/limits"), None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["removed"], true);
    assert_eq!(app.quota_row_count(user).await, 0);
}
