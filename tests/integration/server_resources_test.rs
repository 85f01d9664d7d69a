//! Router-level tests for the server-resource view and validated edits.

use http::StatusCode;
use uuid::Uuid;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_view_reports_usage_and_availability() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;
    let server = app.create_server(user, 1024, 50, 2048, 1, 1, 1).await;
    app.create_server(user, 512, 25, 1024, 1, 1, 1).await;

    let resp = app
        .request("GET", &format!("/api/servers/{server}/resources"), None)
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let data = &resp.body["data"];
    assert_eq!(data["limits"]["memory_limit"], 2048);
    assert_eq!(data["used"]["memory_limit"], 1536);
    assert_eq!(data["used"]["server_limit"], 2);
    assert_eq!(data["used_excluding_self"]["memory_limit"], 512);
    assert_eq!(data["available"]["memory_limit"], 512);
    assert_eq!(data["available_for_editing"]["memory_limit"], 1536);
    assert_eq!(data["server"]["memory"], 1024);
}

#[tokio::test]
async fn test_view_for_unknown_server_is_404() {
    let Some(app) = TestApp::new().await else {
        return;
    };

    let resp = app
        .request(
            "GET",
            &format!("/api/servers/{}/resources", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_may_use_headroom_freed_by_excluding_self() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;
    // Default memory limit is 2048; the server's current 1024 does not
    // count against its own edit.
    let server = app.create_server(user, 1024, 50, 1024, 1, 1, 1).await;

    let ok = app
        .request(
            "PATCH",
            &format!("/api/servers/{server}/resources"),
            Some(serde_json::json!({ "memory": 2048 })),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["data"]["memory"], 2048);

    let too_much = app
        .request(
            "PATCH",
            &format!("/api/servers/{server}/resources"),
            Some(serde_json::json!({ "memory": 2049 })),
        )
        .await;
    assert_eq!(too_much.status, StatusCode::BAD_REQUEST);
    let violations = too_much.body["details"]["violations"]
        .as_array()
        .expect("violations missing");
    assert_eq!(violations[0]["field"], "memory");
    assert!(
        violations[0]["message"]
            .as_str()
            .expect("message missing")
            .contains("exceeds the total limit")
    );
}

#[tokio::test]
async fn test_database_limit_cannot_drop_below_existing_databases() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;
    let server = app.create_server(user, 512, 50, 1024, 3, 1, 1).await;
    app.add_database(server).await;
    app.add_database(server).await;

    let reject = app
        .request(
            "PATCH",
            &format!("/api/servers/{server}/resources"),
            Some(serde_json::json!({ "database_limit": 1 })),
        )
        .await;
    assert_eq!(reject.status, StatusCode::BAD_REQUEST);
    let violations = reject.body["details"]["violations"]
        .as_array()
        .expect("violations missing");
    assert_eq!(
        violations[0]["message"],
        "cannot be less than current databases (2)"
    );

    let accept = app
        .request(
            "PATCH",
            &format!("/api/servers/{server}/resources"),
            Some(serde_json::json!({ "database_limit": 2 })),
        )
        .await;
    assert_eq!(accept.status, StatusCode::OK);
    assert_eq!(accept.body["data"]["database_limit"], 2);
}

#[tokio::test]
async fn test_overflowing_account_cannot_edit_servers() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;

    // Two servers put the user at 1500 MB used against a 1000 MB limit.
    app.request(
        "PATCH",
        &format!("/api/users/{user}/limits"),
        Some(serde_json::json!({ "memory_limit": 1000, "server_limit": 2 })),
    )
    .await;
    let server = app.create_server(user, 750, 25, 512, 1, 1, 1).await;
    app.create_server(user, 750, 25, 512, 1, 1, 1).await;

    // Even an edit that touches no overflowing field is gated.
    let resp = app
        .request(
            "PATCH",
            &format!("/api/servers/{server}/resources"),
            Some(serde_json::json!({ "cpu": 10 })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let violations = resp.body["details"]["violations"]
        .as_array()
        .expect("violations missing");
    assert!(
        violations[0]["message"]
            .as_str()
            .expect("message missing")
            .contains("reduce usage before editing servers")
    );
}

#[tokio::test]
async fn test_partial_failure_commits_nothing() {
    let Some(app) = TestApp::new().await else {
        return;
    };
    let user = app.create_user().await;
    let server = app.create_server(user, 512, 50, 1024, 1, 1, 1).await;

    // cpu is fine on its own, memory is not; the whole edit must abort.
    let resp = app
        .request(
            "PATCH",
            &format!("/api/servers/{server}/resources"),
            Some(serde_json::json!({ "cpu": 80, "memory": 999999 })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let view = app
        .request("GET", &format!("/api/servers/{server}/resources"), None)
        .await;
    assert_eq!(view.body["data"]["server"]["cpu"], 50);
    assert_eq!(view.body["data"]["server"]["memory"], 512);
}
