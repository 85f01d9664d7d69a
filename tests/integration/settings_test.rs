//! Router-level tests for the resource settings endpoints.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_max_resources_round_trip_backfills_unset_fields() {
    let Some(app) = TestApp::new().await else {
        return;
    };

    let put = app
        .request(
            "PUT",
            "/api/settings/max-resources",
            Some(serde_json::json!({ "cpu_limit": 500 })),
        )
        .await;
    assert_eq!(put.status, StatusCode::OK);

    let get = app.request("GET", "/api/settings/max-resources", None).await;
    assert_eq!(get.status, StatusCode::OK);
    let data = &get.body["data"];
    assert_eq!(data["cpu_limit"], 500);
    // Unset fields come back as the structural maximums.
    assert_eq!(data["memory_limit"], 65536);
    assert_eq!(data["disk_limit"], 131072);
    assert_eq!(data["server_limit"], 50);
    assert_eq!(data["database_limit"], 100);
    assert_eq!(data["backup_limit"], 200);
    assert_eq!(data["allocation_limit"], 200);
}

#[tokio::test]
async fn test_default_resources_resolve_structurally_when_unset() {
    let Some(app) = TestApp::new().await else {
        return;
    };

    let resp = app
        .request("GET", "/api/settings/default-resources", None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let data = &resp.body["data"];
    assert_eq!(data["memory_limit"], 2048);
    assert_eq!(data["cpu_limit"], 100);
    assert_eq!(data["disk_limit"], 4096);
    assert_eq!(data["server_limit"], 1);
}
