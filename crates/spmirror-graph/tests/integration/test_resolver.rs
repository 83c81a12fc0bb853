//! Resolver behavior: idempotent folder creation and identity resolution

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spmirror_core::config::ConflictBehavior;
use spmirror_core::domain::newtypes::FolderPath;
use spmirror_graph::identity::DriveHandle;
use spmirror_graph::resolver;

use crate::common;
use crate::common::DRIVE_ID;

#[tokio::test]
async fn test_ensure_root_returns_root_item() {
    let server = MockServer::start().await;
    common::mount_root_item(&server).await;

    let handle = common::handle_for(&server, 5);
    let item = resolver::ensure_folder_path(&handle, &FolderPath::root(), ConflictBehavior::Replace)
        .await
        .unwrap();

    assert_eq!(item.id, "root-001");
    assert!(item.is_folder());
}

#[tokio::test]
async fn test_ensure_creates_missing_segments_top_down() {
    let server = MockServer::start().await;
    common::mount_root_item(&server).await;

    // Both segments are absent.
    common::mount_missing(&server, "Reports").await;
    common::mount_missing(&server, "Reports/2026").await;

    // Create under the root, then under the created folder.
    Mock::given(method("POST"))
        .and(path(format!("/drives/{DRIVE_ID}/items/root-001/children")))
        .and(body_partial_json(json!({
            "name": "Reports",
            "folder": {},
            "@microsoft.graph.conflictBehavior": "replace"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::folder_item(
            "folder-reports",
            "Reports",
            &format!("/drives/{DRIVE_ID}/root:"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/drives/{DRIVE_ID}/items/folder-reports/children"
        )))
        .and(body_partial_json(json!({"name": "2026"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::folder_item(
            "folder-2026",
            "2026",
            &format!("/drives/{DRIVE_ID}/root:/Reports"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let handle = common::handle_for(&server, 5);
    let folder = FolderPath::new("Reports/2026").unwrap();
    let item = resolver::ensure_folder_path(&handle, &folder, ConflictBehavior::Replace)
        .await
        .unwrap();

    assert_eq!(item.id, "folder-2026");
}

#[tokio::test]
async fn test_ensure_is_idempotent_on_existing_tree() {
    let server = MockServer::start().await;
    common::mount_root_item(&server).await;

    common::mount_item(
        &server,
        "Reports",
        common::folder_item("folder-reports", "Reports", &format!("/drives/{DRIVE_ID}/root:")),
    )
    .await;
    common::mount_item(
        &server,
        "Reports/2026",
        common::folder_item(
            "folder-2026",
            "2026",
            &format!("/drives/{DRIVE_ID}/root:/Reports"),
        ),
    )
    .await;

    // A mirrored tree must trigger zero creates.
    Mock::given(method("POST"))
        .and(path_regex(r"/children$"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let handle = common::handle_for(&server, 5);
    let folder = FolderPath::new("Reports/2026").unwrap();
    let item = resolver::ensure_folder_path(&handle, &folder, ConflictBehavior::Fail)
        .await
        .unwrap();

    assert_eq!(item.id, "folder-2026");
}

#[tokio::test]
async fn test_lookup_surfaces_exhausted_transient_as_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE_ID}/root:/Reports")))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let handle = common::handle_for(&server, 2);
    let err = resolver::get_item_by_path(&handle, "Reports")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Failed to get item 'Reports'"));
}

#[tokio::test]
async fn test_lookup_404_is_none_not_error() {
    let server = MockServer::start().await;
    common::mount_missing(&server, "Ghost").await;

    let handle = common::handle_for(&server, 5);
    let item = resolver::get_item_by_path(&handle, "Ghost").await.unwrap();
    assert!(item.is_none());
}

#[tokio::test]
async fn test_connect_resolves_site_and_drive() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sites/contoso.sharepoint.com:/sites/Engineering"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "contoso.sharepoint.com,11111111,22222222"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sites/contoso.sharepoint.com,11111111,22222222/drives"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"id": "drive-archive", "name": "Archive"},
                {"id": "drive-docs", "name": "Documents", "displayName": "Documents"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server, 5);
    let handle = DriveHandle::connect(
        client,
        "https://contoso.sharepoint.com/sites/Engineering",
        "Documents",
    )
    .await
    .unwrap();

    assert_eq!(handle.drive_id(), "drive-docs");
    assert_eq!(handle.site_id(), "contoso.sharepoint.com,11111111,22222222");
}

#[tokio::test]
async fn test_connect_unknown_library_lists_available() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sites/contoso.sharepoint.com:/sites/Engineering"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "site-1"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sites/site-1/drives"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "d1", "name": "Archive"}]
        })))
        .mount(&server)
        .await;

    let client = common::client_for(&server, 5);
    let err = DriveHandle::connect(
        client,
        "https://contoso.sharepoint.com/sites/Engineering",
        "Documents",
    )
    .await
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Documents"));
    assert!(message.contains("Archive"));
}
