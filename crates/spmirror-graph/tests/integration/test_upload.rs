//! Transfer engine behavior: threshold decision, chunk protocol, failures

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spmirror_core::config::{ConflictBehavior, TransferPolicy};
use spmirror_core::domain::newtypes::FolderPath;
use spmirror_core::ports::remote_store::{LocalFile, RemoteStore, TransferOutcome};
use spmirror_graph::store::GraphRemoteStore;

use crate::common;
use crate::common::DRIVE_ID;

/// Policy with a tiny threshold so tests exercise both paths cheaply.
fn tiny_policy() -> TransferPolicy {
    TransferPolicy {
        conflict_behavior: ConflictBehavior::Replace,
        small_upload_threshold: 8,
        chunk_size: 4,
    }
}

/// Writes `size` bytes into `name` under a fresh temp dir and snapshots it.
fn temp_file(dir: &tempfile::TempDir, name: &str, size: usize) -> LocalFile {
    let path = dir.path().join(name);
    let bytes: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, bytes).unwrap();
    LocalFile::snapshot(dir.path(), path).unwrap()
}

#[tokio::test]
async fn test_file_at_threshold_takes_whole_body_path() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file(&dir, "exact.bin", 8);

    Mock::given(method("PUT"))
        .and(path(format!("/drives/{DRIVE_ID}/root:/dest/exact.bin:/content")))
        .and(query_param("@microsoft.graph.conflictBehavior", "replace"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "file-001", "name": "exact.bin"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The session endpoint must never be touched on the small path.
    Mock::given(method("POST"))
        .and(path(format!(
            "/drives/{DRIVE_ID}/root:/dest/exact.bin:/createUploadSession"
        )))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = GraphRemoteStore::new(common::handle_for(&server, 5), tiny_policy());
    let dest = FolderPath::new("dest").unwrap();
    let outcome = store.upload_file(&file, &dest).await.unwrap();

    assert_eq!(outcome, TransferOutcome::Uploaded);
}

#[tokio::test]
async fn test_file_over_threshold_takes_chunked_path() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    // threshold + 1 bytes, chunk size 4: ranges 0-3, 4-7, 8-8
    let file = temp_file(&dir, "big.bin", 9);

    Mock::given(method("POST"))
        .and(path(format!(
            "/drives/{DRIVE_ID}/root:/dest/big.bin:/createUploadSession"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadUrl": format!("{}/session-1", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    for (range, status) in [
        ("bytes 0-3/9", 202),
        ("bytes 4-7/9", 202),
        ("bytes 8-8/9", 201),
    ] {
        Mock::given(method("PUT"))
            .and(path("/session-1"))
            .and(header("Content-Range", range))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "id": "file-002", "name": "big.bin"
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let store = GraphRemoteStore::new(common::handle_for(&server, 5), tiny_policy());
    let dest = FolderPath::new("dest").unwrap();
    let outcome = store.upload_file(&file, &dest).await.unwrap();

    assert_eq!(outcome, TransferOutcome::Uploaded);
}

#[tokio::test]
async fn test_rejected_chunk_aborts_transfer() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file(&dir, "bad.bin", 9);

    Mock::given(method("POST"))
        .and(path(format!(
            "/drives/{DRIVE_ID}/root:/dest/bad.bin:/createUploadSession"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadUrl": format!("{}/session-2", server.uri())
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/session-2"))
        .and(header("Content-Range", "bytes 0-3/9"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    // 400 is non-transient: no retry, immediate abort with chunk context.
    Mock::given(method("PUT"))
        .and(path("/session-2"))
        .and(header("Content-Range", "bytes 4-7/9"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid range"))
        .expect(1)
        .mount(&server)
        .await;

    let store = GraphRemoteStore::new(common::handle_for(&server, 5), tiny_policy());
    let dest = FolderPath::new("dest").unwrap();
    let err = store.upload_file(&file, &dest).await.unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("Chunk upload failed"));
    assert!(message.contains("bytes 4-7"));
}

#[tokio::test]
async fn test_zero_chunk_size_rejected_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file(&dir, "any.bin", 9);

    let handle = common::handle_for(&server, 5);
    let err = spmirror_graph::upload::upload_chunked(
        &handle,
        &format!("{}/session-x", server.uri()),
        &file.absolute_path,
        file.size,
        0,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("chunk size"));
    // No mock was mounted; reaching the wire would have failed differently,
    // and wiremock would flag the unexpected request on drop.
}

#[tokio::test]
async fn test_upload_to_library_root() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file(&dir, "readme.md", 3);

    Mock::given(method("PUT"))
        .and(path(format!("/drives/{DRIVE_ID}/root:/readme.md:/content")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "file-003", "name": "readme.md"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = GraphRemoteStore::new(common::handle_for(&server, 5), tiny_policy());
    let outcome = store.upload_file(&file, &FolderPath::root()).await.unwrap();

    assert_eq!(outcome, TransferOutcome::Uploaded);
}

#[tokio::test]
async fn test_small_upload_sends_inferred_content_type() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file(&dir, "notes.txt", 5);

    Mock::given(method("PUT"))
        .and(path(format!("/drives/{DRIVE_ID}/root:/notes.txt:/content")))
        .and(header("Content-Type", "text/plain"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "file-004", "name": "notes.txt"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = GraphRemoteStore::new(common::handle_for(&server, 5), tiny_policy());
    store.upload_file(&file, &FolderPath::root()).await.unwrap();
}

#[tokio::test]
async fn test_small_upload_failure_is_fatal_with_context() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let file = temp_file(&dir, "denied.txt", 5);

    Mock::given(method("PUT"))
        .and(path(format!("/drives/{DRIVE_ID}/root:/denied.txt:/content")))
        .respond_with(ResponseTemplate::new(403).set_body_string("access denied"))
        .expect(1)
        .mount(&server)
        .await;

    let store = GraphRemoteStore::new(common::handle_for(&server, 5), tiny_policy());
    let err = store
        .upload_file(&file, &FolderPath::root())
        .await
        .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("denied.txt"));
    assert!(message.contains("403"));
}
