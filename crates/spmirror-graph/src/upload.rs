//! File transfer operations
//!
//! Two upload protocols, chosen by size against the policy threshold:
//!
//! - [`upload_small`] - whole-body PUT to `root:/{path}:/content`
//! - [`create_upload_session`] + [`upload_chunked`] - session-based
//!   byte-range PUTs for files larger than the threshold
//!
//! Chunk ranges are strictly sequential and contiguous; the final chunk's
//! end offset equals `file_size - 1`. A chunk is only read into a reused
//! buffer of `chunk_size` bytes, so files larger than memory stream
//! through without being buffered whole.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use reqwest::Method;
use serde::Deserialize;
use spmirror_core::config::ConflictBehavior;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::client::status_error;
use crate::identity::DriveHandle;

/// Chunk PUT statuses that mean "accepted": 202 for intermediate chunks,
/// 200/201 for the final one.
const CHUNK_ACCEPTED: [u16; 3] = [200, 201, 202];

// ============================================================================
// Session response DTO
// ============================================================================

/// Response from creating an upload session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadSessionResponse {
    /// The URL accepting the sequential chunk PUTs
    upload_url: String,
}

// ============================================================================
// Chunk span computation
// ============================================================================

/// Yields the `(start, end)` byte ranges covering `[0, total - 1]` for the
/// given chunk size. Ranges are contiguous, the last may be shorter, and
/// exactly `ceil(total / chunk_size)` spans are produced.
///
/// A zero chunk size is clamped to one byte so the spans stay well-formed;
/// [`upload_chunked`] rejects that configuration before any wire traffic.
pub fn chunk_spans(total: u64, chunk_size: u64) -> impl Iterator<Item = (u64, u64)> {
    let step = chunk_size.max(1);
    (0..total)
        .step_by(step as usize)
        .map(move |start| (start, (start + step).min(total) - 1))
}

// ============================================================================
// Small upload
// ============================================================================

/// Uploads a whole file body in a single PUT.
///
/// `dest_path_with_name` is the full drive-relative path including the
/// file name. The conflict behavior rides as a query parameter.
pub async fn upload_small(
    handle: &DriveHandle,
    dest_path_with_name: &str,
    bytes: Vec<u8>,
    content_type: &str,
    conflict: ConflictBehavior,
) -> Result<()> {
    let api_path = format!(
        "/drives/{}/root:/{dest_path_with_name}:/content?@microsoft.graph.conflictBehavior={}",
        handle.drive_id(),
        conflict.as_str()
    );
    debug!(
        path = dest_path_with_name,
        bytes = bytes.len(),
        "uploading whole file"
    );

    let client = handle.client();
    let response = client
        .execute(
            client
                .request(Method::PUT, &api_path)
                .header(CONTENT_TYPE, content_type)
                .body(bytes),
        )
        .await?;

    if !response.status().is_success() {
        return Err(
            status_error(format!("Upload failed for '{dest_path_with_name}'"), response).await,
        );
    }

    Ok(())
}

// ============================================================================
// Upload session
// ============================================================================

/// Creates an upload session for the given destination path and returns
/// the session URL. The session commits implicitly with the final chunk.
pub async fn create_upload_session(
    handle: &DriveHandle,
    dest_path_with_name: &str,
    conflict: ConflictBehavior,
) -> Result<String> {
    let api_path = format!(
        "/drives/{}/root:/{dest_path_with_name}:/createUploadSession",
        handle.drive_id()
    );
    let body = serde_json::json!({
        "@microsoft.graph.conflictBehavior": conflict.as_str(),
        "deferCommit": false,
    });

    let client = handle.client();
    let response = client
        .execute(client.request(Method::POST, &api_path).json(&body))
        .await?;

    if !response.status().is_success() {
        return Err(status_error(
            format!("Create upload session failed for '{dest_path_with_name}'"),
            response,
        )
        .await);
    }

    let session: UploadSessionResponse = response
        .json()
        .await
        .context("Failed to parse upload session response")?;

    debug!(path = dest_path_with_name, "upload session created");
    Ok(session.upload_url)
}

/// Streams a file through the upload session in sequential chunk PUTs.
///
/// Each PUT carries `Content-Range: bytes {start}-{end}/{total}` and the
/// exact chunk length, and must return 200, 201 or 202; anything else
/// aborts the transfer with the chunk index and range in context. There
/// is no partial-chunk retry beyond the transport's retry of each PUT.
pub async fn upload_chunked(
    handle: &DriveHandle,
    upload_url: &str,
    local_path: &Path,
    file_size: u64,
    chunk_size: u64,
) -> Result<()> {
    ensure!(chunk_size > 0, "chunk size must be at least 1 byte");

    let mut file = tokio::fs::File::open(local_path)
        .await
        .with_context(|| format!("failed to open {}", local_path.display()))?;

    let mut buffer = vec![0u8; chunk_size as usize];
    let client = handle.client();

    for (index, (start, end)) in chunk_spans(file_size, chunk_size).enumerate() {
        let len = (end - start + 1) as usize;
        file.read_exact(&mut buffer[..len])
            .await
            .with_context(|| {
                format!(
                    "failed to read bytes {start}-{end} of {} (file changed during upload?)",
                    local_path.display()
                )
            })?;

        let response = client
            .execute(
                client
                    .request_url(Method::PUT, upload_url)
                    .header(CONTENT_LENGTH, len.to_string())
                    .header(CONTENT_RANGE, format!("bytes {start}-{end}/{file_size}"))
                    .body(buffer[..len].to_vec()),
            )
            .await?;

        if !CHUNK_ACCEPTED.contains(&response.status().as_u16()) {
            return Err(status_error(
                format!("Chunk upload failed (chunk {index}, bytes {start}-{end})"),
                response,
            )
            .await);
        }

        debug!(
            file = %local_path.display(),
            sent = end + 1,
            total = file_size,
            "chunk accepted"
        );
    }

    info!(file = %local_path.display(), bytes = file_size, "chunked upload complete");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
