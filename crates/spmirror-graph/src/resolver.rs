//! Remote tree resolver
//!
//! Maps slash-separated logical paths inside a document library to drive
//! items, and creates missing folder segments idempotently: a segment is
//! only created after a lookup-by-path confirmed it absent (404). Any
//! other non-2xx status during lookup or create is fatal and surfaced
//! with path context; this layer adds no retries beyond the transport's.

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use spmirror_core::config::ConflictBehavior;
use spmirror_core::domain::newtypes::FolderPath;
use tracing::debug;

use crate::client::status_error;
use crate::identity::DriveHandle;

/// Fields requested for every item lookup.
const ITEM_SELECT: &str = "id,name,folder,file,parentReference";

// ============================================================================
// DriveItem DTO
// ============================================================================

/// A driveItem as returned by the Graph API.
///
/// Only the fields named in [`ITEM_SELECT`] are mapped; `folder` and
/// `file` are facet objects whose presence marks the item kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    /// Opaque item ID, unique within the drive
    pub id: String,
    /// Item name (file or folder name)
    pub name: String,
    /// Present if the item is a folder
    pub folder: Option<serde_json::Value>,
    /// Present if the item is a file
    pub file: Option<serde_json::Value>,
    /// Reference to the parent folder
    pub parent_reference: Option<ParentReference>,
}

/// Parent folder reference in a driveItem response
#[derive(Debug, Clone, Deserialize)]
pub struct ParentReference {
    /// Path of the parent, e.g. "/drives/{id}/root:/Reports"
    pub path: Option<String>,
}

impl DriveItem {
    /// Whether this item is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

// ============================================================================
// server_relative_path
// ============================================================================

/// Reconstructs an item's path relative to the drive root from its
/// parent-reference path and its own name.
///
/// Pure function, no network calls; the resolver uses it to compute where
/// the next segment lookup should target. The drive root itself (no
/// parent path, or an empty name directly under the root marker) yields
/// the empty string.
#[must_use]
pub fn server_relative_path(item: &DriveItem) -> String {
    let parent_path = item
        .parent_reference
        .as_ref()
        .and_then(|p| p.path.as_deref());

    // The drive root carries a parentReference without a path field.
    let Some(parent_path) = parent_path else {
        return String::new();
    };

    let base = if parent_path.ends_with(':') {
        // Direct child of the root marker, e.g. "/drives/{id}/root:"
        ""
    } else {
        parent_path
            .split_once(":/")
            .map_or("", |(_, relative)| relative)
    };

    let name = item.name.trim_matches('/');
    if base.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        base.trim_matches('/').to_string()
    } else {
        format!("{base}/{name}").trim_matches('/').to_string()
    }
}

// ============================================================================
// Lookup and create
// ============================================================================

/// Fetches the item at `path_in_drive` (relative to the drive root;
/// empty means the root itself).
///
/// Returns `Ok(None)` on a transport-confirmed 404 - the caller's signal
/// to create the missing segment. Any other non-2xx status is fatal.
pub async fn get_item_by_path(handle: &DriveHandle, path_in_drive: &str) -> Result<Option<DriveItem>> {
    let clean = path_in_drive.trim_matches('/');
    let api_path = if clean.is_empty() {
        format!("/drives/{}/root?$select={ITEM_SELECT}", handle.drive_id())
    } else {
        format!(
            "/drives/{}/root:/{clean}?$select={ITEM_SELECT}",
            handle.drive_id()
        )
    };

    let client = handle.client();
    let response = client.execute(client.request(Method::GET, &api_path)).await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !response.status().is_success() {
        return Err(status_error(format!("Failed to get item '{clean}'"), response).await);
    }

    let item: DriveItem = response
        .json()
        .await
        .with_context(|| format!("Failed to parse item response for '{clean}'"))?;
    Ok(Some(item))
}

/// Creates a child folder under the given parent item.
pub async fn create_folder(
    handle: &DriveHandle,
    parent_item_id: &str,
    name: &str,
    conflict: ConflictBehavior,
) -> Result<DriveItem> {
    let api_path = format!(
        "/drives/{}/items/{parent_item_id}/children",
        handle.drive_id()
    );
    let body = serde_json::json!({
        "name": name,
        "folder": {},
        "@microsoft.graph.conflictBehavior": conflict.as_str(),
    });

    let client = handle.client();
    let response = client
        .execute(client.request(Method::POST, &api_path).json(&body))
        .await?;

    if !response.status().is_success() {
        return Err(status_error(format!("Failed to create folder '{name}'"), response).await);
    }

    let item: DriveItem = response
        .json()
        .await
        .with_context(|| format!("Failed to parse create-folder response for '{name}'"))?;

    debug!(folder = name, id = %item.id, "created remote folder");
    Ok(item)
}

// ============================================================================
// ensure_folder_path
// ============================================================================

/// Ensures every segment of `folder` exists in the drive, top-down, and
/// returns the deepest item. The empty path returns the drive root.
///
/// A segment is looked up by path first; only a confirmed 404 triggers a
/// create (under the current item's id, with the configured conflict
/// behavior). Re-running against an already-mirrored tree performs
/// lookups only.
pub async fn ensure_folder_path(
    handle: &DriveHandle,
    folder: &FolderPath,
    conflict: ConflictBehavior,
) -> Result<DriveItem> {
    let root = get_item_by_path(handle, "")
        .await?
        .context("Drive root not found")?;

    if folder.is_root() {
        return Ok(root);
    }

    let mut current = root;
    for segment in folder.segments() {
        let current_path = server_relative_path(&current);
        let candidate = if current_path.is_empty() {
            segment.to_string()
        } else {
            format!("{current_path}/{segment}")
        };

        current = match get_item_by_path(handle, &candidate).await? {
            Some(existing) => existing,
            None => create_folder(handle, &current.id, segment, conflict).await?,
        };
    }

    Ok(current)
}

// ============================================================================
// Tests
// ============================================================================
