//! Remote store port (driven/secondary port)
//!
//! Defines the interface the upload orchestrator uses to talk to a remote
//! hierarchical document store. The primary implementation targets a
//! SharePoint document library via the Microsoft Graph API, but the trait
//! carries no provider-specific types so the orchestrator can be exercised
//! with in-memory fakes.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - [`RemoteItem`] and [`LocalFile`] are port-level DTOs, not domain
//!   entities.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::domain::newtypes::FolderPath;

// ============================================================================
// DTOs
// ============================================================================

/// A node in the remote hierarchical tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Opaque remote identifier, unique within a drive.
    pub id: String,
    /// Item name (file or folder name).
    pub name: String,
    /// Whether this item is a folder.
    pub is_folder: bool,
}

/// Immutable snapshot of a local file, taken at enumeration time and used
/// for one upload attempt.
#[derive(Debug, Clone)]
pub struct LocalFile {
    /// Absolute path on the local filesystem.
    pub absolute_path: PathBuf,
    /// Path relative to the local root being mirrored.
    pub relative_path: PathBuf,
    /// File size in bytes, from the enumeration-time stat.
    pub size: u64,
}

impl LocalFile {
    /// The file name component.
    ///
    /// # Errors
    /// Returns an error if the path has no UTF-8 file name (should not
    /// happen for files produced by the walker).
    pub fn file_name(&self) -> Result<&str> {
        self.absolute_path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| {
                format!(
                    "file has no valid UTF-8 name: {}",
                    self.absolute_path.display()
                )
            })
    }

    /// Snapshot a file on disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be stat-ed.
    pub fn snapshot(root: &Path, absolute_path: PathBuf) -> Result<Self> {
        let metadata = std::fs::metadata(&absolute_path)
            .with_context(|| format!("failed to stat {}", absolute_path.display()))?;
        let relative_path = absolute_path
            .strip_prefix(root)
            .with_context(|| {
                format!(
                    "{} is not under local root {}",
                    absolute_path.display(),
                    root.display()
                )
            })?
            .to_path_buf();

        Ok(Self {
            absolute_path,
            relative_path,
            size: metadata.len(),
        })
    }
}

/// Per-file result of [`RemoteStore::upload_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Bytes were transferred to the remote store.
    Uploaded,
    /// Dry-run mode: the file would have been transferred.
    WouldUpload,
}

// ============================================================================
// RemoteStore trait
// ============================================================================

/// Interface to a remote hierarchical document store.
///
/// Implementations must be idempotent for `ensure_folder_path`: ensuring a
/// folder that already exists performs lookups only, never a second create.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Resolve the remote folder at `folder`, creating missing segments
    /// top-down. The empty path resolves to the library root.
    async fn ensure_folder_path(&self, folder: &FolderPath) -> Result<RemoteItem>;

    /// Upload one local file into the (already ensured) destination folder.
    async fn upload_file(&self, file: &LocalFile, dest: &FolderPath) -> Result<TransferOutcome>;
}

// ============================================================================
// Tests
// ============================================================================
