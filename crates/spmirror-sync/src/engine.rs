//! Mirror engine
//!
//! The [`MirrorEngine`] drives one upload run: enumerate the local tree,
//! ensure each remote folder exists before touching its files, and upload
//! every file through the [`RemoteStore`] port.
//!
//! ## Ordering
//!
//! Directories are processed in depth-first preorder, so a folder is always
//! ensured before any of its subfolders or files. Within a directory, files
//! upload in sorted name order.
//!
//! ## Failure Model
//!
//! The run is fail-fast: the first folder or file operation that errors
//! aborts the run, and the error carries the path that failed. Work already
//! done on the remote side is left in place.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use spmirror_core::domain::newtypes::FolderPath;
use spmirror_core::ports::remote_store::{LocalFile, RemoteStore, TransferOutcome};

use crate::walker::{self, WalkEntry};

// ============================================================================
// MirrorSummary
// ============================================================================

/// Counters for a completed mirror run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Files found under the local root.
    pub files_total: u64,
    /// Files whose bytes were transferred.
    pub files_uploaded: u64,
    /// Files that would have been transferred (dry-run).
    pub files_planned: u64,
}

// ============================================================================
// MirrorEngine
// ============================================================================

/// Mirrors a local directory tree into a destination folder on a remote
/// store.
pub struct MirrorEngine {
    store: Arc<dyn RemoteStore>,
}

impl MirrorEngine {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Run one mirror pass from `local_root` into `dest`.
    ///
    /// # Errors
    /// Fails if `local_root` is not a directory, if enumeration hits an I/O
    /// error, or on the first remote operation that fails.
    pub async fn run(&self, local_root: &Path, dest: &FolderPath) -> Result<MirrorSummary> {
        if !local_root.is_dir() {
            bail!("{} is not a directory", local_root.display());
        }

        let entries = {
            let root = local_root.to_path_buf();
            tokio::task::spawn_blocking(move || walker::walk(&root))
                .await
                .context("tree enumeration task panicked")?
                .with_context(|| format!("failed to enumerate {}", local_root.display()))?
        };

        let mut summary = MirrorSummary {
            files_total: walker::count_files(&entries),
            ..Default::default()
        };
        if summary.files_total == 0 {
            info!(root = %local_root.display(), "no files to upload");
            return Ok(summary);
        }

        info!(
            root = %local_root.display(),
            dest = %dest,
            files = summary.files_total,
            "starting upload"
        );

        for entry in &entries {
            self.mirror_dir(local_root, dest, entry, &mut summary).await?;
        }

        info!(
            uploaded = summary.files_uploaded,
            planned = summary.files_planned,
            "upload finished"
        );
        Ok(summary)
    }

    /// Ensure one directory's remote counterpart, then upload its files.
    async fn mirror_dir(
        &self,
        local_root: &Path,
        dest: &FolderPath,
        entry: &WalkEntry,
        summary: &mut MirrorSummary,
    ) -> Result<()> {
        let relative = entry
            .dir
            .strip_prefix(local_root)
            .with_context(|| format!("{} escaped the local root", entry.dir.display()))?;
        let folder = dest
            .join_relative(relative)
            .with_context(|| format!("cannot map {} to a remote path", relative.display()))?;

        self.store
            .ensure_folder_path(&folder)
            .await
            .with_context(|| format!("failed to prepare remote folder '{folder}'"))?;
        debug!(folder = %folder, files = entry.files.len(), "folder ready");

        for name in &entry.files {
            let file = LocalFile::snapshot(local_root, entry.dir.join(name))?;
            let outcome = self
                .store
                .upload_file(&file, &folder)
                .await
                .with_context(|| {
                    format!("failed to upload {}", file.relative_path.display())
                })?;

            match outcome {
                TransferOutcome::Uploaded => summary.files_uploaded += 1,
                TransferOutcome::WouldUpload => summary.files_planned += 1,
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
