//! RemoteStore adapter over a connected drive
//!
//! Bridges the core's `RemoteStore` port to the Graph resolver and
//! transfer engine, applying the per-run [`TransferPolicy`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use spmirror_core::config::TransferPolicy;
use spmirror_core::domain::newtypes::FolderPath;
use spmirror_core::ports::remote_store::{LocalFile, RemoteItem, RemoteStore, TransferOutcome};
use tracing::debug;

use crate::identity::DriveHandle;
use crate::{resolver, upload};

/// Uploads into one document library through a [`DriveHandle`].
pub struct GraphRemoteStore {
    handle: DriveHandle,
    policy: TransferPolicy,
}

impl GraphRemoteStore {
    /// Creates the adapter from a connected handle and the run's policy.
    pub fn new(handle: DriveHandle, policy: TransferPolicy) -> Self {
        Self { handle, policy }
    }

    /// Drive-relative destination path including the file name.
    fn dest_path_with_name(dest: &FolderPath, name: &str) -> String {
        if dest.is_root() {
            name.to_string()
        } else {
            format!("{}/{name}", dest.as_str())
        }
    }
}

#[async_trait]
impl RemoteStore for GraphRemoteStore {
    async fn ensure_folder_path(&self, folder: &FolderPath) -> Result<RemoteItem> {
        let item =
            resolver::ensure_folder_path(&self.handle, folder, self.policy.conflict_behavior)
                .await
                .with_context(|| format!("failed to ensure remote folder '{folder}'"))?;

        Ok(RemoteItem {
            is_folder: item.is_folder(),
            id: item.id,
            name: item.name,
        })
    }

    async fn upload_file(&self, file: &LocalFile, dest: &FolderPath) -> Result<TransferOutcome> {
        let name = file.file_name()?;
        let dest_path = Self::dest_path_with_name(dest, name);
        let content_type = mime_guess::from_path(&file.absolute_path).first_or_octet_stream();

        // Boundary is inclusive: a file of exactly threshold size takes
        // the whole-body path.
        if file.size <= self.policy.small_upload_threshold {
            debug!(path = %dest_path, size = file.size, "whole-body upload");
            let bytes = tokio::fs::read(&file.absolute_path)
                .await
                .with_context(|| format!("failed to read {}", file.absolute_path.display()))?;
            upload::upload_small(
                &self.handle,
                &dest_path,
                bytes,
                content_type.as_ref(),
                self.policy.conflict_behavior,
            )
            .await?;
        } else {
            debug!(path = %dest_path, size = file.size, "chunked upload");
            let upload_url = upload::create_upload_session(
                &self.handle,
                &dest_path,
                self.policy.conflict_behavior,
            )
            .await?;
            upload::upload_chunked(
                &self.handle,
                &upload_url,
                &file.absolute_path,
                file.size,
                self.policy.chunk_size,
            )
            .await?;
        }

        Ok(TransferOutcome::Uploaded)
    }
}
