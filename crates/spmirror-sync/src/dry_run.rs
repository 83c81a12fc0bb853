//! Dry-run store
//!
//! A [`RemoteStore`] that performs no remote work at all: folder ensures
//! resolve to synthetic items and uploads report [`TransferOutcome::WouldUpload`].
//! Wiring this into the [`MirrorEngine`](crate::engine::MirrorEngine) gives a
//! preview run that is incapable of network traffic by construction.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use spmirror_core::domain::newtypes::FolderPath;
use spmirror_core::ports::remote_store::{LocalFile, RemoteItem, RemoteStore, TransferOutcome};

/// Store that only reports what a real run would do.
#[derive(Debug, Default)]
pub struct DryRunStore;

#[async_trait]
impl RemoteStore for DryRunStore {
    async fn ensure_folder_path(&self, folder: &FolderPath) -> Result<RemoteItem> {
        info!("would ensure folder {folder}");
        Ok(RemoteItem {
            id: format!("dry-run:{folder}"),
            name: folder.segments().last().unwrap_or("root").to_string(),
            is_folder: true,
        })
    }

    async fn upload_file(&self, file: &LocalFile, dest: &FolderPath) -> Result<TransferOutcome> {
        info!(
            "would upload {} ({} bytes) to {dest}",
            file.relative_path.display(),
            file.size
        );
        Ok(TransferOutcome::WouldUpload)
    }
}
