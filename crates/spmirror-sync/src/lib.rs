//! Upload orchestration
//!
//! Walks a local directory tree and mirrors it into a remote store
//! through the [`RemoteStore`](spmirror_core::ports::remote_store::RemoteStore)
//! port. Folder creation and uploads happen in deterministic depth-first
//! order; the first failed operation aborts the run.

pub mod dry_run;
pub mod engine;
pub mod walker;

pub use dry_run::DryRunStore;
pub use engine::{MirrorEngine, MirrorSummary};
