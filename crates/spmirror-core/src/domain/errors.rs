//! Domain error types
//!
//! Errors raised by validation of domain values. Remote/adapter failures
//! are reported through `anyhow` at the port boundary instead.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote folder path format or content
    #[error("Invalid folder path: {0}")]
    InvalidFolderPath(String),

    /// A single path component is invalid (empty, contains separators, etc.)
    #[error("Invalid path component: {0}")]
    InvalidPathComponent(String),

    /// Unknown conflict behavior name
    #[error("Invalid conflict behavior '{0}' (expected replace, rename or fail)")]
    InvalidConflictBehavior(String),
}
