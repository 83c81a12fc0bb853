//! spmirror-graph - Microsoft Graph adapter
//!
//! Provides the async client stack for uploading into a SharePoint
//! document library via the Microsoft Graph API:
//!
//! - [`auth`] - OAuth2 client-credentials token provider
//! - [`client`] - HTTP transport with bounded retry and exponential backoff
//! - [`identity`] - site/drive resolution into an immutable [`identity::DriveHandle`]
//! - [`resolver`] - remote folder tree lookup and idempotent creation
//! - [`upload`] - whole-body and session-based chunked file transfer
//! - [`store`] - the [`spmirror_core::ports::remote_store::RemoteStore`] adapter

pub mod auth;
pub mod client;
pub mod identity;
pub mod resolver;
pub mod store;
pub mod upload;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when communicating with the Microsoft Graph API
#[derive(Debug, Error)]
pub enum GraphError {
    /// Token acquisition failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A remote call returned a fatal (non-transient, non-404) status
    #[error("{context}: status {status}: {body}")]
    Status {
        /// Which operation/path/chunk failed
        context: String,
        /// The final HTTP status
        status: StatusCode,
        /// Response body, for diagnostics
        body: String,
    },

    /// The named document library was not found under the site
    #[error("Drive '{library}' not found. Available: {available:?}")]
    DriveNotFound {
        /// The requested library display name
        library: String,
        /// Drive names the site actually exposes
        available: Vec<String>,
    },

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
