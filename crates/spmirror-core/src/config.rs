//! Transfer and retry policy configuration.
//!
//! Both policies are immutable for the lifetime of a run and are threaded
//! through every operation; there is no process-wide mutable state.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Default boundary between whole-body and chunked upload: 4 MiB (inclusive).
pub const DEFAULT_SMALL_UPLOAD_THRESHOLD: u64 = 4 * 1024 * 1024;

/// Default chunk size for session-based uploads: 8 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Default maximum number of attempts for a single logical request.
pub const DEFAULT_RETRY_MAX: u32 = 5;

/// Default exponential backoff base, in seconds.
pub const DEFAULT_RETRY_BACKOFF_BASE: f64 = 2.0;

// ============================================================================
// ConflictBehavior
// ============================================================================

/// Policy applied when a remote item of the same name already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictBehavior {
    /// Overwrite the existing remote item.
    Replace,
    /// Keep both; the remote side picks a new name for the upload.
    Rename,
    /// Abort the operation with a conflict error.
    Fail,
}

impl ConflictBehavior {
    /// The wire value expected by the remote API.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Rename => "rename",
            Self::Fail => "fail",
        }
    }
}

impl Default for ConflictBehavior {
    fn default() -> Self {
        Self::Replace
    }
}

impl Display for ConflictBehavior {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConflictBehavior {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "rename" => Ok(Self::Rename),
            "fail" => Ok(Self::Fail),
            other => Err(DomainError::InvalidConflictBehavior(other.to_string())),
        }
    }
}

// ============================================================================
// TransferPolicy
// ============================================================================

/// Per-run upload policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPolicy {
    /// What to do when the target item already exists remotely.
    pub conflict_behavior: ConflictBehavior,
    /// Files up to this many bytes (inclusive) upload in a single request.
    pub small_upload_threshold: u64,
    /// Chunk size in bytes for session-based uploads.
    pub chunk_size: u64,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            conflict_behavior: ConflictBehavior::default(),
            small_upload_threshold: DEFAULT_SMALL_UPLOAD_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

// ============================================================================
// RetryPolicy
// ============================================================================

/// Bounded retry with exponential backoff for transient remote failures.
///
/// `max_attempts` counts total request sends, not re-sends. The backoff
/// between attempt `n` and `n + 1` is `backoff_base ^ n` seconds. There is
/// deliberately no jitter and no cap on backoff growth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of request attempts before the last response is
    /// returned as-is.
    pub max_attempts: u32,
    /// Exponential backoff base, in seconds.
    pub backoff_base: f64,
}

impl RetryPolicy {
    /// Backoff to sleep after the given attempt number (1-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(self.backoff_base.powi(attempt as i32))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX,
            backoff_base: DEFAULT_RETRY_BACKOFF_BASE,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
