//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for domain values, validated at construction.

use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// FolderPath
// ============================================================================

/// A slash-separated folder path relative to the document library root.
///
/// Stored normalized: no leading or trailing slashes, no empty segments.
/// The empty string denotes the library root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FolderPath(String);

impl FolderPath {
    /// Create a new FolderPath, trimming surrounding slashes.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidFolderPath` if the path contains empty
    /// segments (double slashes) or `..` traversal components.
    pub fn new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = path.as_ref().trim_matches('/');

        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(DomainError::InvalidFolderPath(format!(
                    "path contains empty segment: {trimmed}"
                )));
            }
            if segment == "." || segment == ".." {
                return Err(DomainError::InvalidFolderPath(format!(
                    "path contains traversal segment: {trimmed}"
                )));
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The library root (empty path).
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns true if this path is the library root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the inner string reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the path segments, top-down. Empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Join a single path component.
    ///
    /// # Errors
    /// Returns error if the component is empty or contains separators
    /// or traversal sequences.
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if component.is_empty()
            || component.contains('/')
            || component == "."
            || component == ".."
        {
            return Err(DomainError::InvalidPathComponent(component.to_string()));
        }

        if self.is_root() {
            Ok(Self(component.to_string()))
        } else {
            Ok(Self(format!("{}/{component}", self.0)))
        }
    }

    /// Join a relative filesystem path, component by component.
    ///
    /// Used by the orchestrator to translate a directory's position under
    /// the local root into the corresponding remote folder path.
    ///
    /// # Errors
    /// Returns error on non-UTF-8 components or traversal sequences.
    pub fn join_relative(&self, relative: &Path) -> Result<Self, DomainError> {
        let mut current = self.clone();
        for component in relative.components() {
            let segment = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| {
                    DomainError::InvalidPathComponent(format!(
                        "non-UTF-8 path component in {}",
                        relative.display()
                    ))
                })?;
            current = current.join(segment)?;
        }
        Ok(current)
    }
}

impl Display for FolderPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for FolderPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FolderPath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FolderPath> for String {
    fn from(path: FolderPath) -> Self {
        path.0
    }
}

// ============================================================================
// Tests
// ============================================================================
