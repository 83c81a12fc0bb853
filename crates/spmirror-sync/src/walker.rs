//! Local directory tree enumeration
//!
//! Produces a deterministic, depth-first preorder listing of a directory
//! tree. Names are sorted within each directory so two runs over the same
//! tree visit entries in the same order.
//!
//! Symlinks are not followed: entries are classified by their own type as
//! reported by `read_dir`, so a symlinked directory can never pull the walk
//! into a cycle or enumerate a sibling subtree twice. Symlinks, sockets and
//! fifos are skipped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// ============================================================================
// WalkEntry
// ============================================================================

/// One visited directory and its immediate children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute path of the directory.
    pub dir: PathBuf,
    /// Names of child directories, sorted.
    pub subdirs: Vec<String>,
    /// Names of child files, sorted.
    pub files: Vec<String>,
}

// ============================================================================
// Walk
// ============================================================================

/// Enumerate `root` depth-first in preorder: each directory appears before
/// any of its descendants, and siblings are visited in sorted name order.
///
/// The root itself is always the first entry, even when empty.
///
/// # Errors
/// Returns the first I/O error hit while reading a directory. Entries with
/// non-UTF-8 names are reported as `InvalidData` rather than skipped, so a
/// run never silently drops a file.
pub fn walk(root: &Path) -> io::Result<Vec<WalkEntry>> {
    let mut entries = Vec::new();
    walk_into(root, &mut entries)?;
    Ok(entries)
}

fn walk_into(dir: &Path, out: &mut Vec<WalkEntry>) -> io::Result<()> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().into_string().map_err(|raw| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("non-UTF-8 entry name in {}: {raw:?}", dir.display()),
            )
        })?;

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            subdirs.push(name);
        } else if file_type.is_file() {
            files.push(name);
        }
    }

    subdirs.sort_unstable();
    files.sort_unstable();

    let children = subdirs.clone();
    out.push(WalkEntry {
        dir: dir.to_path_buf(),
        subdirs,
        files,
    });

    for name in children {
        walk_into(&dir.join(name), out)?;
    }

    Ok(())
}

/// Total number of files across all entries.
#[must_use]
pub fn count_files(entries: &[WalkEntry]) -> u64 {
    entries.iter().map(|e| e.files.len() as u64).sum()
}

// ============================================================================
// Tests
// ============================================================================
