//! File preflight used for strategy selection.
//!
//! The factory needs a file's size before it can pick a backing store, and it
//! should turn away directories and devices before either variant tries to
//! read them.

use crate::error::{AllocationError, Result};
use std::path::Path;

/// What a preflight learned about a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileProbe {
    /// Size in bytes at probe time
    pub size: u64,
}

impl FileProbe {
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Check that `path` is a readable regular file and report its size
///
/// # Error Cases
/// - Path does not exist or cannot be opened: [`AllocationError::Open`]
/// - Metadata query failed: [`AllocationError::SizeQuery`]
/// - Path is a directory, socket, or other non-regular file: [`AllocationError::NotAFile`]
///
/// An empty file is accepted; an empty region is a valid allocation.
pub fn probe_file(path: &Path) -> Result<FileProbe> {
    // Opening verifies read permission as well as existence.
    let file = std::fs::File::open(path).map_err(|e| AllocationError::open(path, e))?;

    let metadata = file
        .metadata()
        .map_err(|e| AllocationError::size_query(path, e))?;

    if !metadata.is_file() {
        return Err(AllocationError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    Ok(FileProbe {
        size: metadata.len(),
    })
}
