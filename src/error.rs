//! Error types and handling infrastructure for modelbytes.
//!
//! Every acquisition failure is described by [`AllocationError`]. The `Display`
//! text of each variant is the exact diagnostic handed to an
//! [`ErrorReporter`](crate::reporter::ErrorReporter), so the reporting path and
//! the `Result` path always agree on wording.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for modelbytes operations.
#[derive(Error, Debug)]
pub enum AllocationError {
    /// The path could not be opened for reading
    #[error("Could not open '{}'.", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file status query on an open handle failed
    #[error("Failed to get file size of '{}'.", .path.display())]
    SizeQuery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS rejected the mapping request
    #[error("Mmap of '{}' failed.", .path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fewer bytes were read than the size query promised
    #[error("Read of '{}' failed (too few bytes read).", .path.display())]
    ShortRead {
        path: PathBuf,
        expected: usize,
        read: usize,
    },

    /// The copy buffer could not be reserved
    #[error("Malloc of buffer to hold copy of '{}' failed.", .path.display())]
    BufferAllocation { path: PathBuf, requested: u64 },

    /// Path exists but is not a regular file
    #[error("'{}' is not a regular file.", .path.display())]
    NotAFile { path: PathBuf },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for modelbytes operations.
pub type Result<T> = std::result::Result<T, AllocationError>;

impl AllocationError {
    /// Create an Open error for `path`
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Create a SizeQuery error for `path`
    pub fn size_query(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SizeQuery {
            path: path.into(),
            source,
        }
    }

    /// Create a Map error for `path`
    pub fn map(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Map {
            path: path.into(),
            source,
        }
    }

    /// Create a Config error with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Path the failure refers to, when there is one
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Open { path, .. }
            | Self::SizeQuery { path, .. }
            | Self::Map { path, .. }
            | Self::ShortRead { path, .. }
            | Self::BufferAllocation { path, .. }
            | Self::NotAFile { path } => Some(path.as_path()),
            Self::Config { .. } | Self::Other { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_error_display_messages() {
        let path = PathBuf::from("model.bin");

        let open = AllocationError::open(&path, io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(open.to_string(), "Could not open 'model.bin'.");

        let size = AllocationError::size_query(&path, io::Error::from(io::ErrorKind::Other));
        assert_eq!(size.to_string(), "Failed to get file size of 'model.bin'.");

        let map = AllocationError::map(&path, io::Error::from(io::ErrorKind::Other));
        assert_eq!(map.to_string(), "Mmap of 'model.bin' failed.");

        let short = AllocationError::ShortRead {
            path: path.clone(),
            expected: 10,
            read: 3,
        };
        assert_eq!(
            short.to_string(),
            "Read of 'model.bin' failed (too few bytes read)."
        );

        let malloc = AllocationError::BufferAllocation {
            path,
            requested: u64::MAX,
        };
        assert_eq!(
            malloc.to_string(),
            "Malloc of buffer to hold copy of 'model.bin' failed."
        );
    }

    #[test]
    fn test_io_source_is_preserved() {
        let err = AllocationError::open(
            "missing.bin",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        let source = err.source().expect("open error carries its io source");
        assert_eq!(source.to_string(), "no such file");
    }

    #[test]
    fn test_path_accessor() {
        let err = AllocationError::NotAFile {
            path: PathBuf::from("/tmp"),
        };
        assert_eq!(err.path(), Some(std::path::Path::new("/tmp")));
        assert!(AllocationError::config("bad").path().is_none());
        assert!(AllocationError::other("x").path().is_none());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<usize> {
            Ok(4096)
        }

        assert_eq!(returns_result().unwrap(), 4096);
    }
}
