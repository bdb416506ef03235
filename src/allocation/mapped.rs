//! Memory-mapped file allocation
//!
//! This module provides [`MappedFileAllocation`], which opens a file read-only
//! and maps its full length into the address space. The region is shared with
//! the page cache; nothing is copied.

use crate::allocation::region::{Allocation, AllocationKind};
use crate::error::{AllocationError, Result};
use crate::reporter::ErrorReporter;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::Path;

/// Kernel hint describing how a mapped region will be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum AccessAdvice {
    /// No particular pattern
    #[default]
    Normal,
    /// Front to back, pages may be read ahead aggressively
    Sequential,
    /// Scattered reads, read-ahead is wasted
    Random,
    /// The whole region will be needed soon
    WillNeed,
}

/// Tuning applied to a mapping after it is established
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOptions {
    pub advice: AccessAdvice,
}

/// Read-only allocation backed by a shared memory mapping of a file
///
/// Construction opens the file, queries its size and maps it, stopping at the
/// first failing step. A failed allocation holds no descriptor and no mapping;
/// it only remembers the size if that step was reached.
#[derive(Debug)]
pub struct MappedFileAllocation {
    /// Declared before `file` so the mapping is released first on drop.
    mmap: Option<Mmap>,

    /// Descriptor backing the mapping, kept open for the mapping's lifetime
    file: Option<File>,

    /// Size determined by the status query
    size: usize,
}

impl MappedFileAllocation {
    /// Whether the host platform supports file-backed shared mappings
    pub fn is_supported() -> bool {
        cfg!(any(unix, windows))
    }

    /// Map `path`, reporting any failure to `reporter`
    ///
    /// Never fails; check [`valid()`](Allocation::valid) before reading.
    pub fn new(path: impl AsRef<Path>, reporter: &dyn ErrorReporter) -> Self {
        Self::with_options(path, reporter, MapOptions::default())
    }

    /// Map `path` with explicit options, reporting any failure to `reporter`
    pub fn with_options(
        path: impl AsRef<Path>,
        reporter: &dyn ErrorReporter,
        options: MapOptions,
    ) -> Self {
        let mut allocation = Self::unopened();
        if let Err(e) = allocation.acquire(path.as_ref(), options) {
            reporter.report(format_args!("{}", e));
        }
        allocation
    }

    /// Map `path`, returning the failure instead of reporting it
    pub fn try_new(path: impl AsRef<Path>) -> Result<Self> {
        Self::try_with_options(path, MapOptions::default())
    }

    /// Map `path` with explicit options, returning the failure instead of reporting it
    pub fn try_with_options(path: impl AsRef<Path>, options: MapOptions) -> Result<Self> {
        let mut allocation = Self::unopened();
        allocation.acquire(path.as_ref(), options)?;
        Ok(allocation)
    }

    fn unopened() -> Self {
        Self {
            mmap: None,
            file: None,
            size: 0,
        }
    }

    /// Run the open, stat, map sequence, short-circuiting on the first failure
    ///
    /// On failure every resource acquired so far is dropped before returning,
    /// so the descriptor never outlives a failed mapping.
    fn acquire(&mut self, path: &Path, options: MapOptions) -> Result<()> {
        log::debug!("mapping {}", path.display());

        let file = File::open(path).map_err(|e| AllocationError::open(path, e))?;

        let len = file
            .metadata()
            .map_err(|e| AllocationError::size_query(path, e))?
            .len();
        self.size = usize::try_from(len).map_err(|_| {
            AllocationError::map(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file is larger than the address space",
                ),
            )
        })?;
        log::debug!("{} is {} bytes", path.display(), self.size);

        // SAFETY: the mapping is read-only and only ever exposed as `&[u8]`
        // borrowed from `self`. Concurrent truncation of the file by another
        // process is outside what this type can guard against.
        let mmap = unsafe {
            MmapOptions::new()
                .len(self.size)
                .map(&file)
                .map_err(|e| AllocationError::map(path, e))?
        };

        apply_advice(&mmap, options.advice, path);

        self.mmap = Some(mmap);
        self.file = Some(file);
        Ok(())
    }

    /// Whether the descriptor is still held
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

#[cfg(unix)]
fn apply_advice(mmap: &Mmap, advice: AccessAdvice, path: &Path) {
    let advice = match advice {
        AccessAdvice::Normal => return,
        AccessAdvice::Sequential => memmap2::Advice::Sequential,
        AccessAdvice::Random => memmap2::Advice::Random,
        AccessAdvice::WillNeed => memmap2::Advice::WillNeed,
    };
    if let Err(e) = mmap.advise(advice) {
        // Non-fatal, the mapping is still usable
        log::warn!("failed to set mmap advice on {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn apply_advice(_mmap: &Mmap, advice: AccessAdvice, path: &Path) {
    if advice != AccessAdvice::Normal {
        log::debug!(
            "ignoring {:?} advice for {} on this platform",
            advice,
            path.display()
        );
    }
}

impl Allocation for MappedFileAllocation {
    fn as_slice(&self) -> Option<&[u8]> {
        self.mmap.as_deref()
    }

    fn bytes(&self) -> usize {
        self.size
    }

    fn valid(&self) -> bool {
        self.mmap.is_some()
    }

    fn kind(&self) -> AllocationKind {
        AllocationKind::Mapped
    }
}
