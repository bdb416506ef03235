//! Factory for creating Allocation instances.
//!
//! This module provides the AllocationFactory, the selection point that picks
//! a mapped or copied allocation for a file based on platform support, file
//! size and configuration.

use crate::allocation::copied::CopiedFileAllocation;
use crate::allocation::mapped::{MapOptions, MappedFileAllocation};
use crate::allocation::probe::{probe_file, FileProbe};
use crate::allocation::region::Allocation;
use crate::config::{AllocationConfig, Strategy};
use crate::error::{AllocationError, Result};
use crate::reporter::ErrorReporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Factory for creating [`Allocation`] instances
///
/// # Strategy Selection
/// - [`Strategy::Auto`]: mapped when the platform supports it and the file is
///   non-empty and at least `mmap_threshold` bytes; copied otherwise. A failed
///   mapping falls back to a copy.
/// - [`Strategy::Mapped`] / [`Strategy::Copied`]: forced, no fallback.
///
/// Every failure is reported to the supplied reporter. `Err` is returned only
/// when no valid allocation could be produced.
pub struct AllocationFactory;

impl AllocationFactory {
    /// Create an allocation over `path` using `config`
    ///
    /// # Process
    /// 1. Probe the path (existence, regular file, size)
    /// 2. Select a backing store
    /// 3. Acquire it, falling back to a copy under [`Strategy::Auto`]
    pub fn create(
        path: &Path,
        reporter: &dyn ErrorReporter,
        config: &AllocationConfig,
    ) -> Result<Box<dyn Allocation>> {
        let probe = probe_file(path).map_err(|e| {
            reporter.report(format_args!("{}", e));
            e
        })?;

        if Self::select(&probe, config) == Strategy::Copied {
            return Self::copy(path, reporter);
        }

        let options = MapOptions {
            advice: config.advice,
        };
        match MappedFileAllocation::try_with_options(path, options) {
            Ok(mapped) => Ok(Box::new(mapped)),
            Err(e) => {
                reporter.report(format_args!("{}", e));
                if config.strategy != Strategy::Auto {
                    return Err(e);
                }
                log::warn!(
                    "mapping {} failed, falling back to a copy: {}",
                    path.display(),
                    e
                );
                Self::copy(path, reporter)
            }
        }
    }

    /// Create an allocation on the blocking thread pool
    ///
    /// Acquisition performs blocking file I/O, so async callers should use
    /// this rather than [`create`](Self::create).
    pub async fn create_async(
        path: PathBuf,
        reporter: Arc<dyn ErrorReporter>,
        config: AllocationConfig,
    ) -> Result<Box<dyn Allocation>> {
        tokio::task::spawn_blocking(move || Self::create(&path, reporter.as_ref(), &config))
            .await
            .map_err(|e| AllocationError::other(format!("allocation task failed: {}", e)))?
    }

    /// Pick the backing store for a probed file
    ///
    /// Returns [`Strategy::Mapped`] or [`Strategy::Copied`], never `Auto`.
    pub fn select(probe: &FileProbe, config: &AllocationConfig) -> Strategy {
        match config.strategy {
            Strategy::Mapped => Strategy::Mapped,
            Strategy::Copied => Strategy::Copied,
            Strategy::Auto => {
                if MappedFileAllocation::is_supported()
                    && !probe.is_empty()
                    && probe.size >= config.mmap_threshold
                {
                    Strategy::Mapped
                } else {
                    Strategy::Copied
                }
            }
        }
    }

    fn copy(path: &Path, reporter: &dyn ErrorReporter) -> Result<Box<dyn Allocation>> {
        CopiedFileAllocation::try_new(path)
            .map(|copied| Box::new(copied) as Box<dyn Allocation>)
            .map_err(|e| {
                reporter.report(format_args!("{}", e));
                e
            })
    }
}
