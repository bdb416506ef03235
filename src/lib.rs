//! # modelbytes - Read-Only Byte Regions for Model Files
//!
//! Hands a model file's bytes to an interpreter or parser as one contiguous,
//! read-only slice, backed either by a memory mapping or by a heap copy.
//!
//! ## Features
//!
//! - **Mapped access**: zero-copy regions shared with the page cache
//! - **Copied access**: portable fallback that owns an exact copy of the file
//! - **One contract**: both behind the [`Allocation`] trait, with validity
//!   checked before any byte is exposed
//! - **Pluggable diagnostics**: failures are described to an [`ErrorReporter`]
//!
//! ## Architecture
//!
//! - [`allocation`] - The capability trait, its variants and the factory
//! - [`reporter`] - Error sinks receiving formatted diagnostics
//! - [`error`] - Centralized error types
//! - [`config`] - Strategy selection settings
//! - [`checks`] - Debug-only and always-on invariant checks

// Core modules
pub mod checks;
pub mod error;
pub mod reporter;

pub mod allocation;
pub mod config;

// Re-export commonly used types for convenience
pub use error::{AllocationError, Result};

// Public API surface for external usage
pub use allocation::{
    Allocation, AllocationFactory, AllocationKind, CopiedFileAllocation, MappedFileAllocation,
    MemoryAllocation,
};
pub use config::{AllocationConfig, Strategy};
pub use reporter::{BufferedReporter, ErrorReporter, LogReporter, StderrReporter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
