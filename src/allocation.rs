//! Read-only byte regions over files.
//!
//! An [`Allocation`] exposes a file's bytes either through a memory mapping
//! ([`MappedFileAllocation`]) or through an owned copy
//! ([`CopiedFileAllocation`]). Both share one contract: construction either
//! fully succeeds or leaves an inert, invalid object, and every resource taken
//! along the way is released when the object is dropped.
//!
//! [`AllocationFactory`] chooses between the two for callers that do not care.

pub mod copied;
pub mod factory;
pub mod mapped;
pub mod memory;
pub mod probe;
pub mod region;

pub use copied::CopiedFileAllocation;
pub use factory::AllocationFactory;
pub use mapped::{AccessAdvice, MapOptions, MappedFileAllocation};
pub use memory::MemoryAllocation;
pub use probe::{probe_file, FileProbe};
pub use region::{Allocation, AllocationKind};
