//! Core read-only region abstraction.
//!
//! This module defines the [`Allocation`] trait shared by every way of
//! acquiring a file's bytes. The trait only answers questions about state
//! established at construction time; none of its methods acquire, release or
//! mutate anything.

use std::fmt::Debug;

/// Which backing store an allocation uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationKind {
    /// Backed by an OS virtual-memory mapping of the file
    Mapped,
    /// Backed by an owned heap copy of the file
    Copied,
    /// Backed by caller-owned memory
    Memory,
}

impl std::fmt::Display for AllocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AllocationKind::Mapped => "mapped",
            AllocationKind::Copied => "copied",
            AllocationKind::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// A contiguous, read-only byte region.
///
/// Implementations are immutable once constructed, whether or not acquisition
/// succeeded, so a shared reference can be handed to any number of readers.
/// The allocation must outlive every slice or pointer obtained from it.
pub trait Allocation: Send + Sync + Debug {
    /// Safe view of the region
    ///
    /// # Returns
    /// * `Some(bytes)` with exactly [`bytes()`](Allocation::bytes) bytes when valid
    /// * `None` when acquisition failed; a partially filled region is never exposed
    fn as_slice(&self) -> Option<&[u8]>;

    /// Size of the region in bytes
    ///
    /// Zero is legal both for an empty file and for an allocation that failed
    /// before the size was known. A failed allocation may still report the
    /// size it determined before the failing step.
    fn bytes(&self) -> usize;

    /// Whether acquisition fully succeeded
    fn valid(&self) -> bool;

    /// Backing store of this allocation
    fn kind(&self) -> AllocationKind;

    /// Start of the region
    ///
    /// Only meaningful when [`valid()`](Allocation::valid) is true. For an
    /// invalid allocation the pointer is null and must not be dereferenced.
    /// Prefer [`as_slice()`](Allocation::as_slice), which encodes that check.
    fn base(&self) -> *const u8 {
        self.as_slice()
            .map_or(std::ptr::null(), |bytes| bytes.as_ptr())
    }
}

impl<A: Allocation + ?Sized> Allocation for Box<A> {
    fn as_slice(&self) -> Option<&[u8]> {
        (**self).as_slice()
    }

    fn bytes(&self) -> usize {
        (**self).bytes()
    }

    fn valid(&self) -> bool {
        (**self).valid()
    }

    fn kind(&self) -> AllocationKind {
        (**self).kind()
    }

    fn base(&self) -> *const u8 {
        (**self).base()
    }
}
