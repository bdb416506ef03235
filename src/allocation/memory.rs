//! Allocation over caller-owned memory

use crate::allocation::region::{Allocation, AllocationKind};

/// Read-only view over bytes the caller already holds
///
/// Always valid. The borrow guarantees the memory outlives the allocation.
#[derive(Debug, Clone, Copy)]
pub struct MemoryAllocation<'a> {
    buffer: &'a [u8],
}

impl<'a> MemoryAllocation<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }
}

impl Allocation for MemoryAllocation<'_> {
    fn as_slice(&self) -> Option<&[u8]> {
        Some(self.buffer)
    }

    fn bytes(&self) -> usize {
        self.buffer.len()
    }

    fn valid(&self) -> bool {
        true
    }

    fn kind(&self) -> AllocationKind {
        AllocationKind::Memory
    }
}
