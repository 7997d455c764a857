//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses to prevent
//! accidental mixing of address spaces. It provides the following:
//! 1. **Type Safety:** Distinguishes between virtual and physical address spaces at compile time.
//! 2. **Page Arithmetic:** Page base and page offset for an arbitrary page size.
//! 3. **Line Arithmetic:** Cache-line offset used when splitting accesses.

use std::fmt;

/// A virtual address as seen by the traced application.
///
/// Virtual addresses must be translated through the
/// [`AddressSpace`](crate::mmu::AddressSpace) before a request reaches memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address inside one memory level's page pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Returns the byte offset of this address within a page of `page_size` bytes.
    ///
    /// # Arguments
    ///
    /// * `page_size` - Page size in bytes; must be non-zero.
    #[inline]
    pub const fn page_offset(self, page_size: u64) -> u64 {
        self.0 % page_size
    }

    /// Returns the address of the first byte of the enclosing page.
    ///
    /// # Arguments
    ///
    /// * `page_size` - Page size in bytes; must be non-zero.
    #[inline]
    pub const fn page_base(self, page_size: u64) -> Self {
        Self(self.0 - self.0 % page_size)
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
