//! A single memory level (page pool).
//!
//! Each level owns a FIFO of free physical page numbers, a page table mapping
//! virtual page numbers to physical page numbers, and the byte length of every
//! allocation that started in it. A physical page is either on the free list or
//! mapped by exactly one page-table entry, never both.

use std::collections::{HashMap, VecDeque};

use crate::common::addr::{PhysAddr, VirtAddr};
use crate::config::LevelConfig;

/// One independently sized memory pool.
#[derive(Debug, Clone)]
pub struct MemoryLevel {
    page_size: u64,
    page_count: u64,
    free_pages: VecDeque<u64>,
    /// Allocation length in bytes, keyed by the virtual page the allocation started in.
    allocations: HashMap<u64, u64>,
    /// Virtual page number to physical page number.
    page_table: HashMap<u64, u64>,
}

impl MemoryLevel {
    /// Creates a level whose free list holds pages `0..page_count` in order.
    pub fn new(config: LevelConfig) -> Self {
        Self {
            page_size: config.page_size,
            page_count: config.page_count,
            free_pages: (0..config.page_count).collect(),
            allocations: HashMap::new(),
            page_table: HashMap::new(),
        }
    }

    /// Page size in bytes.
    #[inline]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Total physical pages configured for this level.
    #[inline]
    pub const fn page_count(&self) -> u64 {
        self.page_count
    }

    /// Pages currently on the free list.
    #[inline]
    pub fn free_page_count(&self) -> u64 {
        self.free_pages.len() as u64
    }

    /// Pages currently mapped by the page table.
    #[inline]
    pub fn mapped_page_count(&self) -> u64 {
        self.page_table.len() as u64
    }

    /// Number of live allocation records.
    #[inline]
    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }

    /// Virtual page number containing `vaddr`.
    #[inline]
    pub const fn vpn(&self, vaddr: VirtAddr) -> u64 {
        vaddr.val() / self.page_size
    }

    /// Number of pages an allocation of `size` bytes spans.
    #[inline]
    pub const fn pages_for(&self, size: u64) -> u64 {
        size.div_ceil(self.page_size)
    }

    /// Physical page mapped at `vpn`, if any.
    #[inline]
    pub fn lookup(&self, vpn: u64) -> Option<u64> {
        self.page_table.get(&vpn).copied()
    }

    /// Returns `true` if `vpn` is mapped in this level.
    #[inline]
    pub fn is_mapped(&self, vpn: u64) -> bool {
        self.page_table.contains_key(&vpn)
    }

    /// Returns `true` if a page mapped here overlaps the bytes `first..=last`.
    pub fn maps_any_in(&self, first: u64, last: u64) -> bool {
        let lo = first / self.page_size;
        let hi = last / self.page_size;
        if hi - lo < self.page_table.len() as u64 {
            (lo..=hi).any(|vpn| self.is_mapped(vpn))
        } else {
            self.page_table.keys().any(|vpn| (lo..=hi).contains(vpn))
        }
    }

    /// Translates `vaddr` if its page is mapped here.
    pub fn translate(&self, vaddr: VirtAddr) -> Option<PhysAddr> {
        self.lookup(self.vpn(vaddr))
            .map(|ppn| PhysAddr::new(ppn * self.page_size + vaddr.page_offset(self.page_size)))
    }

    /// Length recorded for the allocation that started in `vpn`.
    pub fn allocation_at(&self, vpn: u64) -> Option<u64> {
        self.allocations.get(&vpn).copied()
    }

    /// Iterator over the free list, front (next to be handed out) first.
    pub fn free_pages(&self) -> impl Iterator<Item = u64> + '_ {
        self.free_pages.iter().copied()
    }

    /// Iterator over `(vpn, ppn)` mappings in no particular order.
    pub fn mappings(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.page_table.iter().map(|(&v, &p)| (v, p))
    }

    /// Pops the next free physical page and maps it at `vpn`.
    ///
    /// Returns `None` when the free list is empty. The caller guarantees `vpn` is unmapped.
    pub(crate) fn map_next(&mut self, vpn: u64) -> Option<u64> {
        let ppn = self.free_pages.pop_front()?;
        let previous = self.page_table.insert(vpn, ppn);
        debug_assert!(previous.is_none(), "vpn {vpn:#x} mapped twice");
        Some(ppn)
    }

    /// Removes the mapping at `vpn` and returns its physical page to the free list.
    pub(crate) fn unmap(&mut self, vpn: u64) -> Option<u64> {
        let ppn = self.page_table.remove(&vpn)?;
        self.free_pages.push_back(ppn);
        Some(ppn)
    }

    /// Records the length of an allocation starting in `vpn`, replacing any older record.
    pub(crate) fn record_allocation(&mut self, vpn: u64, size: u64) -> Option<u64> {
        self.allocations.insert(vpn, size)
    }

    /// Removes and returns the allocation record for `vpn`.
    pub(crate) fn take_allocation(&mut self, vpn: u64) -> Option<u64> {
        self.allocations.remove(&vpn)
    }
}
