//! Multi-level simulated address space.
//!
//! The address space owns one [`MemoryLevel`] per configured pool and provides:
//! 1. **Allocation:** Maps the pages of a region onto physical pages popped from a level's free list.
//! 2. **Release:** Returns every page of a recorded allocation to its level's free list.
//! 3. **Translation:** Virtual to physical address lookup across all levels.
//! 4. **Pool Selection:** The default level used for allocations that name no valid level.
//!
//! There is no demand paging and no overcommit. Translating an unmapped page, freeing an
//! unknown address, and exhausting a free list are all fatal.

/// A single memory level (page pool).
pub mod level;

use std::cell::Cell;

use tracing::{debug, warn};

use crate::common::addr::{PhysAddr, VirtAddr};
use crate::common::error::{SimError, SimResult};
use crate::config::{LevelConfig, MemoryConfig};

pub use level::MemoryLevel;

/// Summary of a completed allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Level that received the allocation.
    pub level: u32,
    /// Pages the allocation spans.
    pub pages: u64,
    /// Pages that were unmapped before and consumed a free physical page.
    pub newly_mapped: u64,
}

/// Summary of a completed release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Release {
    /// Level the allocation lived in.
    pub level: u32,
    /// Recorded allocation length in bytes.
    pub size: u64,
    /// Physical pages returned to the free list.
    pub pages_returned: u64,
}

/// Virtual address bookkeeping across independently sized memory pools.
#[derive(Debug, Clone)]
pub struct AddressSpace {
    levels: Vec<MemoryLevel>,
    default_level: u32,
    /// Level that served the most recent translation; searched first.
    last_hit: Cell<Option<usize>>,
}

impl AddressSpace {
    /// Builds the address space described by the memory configuration.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] if the level table or default level is invalid.
    pub fn new(config: &MemoryConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::from_levels(&config.levels, config.default_level))
    }

    /// Builds an address space from a level table that already passed
    /// [`MemoryConfig::validate`].
    pub fn from_levels(levels: &[LevelConfig], default_level: u32) -> Self {
        Self {
            levels: levels.iter().copied().map(MemoryLevel::new).collect(),
            default_level,
            last_hit: Cell::new(None),
        }
    }

    /// Number of configured memory levels.
    pub fn count_memory_levels(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Level that currently receives allocations naming no valid level.
    pub const fn default_level(&self) -> u32 {
        self.default_level
    }

    /// Read access to one level.
    pub fn level(&self, index: u32) -> Option<&MemoryLevel> {
        self.levels.get(index as usize)
    }

    /// Changes the default allocation level. Existing mappings are untouched.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidLevel`] if `level` is not configured.
    pub fn set_default_pool(&mut self, level: u32) -> SimResult<()> {
        if level >= self.count_memory_levels() {
            return Err(SimError::InvalidLevel {
                level,
                levels: self.count_memory_levels(),
            });
        }
        debug!(level, "default memory pool switched");
        self.default_level = level;
        Ok(())
    }

    /// Maps `size` bytes starting at the page of `vaddr` into `level`.
    ///
    /// `ceil(size / page_size)` consecutive virtual pages are covered. Pages already mapped
    /// in the level are left as they are; every other page takes the next physical page
    /// from the level's free list. A `level` outside the configured range selects the
    /// default level. Nothing is mapped unless the whole span can be.
    ///
    /// # Errors
    ///
    /// - [`SimError::OutOfPages`] if the level cannot supply enough free pages.
    /// - [`SimError::PageAliased`] if another level maps any byte of a page in the span.
    /// - [`SimError::AddressOverflow`] if the span runs past the top of the address space.
    pub fn allocate(&mut self, size: u64, level: u32, vaddr: VirtAddr) -> SimResult<Allocation> {
        let index = self.resolve_level(level);
        let target = &self.levels[index];
        let first = target.vpn(vaddr);
        let pages = target.pages_for(size);
        let out_of_pages = |target: &MemoryLevel, requested: u64| SimError::OutOfPages {
            level: index as u32,
            requested,
            available: target.free_page_count(),
        };

        if pages > target.page_count() {
            return Err(out_of_pages(target, pages));
        }
        let end = first
            .checked_add(pages)
            .ok_or_else(|| out_of_pages(target, pages))?;

        let missing: Vec<u64> = (first..end).filter(|&vpn| !target.is_mapped(vpn)).collect();
        if missing.len() as u64 > target.free_page_count() {
            return Err(out_of_pages(target, missing.len() as u64));
        }
        let page_size = target.page_size();
        for &vpn in &missing {
            let base = vpn
                .checked_mul(page_size)
                .ok_or(SimError::AddressOverflow { vaddr, size })?;
            let last = base.saturating_add(page_size - 1);
            if let Some(owner) = self.owner_overlapping(index, base, last) {
                return Err(SimError::PageAliased {
                    vaddr: VirtAddr::new(base),
                    owner: owner as u32,
                    level: index as u32,
                });
            }
        }

        let target = &mut self.levels[index];
        for &vpn in &missing {
            let ppn = target
                .map_next(vpn)
                .ok_or_else(|| SimError::OutOfPages {
                    level: index as u32,
                    requested: missing.len() as u64,
                    available: 0,
                })?;
            debug!(level = index, vpn, ppn, "page mapped");
        }
        if let Some(old) = target.record_allocation(first, size) {
            debug!(vaddr = %vaddr, old, new = size, "allocation record replaced");
        }

        debug!(
            vaddr = %vaddr,
            size,
            level = index,
            pages,
            newly_mapped = missing.len(),
            "allocated"
        );
        Ok(Allocation {
            level: index as u32,
            pages,
            newly_mapped: missing.len() as u64,
        })
    }

    /// Releases the allocation recorded at the page of `vaddr`.
    ///
    /// The span is recomputed from the recorded length exactly as `allocate` computed it,
    /// and every mapped page in it goes back to the level's free list.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownAllocation`] if no level recorded an allocation at that page.
    pub fn free(&mut self, vaddr: VirtAddr) -> SimResult<Release> {
        let (index, first, size) = self
            .levels
            .iter()
            .enumerate()
            .find_map(|(i, level)| {
                let vpn = level.vpn(vaddr);
                level.allocation_at(vpn).map(|size| (i, vpn, size))
            })
            .ok_or(SimError::UnknownAllocation { vaddr })?;

        let level = &mut self.levels[index];
        let end = first.saturating_add(level.pages_for(size));
        let pages_returned = (first..end).filter(|&vpn| level.unmap(vpn).is_some()).count() as u64;
        let _ = level.take_allocation(first);

        debug!(vaddr = %vaddr, size, level = index, pages_returned, "freed");
        Ok(Release {
            level: index as u32,
            size,
            pages_returned,
        })
    }

    /// Translates a virtual address.
    ///
    /// The level that served the previous translation is searched first, then every level
    /// in index order. `physical = ppn * page_size + vaddr % page_size`.
    ///
    /// # Errors
    ///
    /// [`SimError::UnmappedAddress`] if no level maps the page.
    pub fn translate_address(&self, vaddr: VirtAddr) -> SimResult<PhysAddr> {
        let hint = self.last_hit.get();
        let order = hint
            .into_iter()
            .chain((0..self.levels.len()).filter(|&i| Some(i) != hint));

        for index in order {
            if let Some(paddr) = self.levels[index].translate(vaddr) {
                self.last_hit.set(Some(index));
                return Ok(paddr);
            }
        }
        Err(SimError::UnmappedAddress { vaddr })
    }

    /// Level index an allocation naming `level` lands in.
    pub fn resolve_level(&self, level: u32) -> usize {
        if level < self.count_memory_levels() {
            level as usize
        } else {
            warn!(
                requested = level,
                levels = self.levels.len(),
                default = self.default_level,
                "allocation level out of range, using default level"
            );
            self.default_level as usize
        }
    }

    /// First level other than `index` mapping any byte of `first..=last`.
    fn owner_overlapping(&self, index: usize, first: u64, last: u64) -> Option<usize> {
        self.levels
            .iter()
            .enumerate()
            .find(|&(i, level)| i != index && level.maps_any_in(first, last))
            .map(|(i, _)| i)
    }
}
