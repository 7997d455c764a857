//! Address Space Tests.
//!
//! Verifies allocation, release, translation, and pool selection across levels:
//! 1. **Allocation:** Page spans, idempotent remapping, exhaustion, aliasing.
//! 2. **Release:** Every page of the recorded span goes back to the free list.
//! 3. **Translation:** Page number and offset arithmetic, multi-level lookup.
//! 4. **Pools:** Default-level switching and fallback for out-of-range levels.

use pretty_assertions::assert_eq;
use tracesim_core::SimError;
use tracesim_core::common::{PhysAddr, VirtAddr};
use tracesim_core::config::{LevelConfig, MemoryConfig};
use tracesim_core::mmu::{AddressSpace, Allocation, Release};

fn va(addr: u64) -> VirtAddr {
    VirtAddr::new(addr)
}

fn single_level(pages: u64) -> AddressSpace {
    AddressSpace::from_levels(&[LevelConfig::new(4096, pages)], 0)
}

fn two_levels() -> AddressSpace {
    AddressSpace::from_levels(
        &[LevelConfig::new(4096, 8), LevelConfig::new(65536, 2)],
        0,
    )
}

fn free_count(space: &AddressSpace, level: u32) -> u64 {
    space.level(level).map_or(0, |l| l.free_page_count())
}

// ══════════════════════════════════════════════════════════
// 1. Allocation and release
// ══════════════════════════════════════════════════════════

#[test]
fn ten_thousand_bytes_take_three_pages_and_free_returns_them() {
    let mut space = single_level(4);
    let alloc = space.allocate(10_000, 0, va(0x1000)).unwrap();
    assert_eq!(
        alloc,
        Allocation {
            level: 0,
            pages: 3,
            newly_mapped: 3
        }
    );
    assert_eq!(free_count(&space, 0), 1);

    for addr in [0x1000, 0x1fff, 0x2000, 0x3000, 0x1000 + 9_999] {
        assert!(space.translate_address(va(addr)).is_ok(), "{addr:#x}");
    }

    let release = space.free(va(0x1000)).unwrap();
    assert_eq!(
        release,
        Release {
            level: 0,
            size: 10_000,
            pages_returned: 3
        }
    );
    assert_eq!(free_count(&space, 0), 4);
    assert!(space.translate_address(va(0x1000)).is_err());
}

#[test]
fn pages_come_from_the_front_of_the_free_list() {
    let mut space = single_level(4);
    let _ = space.allocate(8192, 0, va(0x10_000)).unwrap();
    assert_eq!(space.translate_address(va(0x10_010)).unwrap(), PhysAddr::new(0x0010));
    assert_eq!(space.translate_address(va(0x11_020)).unwrap(), PhysAddr::new(0x1020));
}

#[test]
fn freed_pages_go_to_the_back_of_the_free_list() {
    let mut space = single_level(3);
    let _ = space.allocate(4096, 0, va(0x0)).unwrap();
    let _ = space.free(va(0x0)).unwrap();
    let order: Vec<u64> = space.level(0).unwrap().free_pages().collect();
    assert_eq!(order, vec![1, 2, 0]);

    let _ = space.allocate(4096, 0, va(0x5000)).unwrap();
    assert_eq!(space.translate_address(va(0x5000)).unwrap(), PhysAddr::new(0x1000));
}

#[test]
fn unaligned_start_spans_from_its_page() {
    let mut space = single_level(4);
    // ceil(4096 / 4096) = 1 page starting at the page of 0x1800.
    let alloc = space.allocate(4096, 0, va(0x1800)).unwrap();
    assert_eq!(alloc.pages, 1);
    assert!(space.translate_address(va(0x1000)).is_ok());
    assert!(space.translate_address(va(0x2000)).is_err());
}

#[test]
fn remapping_existing_pages_consumes_no_new_pages() {
    let mut space = single_level(4);
    let _ = space.allocate(8192, 0, va(0x0)).unwrap();
    let again = space.allocate(12_288, 0, va(0x0)).unwrap();
    assert_eq!(again.pages, 3);
    assert_eq!(again.newly_mapped, 1);
    assert_eq!(free_count(&space, 0), 1);

    let release = space.free(va(0x0)).unwrap();
    assert_eq!(release.size, 12_288);
    assert_eq!(release.pages_returned, 3);
    assert_eq!(free_count(&space, 0), 4);
}

#[test]
fn zero_byte_allocation_maps_nothing_but_can_be_freed() {
    let mut space = single_level(2);
    let alloc = space.allocate(0, 0, va(0x4000)).unwrap();
    assert_eq!(alloc.pages, 0);
    assert_eq!(free_count(&space, 0), 2);
    let release = space.free(va(0x4000)).unwrap();
    assert_eq!(release.pages_returned, 0);
}

#[test]
fn exhausted_level_fails_without_side_effects() {
    let mut space = single_level(4);
    let _ = space.allocate(4096, 0, va(0x0)).unwrap();
    match space.allocate(4 * 4096, 0, va(0x10_000)) {
        Err(SimError::OutOfPages {
            level,
            requested,
            available,
        }) => {
            assert_eq!(level, 0);
            assert_eq!(requested, 4);
            assert_eq!(available, 3);
        }
        other => panic!("expected OutOfPages, got {other:?}"),
    }
    assert_eq!(free_count(&space, 0), 3);
    assert!(space.translate_address(va(0x10_000)).is_err());
}

#[test]
fn allocation_larger_than_level_is_out_of_pages() {
    let mut space = single_level(2);
    assert!(matches!(
        space.allocate(u64::MAX, 0, va(0)),
        Err(SimError::OutOfPages { .. })
    ));
}

#[test]
fn free_of_unknown_address_is_an_error() {
    let mut space = single_level(2);
    assert!(matches!(
        space.free(va(0x7000)),
        Err(SimError::UnknownAllocation { vaddr }) if vaddr == va(0x7000)
    ));
}

#[test]
fn free_inside_allocation_page_but_not_its_start_page_fails() {
    let mut space = single_level(4);
    let _ = space.allocate(8192, 0, va(0x1000)).unwrap();
    assert!(space.free(va(0x2000)).is_err());
    // Any address in the start page identifies the allocation.
    assert!(space.free(va(0x1abc)).is_ok());
}

// ══════════════════════════════════════════════════════════
// 2. Translation
// ══════════════════════════════════════════════════════════

#[test]
fn translate_unmapped_is_an_error() {
    let space = single_level(2);
    assert!(matches!(
        space.translate_address(va(0x1234)),
        Err(SimError::UnmappedAddress { .. })
    ));
}

#[test]
fn translation_finds_pages_in_any_level() {
    let mut space = two_levels();
    let _ = space.allocate(4096, 0, va(0x1000)).unwrap();
    let _ = space.allocate(65536, 1, va(0x10_0000)).unwrap();

    assert_eq!(space.translate_address(va(0x1004)).unwrap(), PhysAddr::new(0x4));
    assert_eq!(space.translate_address(va(0x10_abcd)).unwrap(), PhysAddr::new(0xabcd));
    // Alternate between levels; the search hint must not change results.
    assert_eq!(space.translate_address(va(0x1008)).unwrap(), PhysAddr::new(0x8));
}

#[test]
fn page_mapped_in_another_level_cannot_be_aliased() {
    let mut space = two_levels();
    let _ = space.allocate(4096, 0, va(0x0)).unwrap();
    match space.allocate(65536, 1, va(0x0)) {
        Err(SimError::PageAliased { owner, level, .. }) => {
            assert_eq!(owner, 0);
            assert_eq!(level, 1);
        }
        other => panic!("expected PageAliased, got {other:?}"),
    }
    assert_eq!(free_count(&space, 1), 2);
}

#[test]
fn large_page_covering_a_mapped_small_page_is_aliased() {
    let mut space = two_levels();
    let _ = space.allocate(4096, 0, va(0x11000)).unwrap();
    match space.allocate(65536, 1, va(0x10000)) {
        Err(SimError::PageAliased { vaddr, owner, level }) => {
            assert_eq!(vaddr, va(0x10000));
            assert_eq!(owner, 0);
            assert_eq!(level, 1);
        }
        other => panic!("expected PageAliased, got {other:?}"),
    }
    assert_eq!(free_count(&space, 1), 2);
    assert!(space.translate_address(va(0x10000)).is_err());
    assert_eq!(space.translate_address(va(0x11000)).unwrap(), PhysAddr::new(0x0));
}

#[test]
fn small_page_inside_a_mapped_large_page_is_aliased() {
    let mut space = two_levels();
    let _ = space.allocate(65536, 1, va(0x10000)).unwrap();
    match space.allocate(4096, 0, va(0x11000)) {
        Err(SimError::PageAliased { owner, level, .. }) => {
            assert_eq!(owner, 1);
            assert_eq!(level, 0);
        }
        other => panic!("expected PageAliased, got {other:?}"),
    }
    assert_eq!(free_count(&space, 0), 8);
    assert_eq!(space.translate_address(va(0x11000)).unwrap(), PhysAddr::new(0x1000));
}

#[test]
fn translation_does_not_depend_on_search_order() {
    let mut space = two_levels();
    let _ = space.allocate(4096, 0, va(0x11000)).unwrap();
    let _ = space.allocate(65536, 1, va(0x20000)).unwrap();

    let first = space.translate_address(va(0x11000)).unwrap();
    let _ = space.translate_address(va(0x20000)).unwrap();
    let second = space.translate_address(va(0x11000)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn allocation_past_the_top_of_the_address_space_fails() {
    let mut space = single_level(8);
    match space.allocate(8192, 0, va(u64::MAX - 100)) {
        Err(SimError::AddressOverflow { vaddr, size }) => {
            assert_eq!(vaddr, va(u64::MAX - 100));
            assert_eq!(size, 8192);
        }
        other => panic!("expected AddressOverflow, got {other:?}"),
    }
    assert_eq!(free_count(&space, 0), 8);
}

#[test]
fn last_page_of_the_address_space_can_be_mapped() {
    let mut space = single_level(8);
    let _ = space.allocate(16, 0, va(u64::MAX - 100)).unwrap();
    assert_eq!(
        space.translate_address(va(u64::MAX)).unwrap(),
        PhysAddr::new(0xfff)
    );
}

// ══════════════════════════════════════════════════════════
// 3. Pool selection
// ══════════════════════════════════════════════════════════

#[test]
fn out_of_range_level_uses_default() {
    let mut space = two_levels();
    space.set_default_pool(1).unwrap();
    let alloc = space.allocate(100, 42, va(0x20_0000)).unwrap();
    assert_eq!(alloc.level, 1);
    assert_eq!(free_count(&space, 1), 1);
    assert_eq!(free_count(&space, 0), 8);
}

#[test]
fn switching_pool_leaves_existing_mappings() {
    let mut space = two_levels();
    let _ = space.allocate(4096, 0, va(0x3000)).unwrap();
    space.set_default_pool(1).unwrap();
    assert_eq!(space.default_level(), 1);
    assert!(space.translate_address(va(0x3000)).is_ok());
    let release = space.free(va(0x3000)).unwrap();
    assert_eq!(release.level, 0);
}

#[test]
fn switching_to_missing_level_is_an_error() {
    let mut space = two_levels();
    assert!(matches!(
        space.set_default_pool(2),
        Err(SimError::InvalidLevel { level: 2, levels: 2 })
    ));
    assert_eq!(space.default_level(), 0);
}

#[test]
fn built_from_memory_config() {
    let config = MemoryConfig {
        levels: vec![LevelConfig::new(4096, 4), LevelConfig::new(2 << 20, 2)],
        default_level: 1,
        ..MemoryConfig::default()
    };
    let space = AddressSpace::new(&config).unwrap();
    assert_eq!(space.count_memory_levels(), 2);
    assert_eq!(space.default_level(), 1);
    assert_eq!(space.level(1).map(|l| l.page_size()), Some(2 << 20));
}

#[test]
fn invalid_memory_config_is_rejected() {
    let config = MemoryConfig {
        levels: Vec::new(),
        ..MemoryConfig::default()
    };
    assert!(matches!(
        AddressSpace::new(&config),
        Err(SimError::InvalidConfig { .. })
    ));
}
