//! Memory Level Tests.

use tracesim_core::common::VirtAddr;
use tracesim_core::config::LevelConfig;
use tracesim_core::mmu::MemoryLevel;

#[test]
fn new_level_has_every_page_free_in_order() {
    let level = MemoryLevel::new(LevelConfig::new(4096, 4));
    assert_eq!(level.free_page_count(), 4);
    assert_eq!(level.mapped_page_count(), 0);
    assert_eq!(level.free_pages().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
}

#[test]
fn page_arithmetic() {
    let level = MemoryLevel::new(LevelConfig::new(4096, 4));
    assert_eq!(level.vpn(VirtAddr::new(0x2fff)), 2);
    assert_eq!(level.pages_for(0), 0);
    assert_eq!(level.pages_for(1), 1);
    assert_eq!(level.pages_for(4096), 1);
    assert_eq!(level.pages_for(10_000), 3);
}

#[test]
fn unmapped_page_does_not_translate() {
    let level = MemoryLevel::new(LevelConfig::new(4096, 4));
    assert_eq!(level.translate(VirtAddr::new(0x1000)), None);
    assert!(!level.is_mapped(1));
    assert_eq!(level.lookup(1), None);
}
