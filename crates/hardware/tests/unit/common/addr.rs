//! Address Type Tests.
//!
//! Page arithmetic and formatting of the address newtypes.

use rstest::rstest;
use tracesim_core::common::{AccessKind, PhysAddr, VirtAddr};

#[rstest]
#[case(0x0, 4096, 0x0, 0x0)]
#[case(0x1FFF, 4096, 0xFFF, 0x1000)]
#[case(0x2710, 4096, 0x710, 0x2000)]
#[case(0x12345, 65536, 0x2345, 0x10000)]
fn page_split(#[case] addr: u64, #[case] page: u64, #[case] offset: u64, #[case] base: u64) {
    let va = VirtAddr::new(addr);
    assert_eq!(va.page_offset(page), offset);
    assert_eq!(va.page_base(page).val(), base);
}

#[test]
fn display_is_hex() {
    assert_eq!(VirtAddr::new(0x1000).to_string(), "0x1000");
    assert_eq!(PhysAddr::new(255).to_string(), "0xff");
}

#[test]
fn access_kind_tags() {
    assert_eq!(AccessKind::Read.tag(), 'R');
    assert_eq!(AccessKind::Write.tag(), 'W');
    assert_eq!(AccessKind::Read.to_string(), "read");
    assert_eq!(AccessKind::Write.to_string(), "write");
}
