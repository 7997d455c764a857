//! Stream Encoder Tests.
//!
//! The builder must emit exactly the bytes the decoder expects.

use pretty_assertions::assert_eq;
use tracesim_core::stream::{Event, SliceSource, StreamBuilder, StreamDecoder};

#[test]
fn read_record_layout() {
    let bytes = StreamBuilder::new().read(0x1122, 16).build();
    let mut expected = vec![2u8];
    expected.extend_from_slice(&0x1122u64.to_ne_bytes());
    expected.extend_from_slice(&16u32.to_ne_bytes());
    assert_eq!(bytes, expected);
}

#[test]
fn allocate_record_is_21_bytes() {
    let bytes = StreamBuilder::new().allocate(0, 1, 0).build();
    assert_eq!(bytes.len(), 1 + 8 + 8 + 4);
    assert_eq!(bytes[0], 80);
}

#[test]
fn event_wraps_accesses_in_their_own_block() {
    let bytes = StreamBuilder::new()
        .event(&Event::Write {
            address: 8,
            length: 8,
        })
        .build();
    assert_eq!(bytes.first(), Some(&32));
    assert_eq!(bytes.last(), Some(&64));
}

#[test]
fn instruction_skips_non_access_events() {
    let bytes = StreamBuilder::new()
        .instruction(&[Event::NoOp, Event::Exit])
        .build();
    assert_eq!(bytes, vec![32, 64]);
}

#[test]
fn every_event_kind_decodes_back() {
    let events = [
        Event::NoOp,
        Event::Allocate {
            virtual_address: 0x7000,
            length: 12_288,
            level: 3,
        },
        Event::Read {
            address: 0x7010,
            length: 32,
        },
        Event::Write {
            address: 0x7fff,
            length: 1,
        },
        Event::SwitchPool { level: 1 },
        Event::Free {
            virtual_address: 0x7000,
        },
        Event::Exit,
    ];
    let bytes = events
        .iter()
        .fold(StreamBuilder::new(), StreamBuilder::event)
        .build();
    let decoded = StreamDecoder::new()
        .decode_available(&mut SliceSource::new(bytes))
        .unwrap();
    assert_eq!(decoded, events.to_vec());
}

#[test]
fn as_bytes_tracks_build() {
    let builder = StreamBuilder::new().noop().exit();
    assert_eq!(builder.as_bytes(), &[128, 1]);
    assert_eq!(builder.build(), vec![128, 1]);
}
