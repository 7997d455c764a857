//! Command Source Tests.
//!
//! Readiness and end-of-stream behaviour of the in-memory, reader-backed,
//! and file-descriptor sources.

use std::io::{self, Cursor};
use std::time::Duration;

use tracesim_core::stream::{CommandSource, ReaderSource, SliceSource, StreamBuilder, StreamDecoder};

// ══════════════════════════════════════════════════════════
// 1. SliceSource
// ══════════════════════════════════════════════════════════

#[test]
fn slice_source_ready_until_drained() {
    let mut src = SliceSource::new(vec![1u8, 2, 3]);
    assert!(src.poll(Duration::ZERO).unwrap());
    let mut buf = [0u8; 3];
    src.read_exact(&mut buf).unwrap();
    assert_eq!(buf, [1, 2, 3]);
    assert_eq!(src.remaining(), 0);
    assert!(!src.poll(Duration::ZERO).unwrap());
}

#[test]
fn slice_source_short_read_is_eof() {
    let mut src = SliceSource::new(vec![1u8]);
    let mut buf = [0u8; 4];
    let err = src.read_exact(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn slice_source_extend_revives_readiness() {
    let mut src = SliceSource::default();
    assert!(!src.poll(Duration::ZERO).unwrap());
    src.extend(&[128]);
    assert!(src.poll(Duration::ZERO).unwrap());
}

// ══════════════════════════════════════════════════════════
// 2. ReaderSource
// ══════════════════════════════════════════════════════════

#[test]
fn reader_source_decodes_stream() {
    let bytes = StreamBuilder::new().noop().exit().build();
    let mut src = ReaderSource::new(Cursor::new(bytes));
    let events = StreamDecoder::new().decode_available(&mut src).unwrap();
    assert_eq!(events.len(), 2);
    assert!(!src.poll(Duration::ZERO).unwrap());
    assert_eq!(src.into_inner().position(), 2);
}

// ══════════════════════════════════════════════════════════
// 3. FdSource
// ══════════════════════════════════════════════════════════

#[cfg(unix)]
mod fd {
    use std::fs::File;
    use std::io::Write;
    use std::os::fd::OwnedFd;
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    use tempfile::NamedTempFile;
    use tracesim_core::stream::{CommandSource, Event, FdSource, StreamBuilder, StreamDecoder};

    #[test]
    fn file_source_reads_to_end() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&StreamBuilder::new().noop().noop().exit().build())
            .unwrap();
        file.flush().unwrap();

        let mut src = FdSource::new(File::open(file.path()).unwrap());
        let events = StreamDecoder::new().decode_available(&mut src).unwrap();
        assert_eq!(events, vec![Event::NoOp, Event::NoOp, Event::Exit]);
        assert!(!src.poll(Duration::from_millis(1)).unwrap());
        assert!(src.is_finished());
    }

    #[test]
    fn empty_file_is_finished_immediately() {
        let file = NamedTempFile::new().unwrap();
        let mut src = FdSource::new(File::open(file.path()).unwrap());
        assert!(!src.poll(Duration::from_millis(1)).unwrap());
        assert!(src.is_finished());
    }

    #[test]
    fn socket_source_waits_then_sees_data_then_eof() {
        let (mut writer, reader) = UnixStream::pair().unwrap();
        let mut src = FdSource::new(File::from(OwnedFd::from(reader)));

        assert!(!src.poll(Duration::from_millis(5)).unwrap());
        assert!(!src.is_finished());

        writer.write_all(&[128]).unwrap();
        assert!(src.poll(Duration::from_millis(500)).unwrap());
        let mut buf = [0u8; 1];
        src.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [128]);

        drop(writer);
        assert!(!src.poll(Duration::from_millis(500)).unwrap());
        assert!(src.is_finished());
    }

    #[test]
    fn record_split_across_writes_is_reassembled() {
        let (mut writer, reader) = UnixStream::pair().unwrap();
        let mut src = FdSource::new(File::from(OwnedFd::from(reader)));
        let bytes = StreamBuilder::new().switch_pool(7).build();

        writer.write_all(&bytes[..2]).unwrap();
        assert!(src.poll(Duration::from_millis(500)).unwrap());
        writer.write_all(&bytes[2..]).unwrap();

        let event = StreamDecoder::new().decode_record(&mut src).unwrap();
        assert_eq!(event, Some(Event::SwitchPool { level: 7 }));
    }
}
