//! Access Trace Tests.
//!
//! Committed requests are written as `<cycle> <R|W> <physical address> <length>`.

use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracesim_core::common::{AccessKind, PhysAddr};
use tracesim_core::config::{CoreConfig, LevelConfig};
use tracesim_core::core::trace::AccessTrace;
use tracesim_core::stream::StreamBuilder;

use crate::common::harness::{TestContext, core_config};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn record_line_format() {
    let buf = SharedBuf::default();
    let mut trace = AccessTrace::from_writer(buf.clone());
    trace.record(12, AccessKind::Write, PhysAddr::new(4160), 4).unwrap();
    trace.record(13, AccessKind::Read, PhysAddr::new(0), 64).unwrap();
    trace.flush().unwrap();

    let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    assert_eq!(text, "12 W 4160 4\n13 R 0 64\n");
    assert_eq!(trace.lines(), 2);
    assert!(trace.path().is_none());
}

#[test]
fn core_writes_one_line_per_committed_request() {
    let dir = TempDir::new().unwrap();
    let prefix = dir.path().join("run");
    let config = CoreConfig {
        trace_file_prefix: Some(prefix.to_string_lossy().into_owned()),
        ..core_config()
    };
    let mut ctx = TestContext::with_config(config, &[LevelConfig::new(4096, 4)]);
    ctx.map(0x0, 4096);
    ctx.feed(
        StreamBuilder::new()
            .begin_instruction()
            .read(60, 8)
            .write(128, 4)
            .end_instruction(),
    );
    let _ = ctx.step();
    ctx.core.finish().unwrap();

    let path = dir.path().join("run-0.trace");
    assert_eq!(ctx.core.access_trace().and_then(AccessTrace::path), Some(path.as_path()));
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "1 R 60 4\n1 R 64 4\n1 W 128 4\n");
}

#[test]
fn no_prefix_means_no_trace() {
    let ctx = TestContext::new();
    assert!(ctx.core.access_trace().is_none());
}
