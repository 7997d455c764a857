//! Per-core access trace files.
//!
//! Each committed request becomes one line: `<cycle> <R|W> <physical address> <length>`.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::common::addr::PhysAddr;
use crate::common::data::AccessKind;

/// Buffered writer of committed requests.
pub struct AccessTrace {
    out: BufWriter<Box<dyn Write + Send>>,
    path: Option<PathBuf>,
    lines: u64,
}

impl AccessTrace {
    /// Creates `<prefix>-<core>.trace`, truncating any existing file.
    ///
    /// # Errors
    ///
    /// Any error from creating the file.
    pub fn create(prefix: &str, core: u32) -> io::Result<Self> {
        let path = PathBuf::from(format!("{prefix}-{core}.trace"));
        let file = File::create(&path)?;
        Ok(Self {
            out: BufWriter::new(Box::new(file)),
            path: Some(path),
            lines: 0,
        })
    }

    /// Traces into an arbitrary writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: BufWriter::new(Box::new(writer)),
            path: None,
            lines: 0,
        }
    }

    /// Path of the trace file, when writing to one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lines written so far.
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Appends one request.
    ///
    /// # Errors
    ///
    /// Any error from the underlying writer.
    pub fn record(
        &mut self,
        cycle: u64,
        kind: AccessKind,
        paddr: PhysAddr,
        len: u32,
    ) -> io::Result<()> {
        writeln!(self.out, "{cycle} {} {} {len}", kind.tag(), paddr.val())?;
        self.lines += 1;
        Ok(())
    }

    /// Flushes buffered lines.
    ///
    /// # Errors
    ///
    /// Any error from the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl fmt::Debug for AccessTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTrace")
            .field("path", &self.path)
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}
