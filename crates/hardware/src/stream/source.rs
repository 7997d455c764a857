//! Byte sources for the command stream.
//!
//! A source answers two questions for the decoder: "is a byte ready within this
//! timeout?" and "give me exactly these many bytes". Implementations:
//! 1. **`SliceSource`:** An in-memory buffer; bytes can be appended while the run is live.
//! 2. **`ReaderSource`:** Any buffered reader; readiness is "the buffer is non-empty".
//! 3. **`FdSource`:** A Unix descriptor (pipe, FIFO, or file) polled with `poll(2)`.
//!
//! End of stream is reported as "not ready". A record cut short by end of stream
//! surfaces as an `UnexpectedEof` I/O error from `read_exact`.

use std::fmt;
use std::io::{self, BufRead};
use std::time::Duration;

use crate::common::error::SimResult;

/// Pull-based byte source consumed by the [`StreamDecoder`](super::StreamDecoder).
pub trait CommandSource {
    /// Waits at most `timeout` for at least one byte to become readable.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if a byte can be read without blocking, `Ok(false)` if nothing arrived in
    /// time or the stream has ended.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`](crate::common::SimError::Io) if the readiness check itself fails.
    fn poll(&mut self, timeout: Duration) -> SimResult<bool>;

    /// Fills `buf` completely, blocking until the bytes arrive.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` if the stream ends first, or the underlying read error.
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

impl fmt::Debug for dyn CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn CommandSource")
    }
}

impl<S: CommandSource + ?Sized> CommandSource for Box<S> {
    fn poll(&mut self, timeout: Duration) -> SimResult<bool> {
        (**self).poll(timeout)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact(buf)
    }
}

/// In-memory command stream.
#[derive(Debug, Default, Clone)]
pub struct SliceSource {
    data: Vec<u8>,
    pos: usize,
}

impl SliceSource {
    /// Creates a source over `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Appends bytes as a live producer would.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl CommandSource for SliceSource {
    fn poll(&mut self, _timeout: Duration) -> SimResult<bool> {
        Ok(self.pos < self.data.len())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let end = self.pos + buf.len();
        if end > self.data.len() {
            self.pos = self.data.len();
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }
}

/// Command stream over any buffered reader.
///
/// Readiness blocks until the reader's buffer refills, so the timeout is not honoured;
/// use [`FdSource`] for live pipes.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: BufRead> ReaderSource<R> {
    /// Wraps a buffered reader.
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> CommandSource for ReaderSource<R> {
    fn poll(&mut self, _timeout: Duration) -> SimResult<bool> {
        Ok(!self.inner.fill_buf()?.is_empty())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)
    }
}

#[cfg(unix)]
mod fd {
    use std::fs::File;
    use std::io::{self, Read};
    use std::os::fd::AsRawFd;
    use std::time::Duration;

    use super::CommandSource;
    use crate::common::error::SimResult;

    const CHUNK: usize = 4096;

    /// Command stream read from a Unix file descriptor.
    ///
    /// `poll` performs one `poll(2)` call bounded by the timeout and, when the descriptor
    /// is readable, pulls whatever is available into an internal buffer so that end of
    /// stream is detected without blocking.
    #[derive(Debug)]
    pub struct FdSource {
        file: File,
        buf: Vec<u8>,
        pos: usize,
        eof: bool,
    }

    impl FdSource {
        /// Wraps an open file, pipe, or FIFO.
        pub const fn new(file: File) -> Self {
            Self {
                file,
                buf: Vec::new(),
                pos: 0,
                eof: false,
            }
        }

        /// Returns `true` once the writer side has closed and every byte was consumed.
        pub fn is_finished(&self) -> bool {
            self.eof && self.pos == self.buf.len()
        }

        fn buffered(&self) -> usize {
            self.buf.len() - self.pos
        }

        fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
            let mut pfd = libc::pollfd {
                fd: self.file.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            };
            let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

            // SAFETY: `pfd` is a valid, initialised pollfd that lives for the duration of
            // the call, and the count of 1 matches the single entry passed.
            let rc = unsafe { libc::poll(&raw mut pfd, 1, timeout_ms) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    return Ok(false);
                }
                return Err(err);
            }
            Ok(rc > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP) != 0)
        }
    }

    impl CommandSource for FdSource {
        fn poll(&mut self, timeout: Duration) -> SimResult<bool> {
            if self.buffered() > 0 {
                return Ok(true);
            }
            if self.eof || !self.wait_readable(timeout)? {
                return Ok(false);
            }

            let mut chunk = [0u8; CHUNK];
            let n = self.file.read(&mut chunk)?;
            if n == 0 {
                self.eof = true;
                return Ok(false);
            }
            self.buf.clear();
            self.buf.extend_from_slice(&chunk[..n]);
            self.pos = 0;
            Ok(true)
        }

        fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
            let take = self.buffered().min(buf.len());
            buf[..take].copy_from_slice(&self.buf[self.pos..self.pos + take]);
            self.pos += take;
            if take == buf.len() {
                return Ok(());
            }
            let result = self.file.read_exact(&mut buf[take..]);
            if matches!(&result, Err(e) if e.kind() == io::ErrorKind::UnexpectedEof) {
                self.eof = true;
            }
            result
        }
    }
}

#[cfg(unix)]
pub use fd::FdSource;
