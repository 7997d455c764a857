//! Memory Access Kinds.
//!
//! Classifies the requests a core commits to the memory subsystem. The kind is the
//! only thing that distinguishes a read from a write once an access has been split
//! and translated; it also selects which statistics counters are bumped.

use std::fmt;

/// Kind of memory request sent downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Data read.
    Read,
    /// Data write.
    Write,
}

impl AccessKind {
    /// Single-letter tag used in access trace files (`R` or `W`).
    pub const fn tag(self) -> char {
        match self {
            Self::Read => 'R',
            Self::Write => 'W',
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}
