//! Decoded events.

use std::fmt;

/// One unit of work in a core's queue.
///
/// Events are immutable once decoded and are consumed strictly in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Instruction without memory operands.
    NoOp,
    /// Load of `length` bytes at virtual `address`.
    Read {
        /// Virtual address.
        address: u64,
        /// Length in bytes.
        length: u32,
    },
    /// Store of `length` bytes at virtual `address`.
    Write {
        /// Virtual address.
        address: u64,
        /// Length in bytes.
        length: u32,
    },
    /// Map `length` bytes at `virtual_address` into memory level `level`.
    Allocate {
        /// First virtual address of the region.
        virtual_address: u64,
        /// Region size in bytes.
        length: u64,
        /// Requested level; out-of-range values select the default level.
        level: u32,
    },
    /// Release the allocation recorded at `virtual_address`.
    Free {
        /// Address passed to the matching allocation.
        virtual_address: u64,
    },
    /// Make `level` the default allocation level.
    SwitchPool {
        /// New default level.
        level: u32,
    },
    /// Terminal event; the core halts once it is issued.
    Exit,
}

impl Event {
    /// Returns `true` for events gated by the pending-transaction budget.
    pub const fn is_memory_access(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Write { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => write!(f, "NOOP"),
            Self::Read { address, length } => write!(f, "READ {address:#x}+{length}"),
            Self::Write { address, length } => write!(f, "WRITE {address:#x}+{length}"),
            Self::Allocate {
                virtual_address,
                length,
                level,
            } => write!(f, "ALLOCATE {virtual_address:#x}+{length} @L{level}"),
            Self::Free { virtual_address } => write!(f, "FREE {virtual_address:#x}"),
            Self::SwitchPool { level } => write!(f, "SWITCH_POOL L{level}"),
            Self::Exit => write!(f, "EXIT"),
        }
    }
}
