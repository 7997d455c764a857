//! Fatal error definitions.
//!
//! Every condition in this module terminates the simulation run. They fall into four groups:
//! 1. **Protocol violations:** Malformed command streams and completions for unknown requests.
//! 2. **Resource exhaustion:** A memory level ran out of free physical pages.
//! 3. **Addressing errors:** Translation or release of a virtual page nobody mapped.
//! 4. **Configuration errors:** Parameters that cannot describe a working system.
//!
//! Benign outcomes (oversized accesses that get dropped, stalls on the pending budget)
//! are not errors and never appear here.

use std::io;

use thiserror::Error;

use super::addr::VirtAddr;

/// Result alias used by every fallible operation in the crate.
pub type SimResult<T> = Result<T, SimError>;

/// Unrecoverable simulation error, propagated to the driver which decides how to abort.
#[derive(Debug, Error)]
pub enum SimError {
    /// An opcode byte that is not part of the command protocol.
    #[error("unknown command opcode {opcode:#04x} ({context})")]
    UnknownOpcode {
        /// The offending byte.
        opcode: u8,
        /// Whether the byte was read at top level or inside an instruction block.
        context: &'static str,
    },

    /// The stream ended in the middle of a record.
    #[error("command stream ended inside a record (opcode {opcode:#04x})")]
    TruncatedRecord {
        /// Opcode of the partially read record.
        opcode: u8,
    },

    /// Reading or polling the command stream failed.
    #[error("command stream I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A completion arrived for a transaction this core never issued or already retired.
    #[error("core {core}: completion for unknown transaction {id}")]
    UnknownTransaction {
        /// Core that received the completion.
        core: u32,
        /// Transaction id carried by the completion.
        id: u64,
    },

    /// A completion was addressed to a core that does not exist.
    #[error("completion addressed to unknown core {core}")]
    UnknownCore {
        /// Core id carried by the completion.
        core: u32,
    },

    /// An allocation needed more pages than the level has free.
    #[error("memory level {level} out of pages: {requested} needed, {available} free")]
    OutOfPages {
        /// Level that was asked for pages.
        level: u32,
        /// Pages the allocation needed to map.
        requested: u64,
        /// Pages left on the free list.
        available: u64,
    },

    /// No level maps the page containing this address.
    #[error("virtual address {vaddr} is not mapped in any memory level")]
    UnmappedAddress {
        /// Address that failed to translate.
        vaddr: VirtAddr,
    },

    /// `free` was called on an address with no recorded allocation.
    #[error("free of virtual address {vaddr} with no recorded allocation")]
    UnknownAllocation {
        /// Address handed to `free`.
        vaddr: VirtAddr,
    },

    /// An allocation span runs past the top of the virtual address space.
    #[error("allocation of {size} bytes at {vaddr} overflows the address space")]
    AddressOverflow {
        /// Start address of the allocation.
        vaddr: VirtAddr,
        /// Requested length in bytes.
        size: u64,
    },

    /// A level index outside the configured range.
    #[error("memory level {level} does not exist ({levels} configured)")]
    InvalidLevel {
        /// Requested level.
        level: u32,
        /// Number of configured levels.
        levels: u32,
    },

    /// A virtual page is already mapped by a different level.
    #[error("virtual address {vaddr} is already mapped in level {owner}, cannot map in level {level}")]
    PageAliased {
        /// Page base that collided.
        vaddr: VirtAddr,
        /// Level that currently maps the page.
        owner: u32,
        /// Level the allocation asked for.
        level: u32,
    },

    /// Split arithmetic produced segments that do not tile the access.
    #[error(
        "split of access {addr:#x}+{len} on {line}-byte lines produced {left_addr:#x}+{left_size} / {right_addr:#x}+{right_size}"
    )]
    SplitMismatch {
        /// Original access address.
        addr: u64,
        /// Original access length.
        len: u64,
        /// Cache line size.
        line: u64,
        /// Left segment address.
        left_addr: u64,
        /// Left segment length.
        left_size: u64,
        /// Right segment address.
        right_addr: u64,
        /// Right segment length.
        right_size: u64,
    },

    /// Configuration cannot describe a working system.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Configuration text could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl SimError {
    /// Returns `true` for errors caused by a desynchronized producer or memory subsystem.
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownOpcode { .. }
                | Self::TruncatedRecord { .. }
                | Self::UnknownTransaction { .. }
                | Self::UnknownCore { .. }
        )
    }
}
