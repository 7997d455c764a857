//! Command stream opcodes.
//!
//! Each record starts with one of these bytes. Fields follow in native byte order.

/// Exit request; no fields.
pub const PERFORM_EXIT: u8 = 1;

/// Read inside an instruction block: `address: u64`, `length: u32`.
pub const PERFORM_READ: u8 = 2;

/// Write inside an instruction block: `address: u64`, `length: u32`.
pub const PERFORM_WRITE: u8 = 4;

/// Opens an instruction block of read/write sub-records; no fields.
pub const START_INSTRUCTION: u8 = 32;

/// Closes an instruction block; no fields.
pub const END_INSTRUCTION: u8 = 64;

/// Allocation: `virtual_address: u64`, `length: u64`, `level: u32`.
pub const ISSUE_TLM_MAP: u8 = 80;

/// Release: `virtual_address: u64`.
pub const ISSUE_TLM_FREE: u8 = 100;

/// Change the default allocation level: `level: u32`.
pub const SWITCH_POOL: u8 = 110;

/// Instruction without memory operands; no fields.
pub const NOOP: u8 = 128;
