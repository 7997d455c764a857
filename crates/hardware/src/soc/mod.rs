//! Downstream memory system.
//!
//! This module defines the boundary between a core and the memory/cache hierarchy
//! behind it, plus a latency-modelled implementation of that boundary:
//! 1. **Traits:** Request/completion types and the `MemorySubsystem` trait.
//! 2. **Memory:** `TimedMemory`, which completes requests after a controller-modelled delay.

/// Memory subsystem implementations and latency controllers.
pub mod memory;

/// Request, completion, and subsystem trait definitions.
pub mod traits;

pub use memory::TimedMemory;
pub use traits::{MemRequest, MemResponse, MemorySubsystem, TransactionId};
