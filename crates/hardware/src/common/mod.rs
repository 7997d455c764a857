//! Common types shared by every component of the trace engine.
//!
//! This module provides the fundamental building blocks used across the crate:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Access Kinds:** Classification of memory requests (read or write).
//! 3. **Error Handling:** The unrecoverable-error type returned to the driver.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Memory access kind definitions.
pub mod data;

/// Fatal error type and result alias.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use data::AccessKind;
pub use error::{SimError, SimResult};
