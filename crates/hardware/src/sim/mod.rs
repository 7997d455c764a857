//! Cooperative multi-core driver.
//!
//! The [`Simulator`] is the external scheduler the cores are written against: it owns the
//! shared address space, every core, and the memory subsystem, and advances them one
//! simulated cycle at a time.

/// Top-level simulator and run loop.
pub mod simulator;

pub use simulator::{RunOutcome, RunSummary, Simulator};
