//! Memory-access trace simulator library.
//!
//! This crate models the per-hardware-thread processing of a memory-access instruction trace:
//! 1. **Stream:** Decoding a binary command stream into typed events.
//! 2. **Core:** A bounded event queue issued in order, gated by an in-flight transaction budget,
//!    with line-crossing accesses split against the cache-line geometry.
//! 3. **MMU:** Virtual to physical translation through multiple independently sized page pools.
//! 4. **SoC:** The memory-subsystem boundary and a latency-modelled implementation of it.
//! 5. **Simulation:** Configuration, a cooperative multi-core driver, and statistics.

/// Common types (addresses, access kinds, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Per-hardware-thread engine (queue, split, transactions, trace).
pub mod core;
/// Multi-level address space (page pools, allocation, translation).
pub mod mmu;
/// Cooperative tick driver.
pub mod sim;
/// Memory subsystem boundary and latency model.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Command stream decoding and encoding.
pub mod stream;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Engine for one simulated hardware thread.
pub use crate::core::CoreEngine;
/// Shared address space; construct with `AddressSpace::new`.
pub use crate::mmu::AddressSpace;
/// Top-level driver owning cores, address space, and memory subsystem.
pub use crate::sim::Simulator;
/// Fatal error type and result alias.
pub use crate::common::error::{SimError, SimResult};
