//! Latency-modelled memory subsystem.
//!
//! This module implements the bundled [`MemorySubsystem`]. It provides:
//! 1. **Controller:** Latency modeling (simple or DRAM row-buffer) per request.
//! 2. **Completion Queue:** Requests ordered by ready cycle, then arrival.

/// Memory controller implementations for access latency modeling.
pub mod controller;

use std::collections::BTreeMap;

use tracing::trace;

use self::controller::MemoryController;
use crate::common::data::AccessKind;
use crate::config::MemoryConfig;
use crate::soc::traits::{MemRequest, MemResponse, MemorySubsystem};

/// Memory subsystem that completes every request after a controller-chosen latency.
#[derive(Debug)]
pub struct TimedMemory {
    controller: Box<dyn MemoryController>,
    cycle: u64,
    seq: u64,
    /// Keyed by (ready cycle, arrival sequence).
    pending: BTreeMap<(u64, u64), MemResponse>,
    reads: u64,
    writes: u64,
    bytes: u64,
}

impl TimedMemory {
    /// Creates a subsystem around an explicit controller.
    pub fn new(controller: Box<dyn MemoryController>) -> Self {
        Self {
            controller,
            cycle: 0,
            seq: 0,
            pending: BTreeMap::new(),
            reads: 0,
            writes: 0,
            bytes: 0,
        }
    }

    /// Creates a subsystem with the controller selected by `config`.
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(controller::from_config(config))
    }

    /// Current subsystem cycle.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Read requests accepted so far.
    pub const fn reads(&self) -> u64 {
        self.reads
    }

    /// Write requests accepted so far.
    pub const fn writes(&self) -> u64 {
        self.writes
    }

    /// Bytes requested so far.
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl MemorySubsystem for TimedMemory {
    fn send_request(&mut self, request: MemRequest) {
        let latency = self.controller.access_latency(request.paddr);
        let ready = self.cycle + latency;
        match request.kind {
            AccessKind::Read => self.reads += 1,
            AccessKind::Write => self.writes += 1,
        }
        self.bytes += u64::from(request.len);
        trace!(
            core = request.core,
            id = request.id.0,
            paddr = %request.paddr,
            latency,
            "request accepted"
        );
        let previous = self.pending.insert((ready, self.seq), MemResponse::from(&request));
        debug_assert!(previous.is_none());
        self.seq += 1;
    }

    fn tick(&mut self, completed: &mut Vec<MemResponse>) {
        self.cycle += 1;
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > self.cycle {
                break;
            }
            completed.push(entry.remove());
        }
    }

    fn in_flight(&self) -> usize {
        self.pending.len()
    }
}
