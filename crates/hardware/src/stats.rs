//! Per-core statistics collection and reporting.
//!
//! This module tracks what each simulated hardware thread did with its event stream:
//! 1. **Requests:** Reads and writes accepted, and how many of them had to be split.
//! 2. **Policy outcomes:** Oversized accesses dropped and cycles that ended in a stall.
//! 3. **Address space:** Allocations, frees, and pool switches issued.

use std::ops::AddAssign;

use crate::common::data::AccessKind;

/// Counters for one core, or the sum over several.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreStats {
    /// Ticks in which the core was not halted.
    pub ticks: u64,
    /// Read events accepted (split or not).
    pub read_requests: u64,
    /// Read events that crossed a cache line.
    pub split_read_requests: u64,
    /// Write events accepted (split or not).
    pub write_requests: u64,
    /// Write events that crossed a cache line.
    pub split_write_requests: u64,
    /// Requests committed to the memory subsystem (two per split access).
    pub requests_committed: u64,
    /// NoOp events retired.
    pub noop_count: u64,
    /// Accesses longer than a cache line that were dropped.
    pub dropped_oversized: u64,
    /// Ticks that ended because the head access found the pending budget full.
    pub stalls: u64,
    /// Allocate events retired.
    pub allocations: u64,
    /// Free events retired.
    pub frees: u64,
    /// SwitchPool events retired.
    pub pool_switches: u64,
}

impl CoreStats {
    /// Counts one accepted access.
    pub fn record_access(&mut self, kind: AccessKind, split: bool) {
        match kind {
            AccessKind::Read => {
                self.read_requests += 1;
                if split {
                    self.split_read_requests += 1;
                }
            }
            AccessKind::Write => {
                self.write_requests += 1;
                if split {
                    self.split_write_requests += 1;
                }
            }
        }
    }

    /// Total read and write events accepted.
    pub const fn total_requests(&self) -> u64 {
        self.read_requests + self.write_requests
    }

    /// Sums counters from another core into this one.
    pub fn merge(&mut self, other: &Self) {
        *self += *other;
    }

    /// Renders the report printed at the end of a run.
    pub fn report(&self, label: &str) -> String {
        let mut out = String::new();
        let mut line = |name: &str, value: u64| {
            out.push_str(&format!("  {name:<28} {value}\n"));
        };
        line("ticks", self.ticks);
        line("read_requests", self.read_requests);
        line("split_read_requests", self.split_read_requests);
        line("write_requests", self.write_requests);
        line("split_write_requests", self.split_write_requests);
        line("total_requests", self.total_requests());
        line("requests_committed", self.requests_committed);
        line("noop_count", self.noop_count);
        line("dropped_oversized", self.dropped_oversized);
        line("stalls", self.stalls);
        line("allocations", self.allocations);
        line("frees", self.frees);
        line("pool_switches", self.pool_switches);
        format!("{label} statistics\n{out}")
    }

    /// Prints the report to stdout.
    pub fn print(&self, label: &str) {
        println!("==========================================================");
        print!("{}", self.report(label));
        println!("==========================================================");
    }
}

impl AddAssign for CoreStats {
    fn add_assign(&mut self, rhs: Self) {
        self.ticks += rhs.ticks;
        self.read_requests += rhs.read_requests;
        self.split_read_requests += rhs.split_read_requests;
        self.write_requests += rhs.write_requests;
        self.split_write_requests += rhs.split_write_requests;
        self.requests_committed += rhs.requests_committed;
        self.noop_count += rhs.noop_count;
        self.dropped_oversized += rhs.dropped_oversized;
        self.stalls += rhs.stalls;
        self.allocations += rhs.allocations;
        self.frees += rhs.frees;
        self.pool_switches += rhs.pool_switches;
    }
}
