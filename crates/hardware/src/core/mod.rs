//! Per-hardware-thread trace engine.
//!
//! A [`CoreEngine`] drives one simulated hardware thread through
//! decode → gate → split → translate → issue, strictly in arrival order:
//! 1. **Refill:** When the queue is empty, decode records from the command stream until the
//!    queue is full or no more bytes are ready (one bounded poll per refill).
//! 2. **Issue:** Up to `max_issue_per_cycle` events per tick, always from the queue head.
//! 3. **Gate:** Reads and writes wait at the head while the pending budget is full; the rest
//!    of the tick is forfeited.
//! 4. **Split:** Line-crossing accesses become two requests; oversized ones are dropped.
//! 5. **Completion:** The driver retires transactions through [`CoreEngine::complete`].

/// Bounded event queue.
pub mod queue;

/// Cache-line splitting arithmetic.
pub mod split;

/// Per-core access trace files.
pub mod trace;

/// Pending-transaction table.
pub mod transactions;

use std::time::Duration;

use tracing::{debug, info, trace};

use self::queue::EventQueue;
use self::split::SplitPlan;
use self::trace::AccessTrace;
use self::transactions::{PendingTransaction, TransactionTable};
use crate::common::addr::{PhysAddr, VirtAddr};
use crate::common::data::AccessKind;
use crate::common::error::{SimError, SimResult};
use crate::config::CoreConfig;
use crate::mmu::AddressSpace;
use crate::soc::traits::{MemRequest, MemorySubsystem, TransactionId};
use crate::stats::CoreStats;
use crate::stream::{CommandSource, DecoderState, Event, StreamDecoder};

/// Result of one issue attempt at the queue head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueOutcome {
    /// The head event was retired.
    Issued,
    /// The head access must wait for the pending budget.
    Stalled,
    /// Queue empty and nothing ready on the stream.
    Starved,
    /// The head event was `Exit`; the core has halted.
    Exited,
}

/// Why a tick stopped issuing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// All issue slots were used.
    IssueWidth,
    /// Head access blocked on the pending budget.
    Stalled,
    /// No event available.
    Starved,
    /// The core is halted (now or earlier).
    Halted,
}

/// What one tick accomplished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Events retired this tick.
    pub issued: u32,
    /// Why issuing stopped.
    pub stop: StopReason,
}

/// One simulated hardware thread.
#[derive(Debug)]
pub struct CoreEngine {
    id: u32,
    config: CoreConfig,
    source: Box<dyn CommandSource>,
    decoder: StreamDecoder,
    queue: EventQueue,
    pending: TransactionTable,
    halted: bool,
    cycle: u64,
    stats: CoreStats,
    trace: Option<AccessTrace>,
}

impl CoreEngine {
    /// Creates core `id` reading commands from `source`.
    ///
    /// Opens `<prefix>-<id>.trace` when the configuration names a trace prefix.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] for unusable parameters, [`SimError::Io`] if the trace
    /// file cannot be created.
    pub fn new(id: u32, config: &CoreConfig, source: Box<dyn CommandSource>) -> SimResult<Self> {
        config.validate()?;
        let trace = match &config.trace_file_prefix {
            Some(prefix) => Some(AccessTrace::create(prefix, id)?),
            None => None,
        };
        debug!(
            core = id,
            max_queue = config.max_queue_length,
            max_issue = config.max_issue_per_cycle,
            max_pending = config.max_pending_transactions,
            "core created"
        );
        Ok(Self {
            id,
            config: config.clone(),
            source,
            decoder: StreamDecoder::new(),
            queue: EventQueue::new(config.max_queue_length),
            pending: TransactionTable::new(config.max_pending_transactions),
            halted: false,
            cycle: 0,
            stats: CoreStats::default(),
            trace,
        })
    }

    /// Replaces the access trace sink.
    #[must_use]
    pub fn with_trace(mut self, trace: AccessTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Core id.
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Returns `true` once an `Exit` event has been issued.
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Ticks processed while not halted.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Decoded events waiting to issue.
    pub const fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// In-flight transactions.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// In-flight transaction table.
    pub const fn pending(&self) -> &TransactionTable {
        &self.pending
    }

    /// Counters gathered so far.
    pub const fn stats(&self) -> &CoreStats {
        &self.stats
    }

    /// Block state of the stream decoder.
    pub const fn decoder_state(&self) -> DecoderState {
        self.decoder.state()
    }

    /// Access trace, if one is attached.
    pub const fn access_trace(&self) -> Option<&AccessTrace> {
        self.trace.as_ref()
    }

    /// Decodes events into the queue until it is full or the stream has nothing ready.
    ///
    /// Exactly one poll uses the configured timeout; later readiness checks do not wait.
    ///
    /// # Returns
    ///
    /// `true` if at least one event was queued.
    ///
    /// # Errors
    ///
    /// Any decoder or stream error.
    pub fn refill(&mut self) -> SimResult<bool> {
        let timeout = Duration::from_millis(self.config.pipe_timeout_ms);
        let mut added = false;
        let mut ready = self.source.poll(timeout)?;

        while ready && !self.queue.is_full() {
            if let Some(event) = self.decoder.decode_record(self.source.as_mut())? {
                trace!(core = self.id, %event, "decoded");
                let pushed = self.queue.push(event);
                debug_assert!(pushed.is_ok(), "refill overran the queue bound");
                added = true;
            }
            ready = self.source.poll(Duration::ZERO)?;
        }

        trace!(core = self.id, added, queued = self.queue.len(), "refill complete");
        Ok(added)
    }

    /// Runs one simulated cycle.
    ///
    /// Issues up to `max_issue_per_cycle` events from the queue head. The first attempt that
    /// makes no progress ends the tick; unused slots are not carried over. A halted core
    /// does nothing.
    ///
    /// # Errors
    ///
    /// Any fatal condition met while decoding, translating, or updating the address space.
    pub fn tick(
        &mut self,
        space: &mut AddressSpace,
        memory: &mut dyn MemorySubsystem,
    ) -> SimResult<TickReport> {
        if self.halted {
            return Ok(TickReport {
                issued: 0,
                stop: StopReason::Halted,
            });
        }
        self.cycle += 1;
        self.stats.ticks += 1;

        let mut issued = 0;
        let mut stop = StopReason::IssueWidth;
        while issued < self.config.max_issue_per_cycle {
            match self.issue_next(space, memory)? {
                IssueOutcome::Issued => issued += 1,
                IssueOutcome::Exited => {
                    issued += 1;
                    stop = StopReason::Halted;
                    break;
                }
                IssueOutcome::Stalled => {
                    self.stats.stalls += 1;
                    stop = StopReason::Stalled;
                    break;
                }
                IssueOutcome::Starved => {
                    stop = StopReason::Starved;
                    break;
                }
            }
        }
        Ok(TickReport { issued, stop })
    }

    /// Retires the transaction `id` reported complete by the memory subsystem.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownTransaction`] if `id` is not in flight on this core.
    pub fn complete(&mut self, id: TransactionId) -> SimResult<PendingTransaction> {
        let txn = self.pending.complete(id).ok_or(SimError::UnknownTransaction {
            core: self.id,
            id: id.0,
        })?;
        trace!(core = self.id, id = id.0, left = self.pending.len(), "transaction complete");
        Ok(txn)
    }

    /// Flushes the access trace.
    ///
    /// # Errors
    ///
    /// Any error from the trace writer.
    pub fn finish(&mut self) -> SimResult<()> {
        if let Some(trace) = &mut self.trace {
            trace.flush()?;
        }
        Ok(())
    }

    /// Attempts to retire the event at the queue head.
    ///
    /// # Errors
    ///
    /// Any fatal condition raised by the head event.
    pub fn issue_next(
        &mut self,
        space: &mut AddressSpace,
        memory: &mut dyn MemorySubsystem,
    ) -> SimResult<IssueOutcome> {
        if self.halted {
            return Ok(IssueOutcome::Exited);
        }
        if self.queue.is_empty() && !self.refill()? {
            return Ok(IssueOutcome::Starved);
        }
        let Some(&event) = self.queue.front() else {
            return Ok(IssueOutcome::Starved);
        };

        let outcome = match event {
            Event::NoOp => {
                self.stats.noop_count += 1;
                IssueOutcome::Issued
            }
            Event::Read { address, length } => {
                self.issue_access(AccessKind::Read, address, length, space, memory)?
            }
            Event::Write { address, length } => {
                self.issue_access(AccessKind::Write, address, length, space, memory)?
            }
            Event::Allocate {
                virtual_address,
                length,
                level,
            } => {
                let _ = space.allocate(length, level, VirtAddr::new(virtual_address))?;
                self.stats.allocations += 1;
                IssueOutcome::Issued
            }
            Event::Free { virtual_address } => {
                let _ = space.free(VirtAddr::new(virtual_address))?;
                self.stats.frees += 1;
                IssueOutcome::Issued
            }
            Event::SwitchPool { level } => {
                space.set_default_pool(level)?;
                self.stats.pool_switches += 1;
                IssueOutcome::Issued
            }
            Event::Exit => {
                self.halted = true;
                info!(core = self.id, cycle = self.cycle, "core exited");
                IssueOutcome::Exited
            }
        };

        debug_assert!(
            outcome != IssueOutcome::Stalled || event.is_memory_access(),
            "only reads and writes wait on the pending budget"
        );
        if outcome != IssueOutcome::Stalled {
            let _ = self.queue.pop();
        }
        Ok(outcome)
    }

    fn issue_access(
        &mut self,
        kind: AccessKind,
        address: u64,
        length: u32,
        space: &AddressSpace,
        memory: &mut dyn MemorySubsystem,
    ) -> SimResult<IssueOutcome> {
        let line = self.config.cache_line_size;
        let len = u64::from(length);
        let plan = split::plan(address, len, line);

        if !self.pending.has_room(plan.segment_count().max(1)) {
            trace!(
                core = self.id,
                pending = self.pending.len(),
                "pending budget full, stalling"
            );
            return Ok(IssueOutcome::Stalled);
        }

        match plan {
            SplitPlan::Empty => {
                let _ = space.translate_address(VirtAddr::new(address))?;
                debug!(core = self.id, %kind, vaddr = address, "zero-length access retired");
                self.stats.record_access(kind, false);
                return Ok(IssueOutcome::Issued);
            }
            SplitPlan::Oversized => {
                debug!(
                    core = self.id,
                    %kind,
                    vaddr = address,
                    len,
                    line,
                    "access longer than a cache line dropped"
                );
                self.stats.dropped_oversized += 1;
                return Ok(IssueOutcome::Issued);
            }
            SplitPlan::Split(left, right) if self.config.perform_address_checks => {
                split::verify(address, len, line, left, right)?;
            }
            _ => {}
        }

        let mut translated: [Option<(PhysAddr, u32)>; 2] = [None, None];
        for (slot, segment) in translated.iter_mut().zip(plan.segments()) {
            let paddr = space.translate_address(VirtAddr::new(segment.addr))?;
            *slot = Some((paddr, segment.len as u32));
        }

        debug!(
            core = self.id,
            %kind,
            vaddr = address,
            len,
            split = plan.is_split(),
            "access issued"
        );
        for (paddr, seg_len) in translated.into_iter().flatten() {
            self.commit(kind, paddr, seg_len, memory)?;
        }
        self.stats.record_access(kind, plan.is_split());
        Ok(IssueOutcome::Issued)
    }

    fn commit(
        &mut self,
        kind: AccessKind,
        paddr: PhysAddr,
        len: u32,
        memory: &mut dyn MemorySubsystem,
    ) -> SimResult<()> {
        let txn = self.pending.issue(kind, paddr, len, self.cycle);
        trace!(core = self.id, id = txn.id.0, paddr = %paddr, len, "request committed");
        memory.send_request(MemRequest {
            core: self.id,
            id: txn.id,
            kind,
            paddr,
            len,
        });
        self.stats.requests_committed += 1;
        if let Some(trace) = &mut self.trace {
            trace.record(self.cycle, kind, paddr, len)?;
        }
        Ok(())
    }
}
