//! Simulator: owns the cores, the address space, and the memory subsystem side-by-side.
//!
//! Each cycle runs in a fixed order:
//! 1. **Memory:** The subsystem advances one cycle and reports finished requests.
//! 2. **Completions:** Every response is routed to the core that issued it.
//! 3. **Cores:** Every non-halted core ticks, in core-id order, against the shared address space.
//!
//! Cores never run in parallel, so the address space needs no locking.

use tracing::{debug, info};

use crate::common::error::{SimError, SimResult};
use crate::config::Config;
use crate::core::CoreEngine;
use crate::mmu::AddressSpace;
use crate::soc::memory::TimedMemory;
use crate::soc::traits::{MemResponse, MemorySubsystem};
use crate::stats::CoreStats;
use crate::stream::CommandSource;

/// How a call to [`Simulator::run`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every core exited and every transaction completed.
    Finished,
    /// The cycle cap was reached first.
    CycleLimit,
}

/// Result of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles simulated in total, including earlier runs.
    pub cycles: u64,
    /// Why the run stopped.
    pub outcome: RunOutcome,
}

/// Top-level simulator: cores, shared address space, and memory subsystem.
#[derive(Debug)]
pub struct Simulator {
    space: AddressSpace,
    cores: Vec<CoreEngine>,
    memory: Box<dyn MemorySubsystem>,
    cycle: u64,
    completions: Vec<MemResponse>,
}

impl Simulator {
    /// Creates a simulator with the bundled [`TimedMemory`] subsystem.
    ///
    /// # Arguments
    ///
    /// * `config` - Full configuration; validated here.
    /// * `sources` - One command stream per core, in core-id order.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] if the configuration is invalid or the number of sources
    /// differs from `config.cores`; [`SimError::Io`] if a trace file cannot be created.
    pub fn new(config: &Config, sources: Vec<Box<dyn CommandSource>>) -> SimResult<Self> {
        let memory = Box::new(TimedMemory::from_config(&config.memory));
        Self::with_memory(config, sources, memory)
    }

    /// Creates a simulator around an explicit memory subsystem.
    ///
    /// # Errors
    ///
    /// Same as [`Simulator::new`].
    pub fn with_memory(
        config: &Config,
        sources: Vec<Box<dyn CommandSource>>,
        memory: Box<dyn MemorySubsystem>,
    ) -> SimResult<Self> {
        config.validate()?;
        if sources.len() != config.cores as usize {
            return Err(SimError::InvalidConfig {
                field: "cores",
                reason: format!(
                    "{} cores configured but {} command streams supplied",
                    config.cores,
                    sources.len()
                ),
            });
        }

        let space = AddressSpace::new(&config.memory)?;
        let cores = sources
            .into_iter()
            .zip(0..)
            .map(|(source, id)| CoreEngine::new(id, &config.core, source))
            .collect::<SimResult<Vec<_>>>()?;

        info!(
            cores = cores.len(),
            levels = space.count_memory_levels(),
            line = config.core.cache_line_size,
            "simulator created"
        );
        Ok(Self {
            space,
            cores,
            memory,
            cycle: 0,
            completions: Vec::new(),
        })
    }

    /// Cycles simulated so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Shared address space.
    pub const fn address_space(&self) -> &AddressSpace {
        &self.space
    }

    /// All cores, in id order.
    pub fn cores(&self) -> &[CoreEngine] {
        &self.cores
    }

    /// Memory subsystem.
    pub fn memory(&self) -> &dyn MemorySubsystem {
        self.memory.as_ref()
    }

    /// Returns `true` once every core has exited and no request is in flight.
    pub fn is_finished(&self) -> bool {
        self.memory.in_flight() == 0
            && self
                .cores
                .iter()
                .all(|core| core.is_halted() && core.pending_count() == 0)
    }

    /// Advances the whole system by one cycle.
    ///
    /// # Errors
    ///
    /// - [`SimError::UnknownCore`] / [`SimError::UnknownTransaction`] for a completion that
    ///   matches no in-flight request.
    /// - Any fatal error raised by a core tick.
    pub fn tick(&mut self) -> SimResult<()> {
        self.cycle += 1;

        self.completions.clear();
        self.memory.tick(&mut self.completions);
        for response in &self.completions {
            let core = self
                .cores
                .get_mut(response.core as usize)
                .ok_or(SimError::UnknownCore {
                    core: response.core,
                })?;
            let _ = core.complete(response.id)?;
        }

        for core in &mut self.cores {
            if !core.is_halted() {
                let _ = core.tick(&mut self.space, self.memory.as_mut())?;
            }
        }
        Ok(())
    }

    /// Ticks until the system is finished or `max_cycles` more cycles have elapsed.
    ///
    /// `None` runs without a cap; a stream that never sends `Exit` then never returns.
    ///
    /// # Errors
    ///
    /// The first fatal error raised by [`Simulator::tick`].
    pub fn run(&mut self, max_cycles: Option<u64>) -> SimResult<RunSummary> {
        let start = self.cycle;
        let outcome = loop {
            if self.is_finished() {
                break RunOutcome::Finished;
            }
            if max_cycles.is_some_and(|cap| self.cycle - start >= cap) {
                break RunOutcome::CycleLimit;
            }
            self.tick()?;
        };
        debug!(cycles = self.cycle, ?outcome, "run stopped");
        Ok(RunSummary {
            cycles: self.cycle,
            outcome,
        })
    }

    /// Counters summed over every core.
    pub fn stats(&self) -> CoreStats {
        let mut total = CoreStats::default();
        for core in &self.cores {
            total.merge(core.stats());
        }
        total
    }

    /// Flushes every core's access trace.
    ///
    /// # Errors
    ///
    /// The first trace write error.
    pub fn finish(&mut self) -> SimResult<()> {
        self.cores.iter_mut().try_for_each(CoreEngine::finish)
    }
}
