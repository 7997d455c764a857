//! Configuration system for the trace engine.
//!
//! This module defines all configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Baseline constants for the core, memory levels, and memory timing.
//! 2. **Structures:** Hierarchical config for the cores and the memory system.
//! 3. **Validation:** Rejection of parameters that cannot describe a working system.
//!
//! Configuration is supplied as JSON by the driver, or use `Config::default()`.

use serde::Deserialize;

use crate::common::error::{SimError, SimResult};

/// Default configuration constants.
///
/// These values define the baseline configuration when a field is not
/// explicitly set in the JSON document.
mod defaults {
    /// Number of simulated hardware threads.
    pub const CORES: u32 = 1;

    /// Cache line size in bytes; single accesses may not straddle one without splitting.
    pub const CACHE_LINE: u64 = 64;

    /// Maximum number of decoded events buffered per core.
    pub const MAX_QUEUE_LENGTH: usize = 64;

    /// Maximum number of events issued per core per cycle.
    pub const MAX_ISSUE_PER_CYCLE: u32 = 2;

    /// Maximum number of in-flight memory transactions per core.
    pub const MAX_PENDING_TRANSACTIONS: usize = 16;

    /// Host wall-clock budget of the single poll made per queue refill, in milliseconds.
    pub const PIPE_TIMEOUT_MS: u64 = 10;

    /// Page size of the default memory level (4 KiB).
    pub const PAGE_SIZE: u64 = 4096;

    /// Page count of the default memory level (512 MiB of 4 KiB pages).
    pub const PAGE_COUNT: u64 = 131_072;

    /// Fixed latency of the simple memory controller, in cycles.
    pub const MEMORY_LATENCY: u64 = 100;

    /// CAS (Column Access Strobe) latency in DRAM cycles.
    pub const T_CAS: u64 = 14;

    /// RAS (Row Access Strobe) latency in DRAM cycles.
    pub const T_RAS: u64 = 14;

    /// Precharge latency in DRAM cycles.
    pub const T_PRE: u64 = 14;
}

/// Latency model used by the bundled memory subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryController {
    /// Every request completes after a fixed number of cycles.
    #[default]
    Simple,
    /// Row-buffer model: hits pay CAS, misses pay precharge + RAS + CAS.
    #[serde(alias = "DRAM")]
    Dram,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use tracesim_core::config::Config;
///
/// let json = r#"{
///     "cores": 2,
///     "core": {
///         "cache_line_size": 64,
///         "max_queue_length": 32,
///         "max_issue_per_cycle": 4,
///         "max_pending_transactions": 8,
///         "perform_address_checks": true
///     },
///     "memory": {
///         "levels": [
///             { "page_size": 4096, "page_count": 1024 },
///             { "page_size": 2097152, "page_count": 16 }
///         ],
///         "default_level": 1,
///         "controller": "Dram"
///     }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cores, 2);
/// assert_eq!(config.memory.levels.len(), 2);
/// assert_eq!(config.core.pipe_timeout_ms, 10);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Number of simulated hardware threads.
    #[serde(default = "Config::default_cores")]
    pub cores: u32,
    /// Per-core issue and queueing parameters.
    #[serde(default)]
    pub core: CoreConfig,
    /// Memory levels and memory subsystem timing.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    fn default_cores() -> u32 {
        defaults::CORES
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`SimError::ConfigParse`] for malformed JSON, [`SimError::InvalidConfig`] when the
    /// parsed values fail [`Config::validate`].
    pub fn from_json(text: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a system that can make progress.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> SimResult<()> {
        if self.cores == 0 {
            return Err(invalid("cores", "at least one core is required"));
        }
        self.core.validate()?;
        self.memory.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cores: defaults::CORES,
            core: CoreConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Per-core parameters shared by every simulated hardware thread.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Cache line size in bytes.
    #[serde(default = "CoreConfig::default_cache_line_size")]
    pub cache_line_size: u64,

    /// Bound of the decoded-event queue.
    #[serde(default = "CoreConfig::default_max_queue_length")]
    pub max_queue_length: usize,

    /// Events issued per cycle at most.
    #[serde(default = "CoreConfig::default_max_issue_per_cycle")]
    pub max_issue_per_cycle: u32,

    /// In-flight transaction budget.
    #[serde(default = "CoreConfig::default_max_pending_transactions")]
    pub max_pending_transactions: usize,

    /// Verify split arithmetic on every line-crossing access.
    #[serde(default)]
    pub perform_address_checks: bool,

    /// Timeout of the poll made per refill, in milliseconds.
    #[serde(default = "CoreConfig::default_pipe_timeout_ms")]
    pub pipe_timeout_ms: u64,

    /// When set, each core writes committed requests to `<prefix>-<core>.trace`.
    #[serde(default)]
    pub trace_file_prefix: Option<String>,
}

impl CoreConfig {
    fn default_cache_line_size() -> u64 {
        defaults::CACHE_LINE
    }

    fn default_max_queue_length() -> usize {
        defaults::MAX_QUEUE_LENGTH
    }

    fn default_max_issue_per_cycle() -> u32 {
        defaults::MAX_ISSUE_PER_CYCLE
    }

    fn default_max_pending_transactions() -> usize {
        defaults::MAX_PENDING_TRANSACTIONS
    }

    fn default_pipe_timeout_ms() -> u64 {
        defaults::PIPE_TIMEOUT_MS
    }

    /// Checks the per-core parameters.
    ///
    /// The pending budget must admit two transactions because a line-crossing access
    /// commits both halves in the same issue slot.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> SimResult<()> {
        if self.cache_line_size == 0 {
            return Err(invalid("core.cache_line_size", "must be non-zero"));
        }
        if self.cache_line_size > u64::from(u32::MAX) {
            return Err(invalid("core.cache_line_size", "must fit in 32 bits"));
        }
        if self.max_queue_length == 0 {
            return Err(invalid("core.max_queue_length", "must be non-zero"));
        }
        if self.max_issue_per_cycle == 0 {
            return Err(invalid("core.max_issue_per_cycle", "must be non-zero"));
        }
        if self.max_pending_transactions < 2 {
            return Err(invalid(
                "core.max_pending_transactions",
                "must be at least 2 so a split access can commit",
            ));
        }
        Ok(())
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cache_line_size: defaults::CACHE_LINE,
            max_queue_length: defaults::MAX_QUEUE_LENGTH,
            max_issue_per_cycle: defaults::MAX_ISSUE_PER_CYCLE,
            max_pending_transactions: defaults::MAX_PENDING_TRANSACTIONS,
            perform_address_checks: false,
            pipe_timeout_ms: defaults::PIPE_TIMEOUT_MS,
            trace_file_prefix: None,
        }
    }
}

/// Geometry of one memory level (pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LevelConfig {
    /// Page size in bytes.
    pub page_size: u64,
    /// Number of physical pages in the pool.
    pub page_count: u64,
}

impl LevelConfig {
    /// Creates a level of `page_count` pages of `page_size` bytes.
    pub const fn new(page_size: u64, page_count: u64) -> Self {
        Self {
            page_size,
            page_count,
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::PAGE_SIZE,
            page_count: defaults::PAGE_COUNT,
        }
    }
}

/// Memory levels and the timing of the bundled memory subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Independently sized page pools, indexed by level.
    #[serde(default = "MemoryConfig::default_levels")]
    pub levels: Vec<LevelConfig>,

    /// Level that receives allocations not naming a valid level.
    #[serde(default)]
    pub default_level: u32,

    /// Latency model for completed requests.
    #[serde(default)]
    pub controller: MemoryController,

    /// Latency of the simple controller, in cycles.
    #[serde(default = "MemoryConfig::default_latency")]
    pub latency: u64,

    /// CAS latency (DRAM controller).
    #[serde(default = "MemoryConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency (DRAM controller).
    #[serde(default = "MemoryConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency (DRAM controller).
    #[serde(default = "MemoryConfig::default_t_pre")]
    pub t_pre: u64,
}

impl MemoryConfig {
    fn default_levels() -> Vec<LevelConfig> {
        vec![LevelConfig::default()]
    }

    fn default_latency() -> u64 {
        defaults::MEMORY_LATENCY
    }

    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }

    /// Checks the level table and default level.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> SimResult<()> {
        if self.levels.is_empty() {
            return Err(invalid("memory.levels", "at least one level is required"));
        }
        if u32::try_from(self.levels.len()).is_err() {
            return Err(invalid("memory.levels", "too many levels"));
        }
        if let Some(index) = self.levels.iter().position(|l| l.page_size == 0) {
            return Err(invalid(
                "memory.levels",
                format!("level {index} has a zero page size"),
            ));
        }
        if let Some(index) = self
            .levels
            .iter()
            .position(|l| l.page_size.checked_mul(l.page_count).is_none())
        {
            return Err(invalid(
                "memory.levels",
                format!("level {index} is larger than the physical address space"),
            ));
        }
        if self.default_level as usize >= self.levels.len() {
            return Err(invalid(
                "memory.default_level",
                format!(
                    "level {} out of range ({} configured)",
                    self.default_level,
                    self.levels.len()
                ),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            levels: Self::default_levels(),
            default_level: 0,
            controller: MemoryController::Simple,
            latency: defaults::MEMORY_LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SimError {
    SimError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}
