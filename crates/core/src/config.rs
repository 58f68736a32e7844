//! Configuration for the simulator.
//!
//! This module defines the structures used to parameterize a run. It
//! provides:
//! 1. **Defaults:** the baseline architecture constants.
//! 2. **Structures:** hierarchical config for sizing, issue/commit width,
//!    and run-termination behavior.
//!
//! Configuration is supplied as JSON (`--config path.json` on the CLI) or
//! via `Config::default()`.

use serde::Deserialize;

/// Default configuration constants for the simulator.
mod defaults {
    /// Maximum number of instructions a program image may contain.
    pub const MAX_INSTR_MEM: usize = 16;
    /// Number of reservation stations.
    pub const RESERVATION_STATIONS: usize = 4;
    /// Reorder buffer capacity.
    pub const ROB_CAPACITY: usize = 4;
    /// Number of architectural registers.
    pub const REGISTERS: usize = 8;
    /// Size of data memory, in words.
    pub const DATA_MEMORY: usize = 256;
    /// Instructions issued per cycle.
    pub const ISSUE_WIDTH: usize = 1;
    /// Instructions committed per cycle.
    pub const COMMIT_WIDTH: usize = 1;
    /// Absolute cycle cap before a run is aborted as non-terminating.
    pub const MAX_CYCLES: u64 = 100;
    /// Cycles with no issue, execute, or commit progress before a run is
    /// declared deadlocked.
    pub const DEADLOCK_WINDOW: u64 = 10;
}

/// Top-level simulator configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Structure sizing (ROB, reservation stations, registers, memory).
    pub sizes: SizeConfig,
    /// Per-cycle issue/commit width.
    pub width: WidthConfig,
    /// Run-termination and tracing behavior.
    pub general: GeneralConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sizes: SizeConfig::default(),
            width: WidthConfig::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl Config {
    /// A generously-sized preset: ten reservation stations, a ten-entry
    /// ROB, and an issue/commit width of eight — wide enough that most
    /// small programs never stall on structural hazards.
    #[must_use]
    pub fn wide() -> Self {
        Self {
            sizes: SizeConfig {
                instr_mem: defaults::MAX_INSTR_MEM,
                reservation_stations: 10,
                rob_capacity: 10,
                registers: defaults::REGISTERS,
                data_memory: defaults::DATA_MEMORY,
            },
            width: WidthConfig {
                issue: 8,
                commit: 8,
            },
            general: GeneralConfig::default(),
        }
    }
}

/// Sizes of the core's fixed-capacity structures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    /// Maximum program length.
    #[serde(default = "SizeConfig::default_instr_mem")]
    pub instr_mem: usize,
    /// Reservation station count.
    #[serde(default = "SizeConfig::default_reservation_stations")]
    pub reservation_stations: usize,
    /// Reorder buffer capacity.
    #[serde(default = "SizeConfig::default_rob_capacity")]
    pub rob_capacity: usize,
    /// Architectural register count.
    #[serde(default = "SizeConfig::default_registers")]
    pub registers: usize,
    /// Data memory size, in words.
    #[serde(default = "SizeConfig::default_data_memory")]
    pub data_memory: usize,
}

impl SizeConfig {
    fn default_instr_mem() -> usize {
        defaults::MAX_INSTR_MEM
    }

    fn default_reservation_stations() -> usize {
        defaults::RESERVATION_STATIONS
    }

    fn default_rob_capacity() -> usize {
        defaults::ROB_CAPACITY
    }

    fn default_registers() -> usize {
        defaults::REGISTERS
    }

    fn default_data_memory() -> usize {
        defaults::DATA_MEMORY
    }
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            instr_mem: Self::default_instr_mem(),
            reservation_stations: Self::default_reservation_stations(),
            rob_capacity: Self::default_rob_capacity(),
            registers: Self::default_registers(),
            data_memory: Self::default_data_memory(),
        }
    }
}

/// Per-cycle issue and commit width.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WidthConfig {
    /// Instructions issued per cycle.
    #[serde(default = "WidthConfig::default_issue")]
    pub issue: usize,
    /// Instructions committed per cycle.
    #[serde(default = "WidthConfig::default_commit")]
    pub commit: usize,
}

impl WidthConfig {
    fn default_issue() -> usize {
        defaults::ISSUE_WIDTH
    }

    fn default_commit() -> usize {
        defaults::COMMIT_WIDTH
    }
}

impl Default for WidthConfig {
    fn default() -> Self {
        Self {
            issue: Self::default_issue(),
            commit: Self::default_commit(),
        }
    }
}

/// Run-termination and tracing behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Emit a `tracing` event for every issue/execute/commit/stall/flush.
    #[serde(default)]
    pub trace: bool,
    /// Absolute cycle cap before the run is aborted.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
    /// Cycles of total inactivity before the run is declared deadlocked.
    #[serde(default = "GeneralConfig::default_deadlock_window")]
    pub deadlock_window: u64,
}

impl GeneralConfig {
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    fn default_deadlock_window() -> u64 {
        defaults::DEADLOCK_WINDOW
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            max_cycles: Self::default_max_cycles(),
            deadlock_window: Self::default_deadlock_window(),
        }
    }
}
