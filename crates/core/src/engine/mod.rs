//! The Tomasulo engine: reservation stations, reorder buffer, and the
//! issue/execute/commit stages that drive them one cycle at a time.

mod commit;
mod control;
mod execute;
mod issue;
pub mod rob;
pub mod rs;

pub use control::Control;
pub use issue::IssueReport;

use tracing::{debug, info, warn};

use crate::arch::{DataMemory, RegisterFile};
use crate::config::Config;
use crate::isa::Instruction;
use commit::CommitReport;
use rob::Rob;
use rs::RsPool;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `HALT` issued, executed, and committed with an empty ROB behind it.
    Halted,
    /// Every instruction committed and the PC ran off the end of the
    /// program with no pending `HALT`.
    ProgramExhausted,
    /// Hit the configured cycle cap before terminating.
    CycleCap,
    /// No instruction issued, executed, or committed for
    /// `deadlock_window` consecutive cycles.
    Deadlock,
}

/// A snapshot of the engine state at the end of one cycle, captured only
/// when `Config::general.trace` is set.
#[derive(Debug, Clone)]
pub struct CycleSnapshot {
    /// Cycle number this snapshot describes.
    pub cycle: u64,
    /// Instructions issued this cycle.
    pub issued: usize,
    /// Instructions committed this cycle.
    pub committed: usize,
    /// Whether a taken branch flushed the pipeline this cycle.
    pub flushed: bool,
}

/// The terminal report returned once a run stops.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Why the run stopped.
    pub termination: Termination,
    /// Cycles executed.
    pub cycles: u64,
    /// Final architectural register contents.
    pub registers: Vec<i64>,
    /// Optional per-cycle trace, populated only when tracing is enabled.
    pub trace: Vec<CycleSnapshot>,
}

/// Owns every piece of microarchitectural and architectural state for one
/// simulation run, and drives it one cycle at a time.
pub struct Engine {
    pub(crate) config: Config,
    pub(crate) registers: RegisterFile,
    pub(crate) memory: DataMemory,
    pub(crate) rob: Rob,
    pub(crate) rs_pool: RsPool,
    pub(crate) control: Control,
    cycles_without_progress: u64,
}

impl Engine {
    /// Builds a fresh engine from `config`, with all architectural and
    /// microarchitectural state zeroed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let registers = RegisterFile::new(config.sizes.registers);
        let memory = DataMemory::new(config.sizes.data_memory);
        let rob = Rob::new(config.sizes.rob_capacity);
        let rs_pool = RsPool::new(config.sizes.reservation_stations);
        Self {
            config,
            registers,
            memory,
            rob,
            rs_pool,
            control: Control::default(),
            cycles_without_progress: 0,
        }
    }

    /// Current final register state, for inspection mid-run or after.
    #[must_use]
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Current data memory, for inspection mid-run or after.
    #[must_use]
    pub fn memory(&self) -> &DataMemory {
        &self.memory
    }

    /// Seeds an architectural register before the run starts. The ISA has
    /// no immediate-load instruction, so this is the only way a program
    /// can observe a nonzero input value.
    pub fn set_register(&mut self, idx: usize, value: i64) {
        self.registers.write(idx, value);
    }

    /// Seeds a data memory word before the run starts.
    pub fn set_memory(&mut self, addr: i64, value: i64) {
        let _ = self.memory.write(addr, value);
    }

    /// Runs one cycle: issue, then execute, then broadcast+commit, in that
    /// order, exactly mirroring a real Tomasulo pipeline where a result
    /// broadcast in this cycle's execute stage is visible to this cycle's
    /// commit but not to this cycle's issue (issue renames before execute
    /// runs).
    pub fn step(&mut self, program: &[Instruction]) -> StepOutcome {
        if self.control.halt_committed {
            return StepOutcome {
                issued: 0,
                committed: 0,
                flushed: false,
                termination: Some(Termination::Halted),
            };
        }

        let issued = self.issue(program).issued;
        let executed = self.execute();
        let CommitReport { committed, flushed } = self.commit(program.len());

        if issued == 0 && committed == 0 && !executed {
            self.cycles_without_progress += 1;
        } else {
            self.cycles_without_progress = 0;
        }

        self.control.cycle += 1;

        debug!(
            cycle = self.control.cycle,
            issued, committed, flushed, "cycle complete"
        );

        let termination = if self.control.halt_committed {
            info!(cycle = self.control.cycle, "halt committed");
            Some(Termination::Halted)
        } else if self.control.pc >= program.len() && self.rob.is_empty() {
            Some(Termination::ProgramExhausted)
        } else if self.control.cycle >= self.config.general.max_cycles {
            warn!(cycle = self.control.cycle, "cycle cap reached");
            Some(Termination::CycleCap)
        } else if self.cycles_without_progress >= self.config.general.deadlock_window {
            warn!(cycle = self.control.cycle, "no progress: declaring deadlock");
            Some(Termination::Deadlock)
        } else {
            None
        };

        StepOutcome {
            issued,
            committed,
            flushed,
            termination,
        }
    }

    /// Runs `step` to completion, returning the terminal report.
    pub fn run(&mut self, program: &[Instruction]) -> RunReport {
        let mut trace = Vec::new();
        loop {
            let cycle = self.control.cycle;
            let outcome = self.step(program);
            if self.config.general.trace {
                trace.push(CycleSnapshot {
                    cycle,
                    issued: outcome.issued,
                    committed: outcome.committed,
                    flushed: outcome.flushed,
                });
            }
            if let Some(termination) = outcome.termination {
                return RunReport {
                    termination,
                    cycles: self.control.cycle,
                    registers: self.registers.snapshot(),
                    trace,
                };
            }
        }
    }
}

/// The result of running one cycle.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    /// Instructions issued this cycle.
    pub issued: usize,
    /// Instructions committed this cycle.
    pub committed: usize,
    /// Whether a taken branch flushed the pipeline this cycle.
    pub flushed: bool,
    /// Set once the run should stop.
    pub termination: Option<Termination>,
}
