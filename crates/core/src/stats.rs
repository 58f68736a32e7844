//! Run statistics and the sectioned final report.

use std::time::Instant;

use crate::engine::{RunReport, Termination};

/// Counters accumulated over a run, plus wall-clock timing.
#[derive(Debug)]
pub struct SimStats {
    started: Instant,
    /// Total cycles the engine executed.
    pub cycles: u64,
    /// Total instructions issued across the run.
    pub issued: u64,
    /// Total instructions committed across the run.
    pub committed: u64,
    /// Number of taken-branch flushes.
    pub flushes: u64,
}

impl SimStats {
    /// Starts a fresh stats accumulator.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            cycles: 0,
            issued: 0,
            committed: 0,
            flushes: 0,
        }
    }

    /// Folds in one cycle's trace snapshot.
    pub fn record(&mut self, snapshot: &crate::engine::CycleSnapshot) {
        self.cycles = snapshot.cycle + 1;
        self.issued += snapshot.issued as u64;
        self.committed += snapshot.committed as u64;
        if snapshot.flushed {
            self.flushes += 1;
        }
    }

    /// Prints a sectioned human-readable summary, in the style of the
    /// simulator's final register dump.
    pub fn print_sections(&self, termination: Termination) {
        let elapsed = self.started.elapsed();
        println!("== Run summary ==");
        println!("termination:   {termination:?}");
        println!("cycles:        {}", self.cycles);
        println!("issued:        {}", self.issued);
        println!("committed:     {}", self.committed);
        println!("branch flushes:{}", self.flushes);
        println!("wall time:     {elapsed:?}");
    }

    /// Builds stats from a completed run's trace in one shot, for callers
    /// that don't need per-cycle incremental accumulation.
    #[must_use]
    pub fn from_report(report: &RunReport) -> Self {
        let mut stats = Self::start();
        for snapshot in &report.trace {
            stats.record(snapshot);
        }
        if report.trace.is_empty() {
            stats.cycles = report.cycles;
        }
        stats
    }
}
