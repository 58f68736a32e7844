//! Control-unit state: program counter, cycle count, and halt tracking.

/// The non-ROB, non-register-file control state of a run.
#[derive(Debug, Clone, Default)]
pub struct Control {
    /// Index of the next instruction to issue.
    pub pc: usize,
    /// Number of cycles executed so far.
    pub cycle: u64,
    /// Set once a `HALT` has been issued — no further instructions issue
    /// after it, even if the issue width would otherwise allow more.
    pub halt_issued: bool,
    /// Set once the issued `HALT` has committed — the run is over.
    pub halt_committed: bool,
}
