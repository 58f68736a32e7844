//! CDB broadcast (done in the execute stage) and commit: in-order retire
//! of up to `width` ready ROB entries per cycle, including the taken-branch
//! flush.

use tracing::{debug, info};

use super::Engine;
use crate::isa::Opcode;

/// Outcome of one commit-stage invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitReport {
    /// Number of entries retired this cycle.
    pub committed: usize,
    /// Whether a taken branch flushed younger in-flight instructions.
    pub flushed: bool,
}

impl Engine {
    /// `program_len` bounds a taken branch's resolved target: the assembler
    /// never range-checks a jump/branch immediate, so a target at or past
    /// the end of the program falls back to the last valid instruction
    /// index rather than sending the PC somewhere `issue` can never fetch
    /// from.
    pub(super) fn commit(&mut self, program_len: usize) -> CommitReport {
        let width = self.config.width.commit;
        let mut committed = 0;
        let mut flushed = false;

        while committed < width {
            let Some(head) = self.rob.peek_head() else {
                break;
            };
            if !head.ready {
                break;
            }
            let head = head.clone();

            if let Some(dest) = head.dest {
                self.registers.write(dest, head.result);
            }
            if head.opcode == Opcode::Sw {
                if let (Some(addr), Some(data)) = (head.store_addr, head.store_data) {
                    let _ = self.memory.write(addr, data);
                }
            }

            if head.opcode.is_branch() && head.branch_taken {
                let tags = self.rob.tags_after(head.issue_pc);
                self.rs_pool.release_targeting(&tags);
                self.rob.flush_after(head.issue_pc);
                let target = head.branch_target.unwrap_or(head.issue_pc + 1);
                self.control.pc = if target >= program_len {
                    program_len.saturating_sub(1)
                } else {
                    target
                };
                flushed = true;
                // A HALT issued speculatively past this (unresolved, until
                // now) branch may have just been flushed away; only keep
                // blocking issue if one is still actually in flight.
                self.control.halt_issued = self.rob.has_opcode(Opcode::Halt);
                debug!(
                    issue_pc = head.issue_pc,
                    target = self.control.pc,
                    "branch taken: flushed younger instructions"
                );
            }

            if head.opcode == Opcode::Halt {
                self.control.halt_committed = true;
                info!("halt retired");
            }

            let _ = self.rob.commit_head();
            committed += 1;

            // A flush invalidated the instructions behind this one; there is
            // nothing more to commit against the (now-empty or shrunk) tail
            // this cycle.
            if flushed {
                break;
            }
        }

        CommitReport { committed, flushed }
    }
}
