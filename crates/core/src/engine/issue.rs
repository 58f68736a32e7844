//! Issue stage: rename and dispatch up to `width` instructions per cycle.

use tracing::{debug, trace};

use super::rs::{Operand, ReservationStation};
use super::Engine;
use crate::isa::{Instruction, Opcode};

/// Outcome of one issue-stage invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueReport {
    /// Number of instructions issued this cycle.
    pub issued: usize,
}

impl Engine {
    /// Attempts to issue up to `config.width.issue` instructions this
    /// cycle, starting at the current PC. Stops early on a ROB-full stall,
    /// an RS-full stall, or once a `HALT` has been issued.
    pub(super) fn issue(&mut self, program: &[Instruction]) -> IssueReport {
        let width = self.config.width.issue;
        let mut issued = 0;

        while issued < width && !self.control.halt_issued && self.control.pc < program.len() {
            let instr = &program[self.control.pc];

            if self.rob.is_full() {
                debug!(pc = self.control.pc, "stall: rob full");
                break;
            }

            if instr.opcode == Opcode::Halt {
                // HALT has nothing to compute and no reservation station:
                // its entry is ready the instant it's allocated, and it
                // simply waits its turn to retire at the ROB head.
                let Some(tag) = self.rob.allocate(instr, self.control.pc) else {
                    debug!(pc = self.control.pc, "stall: rob full");
                    break;
                };
                self.rob.complete_value(tag, 0);
                self.control.halt_issued = true;
                self.control.pc += 1;
                issued += 1;
                trace!(pc = self.control.pc - 1, "issued halt");
                break;
            }

            let Some(rs_idx) = self.rs_pool.find_free() else {
                debug!(pc = self.control.pc, "stall: reservation stations full");
                break;
            };

            let op_j = self.rename(instr.rs1);
            let op_k = match instr.opcode {
                Opcode::J | Opcode::Jal => Operand::Value(0),
                _ => self.rename(instr.rs2),
            };

            let Some(tag) = self.rob.allocate(instr, self.control.pc) else {
                debug!(pc = self.control.pc, "stall: rob full");
                break;
            };

            self.rs_pool.occupy(
                rs_idx,
                ReservationStation {
                    opcode: instr.opcode,
                    op_j,
                    op_k,
                    rob_dest: tag,
                    issue_pc: self.control.pc,
                    remaining: None,
                    imm: instr.imm,
                },
            );

            trace!(pc = self.control.pc, opcode = %instr.opcode, "issued");
            self.control.pc += 1;
            issued += 1;
        }

        IssueReport { issued }
    }

    /// Resolves a source register to either its architectural value or the
    /// tag of the in-flight instruction that will produce it, scanning the
    /// ROB newest-to-oldest so a register written by two live instructions
    /// renames against the younger one.
    fn rename(&self, reg: Option<usize>) -> Operand {
        let Some(reg) = reg else {
            return Operand::Value(0);
        };
        match self.rob.find_latest_producer(reg) {
            Some((_, Some(value))) => Operand::Value(value),
            Some((tag, None)) => Operand::Tag(tag),
            None => Operand::Value(self.registers.read(reg)),
        }
    }
}
