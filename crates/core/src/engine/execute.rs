//! Execute stage: advance every ready reservation station's countdown and
//! retire the ones that finish this cycle.

use tracing::{trace, warn};

use super::Engine;
use crate::isa::Opcode;

impl Engine {
    /// Advances every reservation station whose operands are both resolved.
    /// A station whose countdown reaches zero computes its result, writes
    /// it into its ROB entry, broadcasts it to every other station waiting
    /// on that tag, and frees itself.
    ///
    /// Returns `true` if any station was busy with both operands ready
    /// (used by the deadlock detector — the execute stage is "making
    /// progress" even on a multi-cycle `MUL`/`DIV` that won't complete this
    /// cycle).
    pub(super) fn execute(&mut self) -> bool {
        let mut any_active = false;

        for idx in self.rs_pool.busy_indices() {
            let Some(rs) = self.rs_pool.get(idx) else {
                continue;
            };
            // Every opcode — arithmetic included — requires both operands
            // resolved before its countdown starts. An arithmetic op that
            // only needs one operand to compute a (wrong) result is not
            // allowed to start early.
            if !(rs.op_j.is_ready() && rs.op_k.is_ready()) {
                continue;
            }
            any_active = true;

            let Some(rs_mut) = self.rs_pool.get_mut(idx) else {
                continue;
            };
            let remaining = rs_mut.remaining.unwrap_or(rs_mut.opcode.latency());
            let remaining = remaining.saturating_sub(1);
            rs_mut.remaining = Some(remaining);

            if remaining > 0 {
                trace!(idx, remaining, "executing");
                continue;
            }

            let Some(rs) = self.rs_pool.get(idx).cloned() else {
                continue;
            };
            let j = rs.op_j.value().unwrap_or(0);
            let k = rs.op_k.value().unwrap_or(0);

            match rs.opcode {
                Opcode::Add => self.rob.complete_value(rs.rob_dest, j.wrapping_add(k)),
                Opcode::Sub => self.rob.complete_value(rs.rob_dest, j.wrapping_sub(k)),
                Opcode::Mul => self.rob.complete_value(rs.rob_dest, j.wrapping_mul(k)),
                Opcode::Div => {
                    let result = if k == 0 {
                        warn!(idx, "division by zero: result forced to 0");
                        0
                    } else {
                        j.wrapping_div(k)
                    };
                    self.rob.complete_value(rs.rob_dest, result);
                }
                Opcode::Lw => {
                    let addr = j.wrapping_add(rs.imm);
                    self.rob.complete_value(rs.rob_dest, self.memory.read(addr));
                }
                Opcode::Sw => {
                    let addr = j.wrapping_add(rs.imm);
                    self.rob.complete_store(rs.rob_dest, addr, k);
                }
                Opcode::J => self.rob.complete_branch(rs.rob_dest, rs.target(), true),
                Opcode::Jal => {
                    // rd = pc + 1 (the index of the instruction after the
                    // jump), pc = target.
                    self.rob.complete_value(rs.rob_dest, rs.issue_pc as i64 + 1);
                    self.rob.complete_branch(rs.rob_dest, rs.target(), true);
                }
                Opcode::Beq => self.finish_branch(&rs, j == k),
                Opcode::Bne => self.finish_branch(&rs, j != k),
                Opcode::Blt => self.finish_branch(&rs, j < k),
                Opcode::Bgt => self.finish_branch(&rs, j > k),
                Opcode::Halt => unreachable!("HALT never occupies a reservation station"),
            }

            trace!(idx, opcode = %rs.opcode, "completed");
            self.rs_pool.broadcast(rs.rob_dest, self.rob.entry(rs.rob_dest).result);
            self.rs_pool.free(idx);
        }

        any_active
    }

    fn finish_branch(&mut self, rs: &crate::engine::rs::ReservationStation, taken: bool) {
        let target = if taken {
            rs.target()
        } else {
            rs.issue_pc + 1
        };
        self.rob.complete_branch(rs.rob_dest, target, taken);
    }
}

impl crate::engine::rs::ReservationStation {
    /// Interprets `imm` as an absolute target address for branch/jump
    /// opcodes.
    fn target(&self) -> usize {
        usize::try_from(self.imm).unwrap_or(0)
    }
}
