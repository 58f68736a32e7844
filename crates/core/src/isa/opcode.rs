//! The instruction set this core executes.
//!
//! A small MIPS-like integer ISA: three-operand arithmetic, a single
//! load/store pair against a flat data memory, unconditional and
//! conditional branches, and a halt.

use std::fmt;

/// One of the operations the functional units know how to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `rd = rs1 + rs2`
    Add,
    /// `rd = rs1 - rs2`
    Sub,
    /// `rd = rs1 * rs2`
    Mul,
    /// `rd = rs1 / rs2` (division by zero yields 0, never traps)
    Div,
    /// `rd = mem[rs1 + imm]`
    Lw,
    /// `mem[rs1 + imm] = rs2`
    Sw,
    /// `pc = imm` unconditionally
    J,
    /// `rd = pc + 1; pc = imm`
    Jal,
    /// `pc = imm` if `rs1 == rs2`
    Beq,
    /// `pc = imm` if `rs1 != rs2`
    Bne,
    /// `pc = imm` if `rs1 < rs2`
    Blt,
    /// `pc = imm` if `rs1 > rs2`
    Bgt,
    /// Stop issuing further instructions.
    Halt,
}

impl Opcode {
    /// Number of execute-stage cycles this opcode occupies its reservation
    /// station once both operands are ready.
    #[must_use]
    pub fn latency(self) -> u8 {
        match self {
            Opcode::Mul | Opcode::Div => 2,
            _ => 1,
        }
    }

    /// True for the four comparison branches (not `J`/`Jal`, which are
    /// unconditional and need no comparison operands).
    #[must_use]
    pub fn is_conditional_branch(self) -> bool {
        matches!(self, Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt)
    }

    /// True for any instruction that redirects the PC when it commits.
    #[must_use]
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Opcode::J | Opcode::Jal | Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt
        )
    }

    /// The mnemonic used by the assembler and the trace printer.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Lw => "LW",
            Opcode::Sw => "SW",
            Opcode::J => "J",
            Opcode::Jal => "JAL",
            Opcode::Beq => "BEQ",
            Opcode::Bne => "BNE",
            Opcode::Blt => "BLT",
            Opcode::Bgt => "BGT",
            Opcode::Halt => "HALT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
