//! Decoded instruction records.

use std::fmt;

use super::opcode::Opcode;

/// A fully decoded instruction, as it sits in instruction memory.
///
/// Operand fields are populated per the opcode's shape (see the assembler's
/// mnemonic table): arithmetic ops use `rd`/`rs1`/`rs2`, `Lw`/`Sw` use
/// `rs1`/`imm` for the effective address plus `rd` (load destination) or
/// `rs2` (store source), and branches use `rs1`/`rs2`/`imm` (or just `imm`
/// for `J`/`Jal`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Destination register, if this opcode writes one.
    pub rd: Option<usize>,
    /// First source register, if this opcode reads one.
    pub rs1: Option<usize>,
    /// Second source register, if this opcode reads one.
    pub rs2: Option<usize>,
    /// Immediate: store/load offset, or branch/jump target address.
    pub imm: i64,
    /// Source-program label this instruction was defined at, if any.
    /// Carried only for diagnostics (trace output, error messages).
    pub label: Option<String>,
}

impl Instruction {
    /// A bare `HALT`, with no operands.
    #[must_use]
    pub fn halt() -> Self {
        Self {
            opcode: Opcode::Halt,
            rd: None,
            rs1: None,
            rs2: None,
            imm: 0,
            label: None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => write!(
                f,
                "{} R{}, R{}, R{}",
                self.opcode,
                self.rd.unwrap_or(0),
                self.rs1.unwrap_or(0),
                self.rs2.unwrap_or(0)
            ),
            Opcode::Lw => write!(
                f,
                "LW R{}, {}(R{})",
                self.rd.unwrap_or(0),
                self.imm,
                self.rs1.unwrap_or(0)
            ),
            Opcode::Sw => write!(
                f,
                "SW R{}, {}(R{})",
                self.rs2.unwrap_or(0),
                self.imm,
                self.rs1.unwrap_or(0)
            ),
            Opcode::J => write!(f, "J {}", self.imm),
            Opcode::Jal => write!(f, "JAL R{}, {}", self.rd.unwrap_or(0), self.imm),
            Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt => write!(
                f,
                "{} R{}, R{}, {}",
                self.opcode,
                self.rs1.unwrap_or(0),
                self.rs2.unwrap_or(0),
                self.imm
            ),
            Opcode::Halt => write!(f, "HALT"),
        }
    }
}
