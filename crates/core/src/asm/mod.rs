//! Assembler: turns program text into the `Instruction` stream the engine
//! consumes.
//!
//! Two passes, mirroring the label-resolution strategy of the original
//! simulator this core's instruction set is modeled on: the first pass
//! records the program-counter address of every `label:` line, and the
//! second pass decodes each instruction, resolving any label operand
//! against that table. A label used before it's defined (a forward branch)
//! resolves correctly because the whole table is built before decoding
//! starts.

use crate::error::SimError;
use crate::isa::{Instruction, Opcode};

/// Parses assembly source into a decoded instruction stream.
///
/// Blank lines and lines beginning with `;` or `#` are ignored. A line may
/// optionally start with a `label:` definition before its instruction.
/// Operand lists accept either whitespace or commas as separators.
pub fn parse(source: &str) -> Result<Vec<Instruction>, SimError> {
    let lines: Vec<&str> = source.lines().collect();
    let labels = collect_labels(&lines)?;

    let mut program = Vec::new();
    for (line_no, raw) in lines.iter().enumerate() {
        let (_, body) = strip_label(raw);
        let body = strip_comment(body).trim();
        if body.is_empty() {
            continue;
        }
        program.push(decode_line(line_no + 1, body, &labels)?);
    }
    Ok(program)
}

fn collect_labels(lines: &[&str]) -> Result<std::collections::HashMap<String, usize>, SimError> {
    let mut labels = std::collections::HashMap::new();
    let mut pc = 0;
    for raw in lines {
        let (label, body) = strip_label(raw);
        if let Some(name) = label {
            let _ = labels.insert(name, pc);
        }
        if !strip_comment(body).trim().is_empty() {
            pc += 1;
        }
    }
    Ok(labels)
}

/// Splits a line into an optional leading `label:` and the remainder.
fn strip_label(line: &str) -> (Option<String>, &str) {
    if let Some(colon) = line.find(':') {
        let (head, tail) = line.split_at(colon);
        let head = head.trim();
        if !head.is_empty() && head.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return (Some(head.to_string()), &tail[1..]);
        }
    }
    (None, line)
}

fn strip_comment(line: &str) -> &str {
    let cut = line.find(';').or_else(|| line.find('#'));
    match cut {
        Some(i) => &line[..i],
        None => line,
    }
}

fn decode_line(
    line_no: usize,
    body: &str,
    labels: &std::collections::HashMap<String, usize>,
) -> Result<Instruction, SimError> {
    let mut parts = body.split_whitespace();
    let mnemonic = parts.next().ok_or_else(|| SimError::Decode {
        line: line_no,
        message: "empty instruction".to_string(),
    })?;
    let rest: String = parts.collect::<Vec<_>>().join(" ");
    let operands: Vec<&str> = rest
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let err = |message: String| SimError::Decode {
        line: line_no,
        message,
    };

    match mnemonic.to_ascii_uppercase().as_str() {
        "ADD" | "SUB" | "MUL" | "DIV" => {
            let opcode = match mnemonic.to_ascii_uppercase().as_str() {
                "ADD" => Opcode::Add,
                "SUB" => Opcode::Sub,
                "MUL" => Opcode::Mul,
                _ => Opcode::Div,
            };
            let [rd, rs1, rs2] = operands_n(&operands, line_no)?;
            Ok(Instruction {
                opcode,
                rd: Some(reg(rd, line_no)?),
                rs1: Some(reg(rs1, line_no)?),
                rs2: Some(reg(rs2, line_no)?),
                imm: 0,
                label: None,
            })
        }
        "LW" | "LD" => {
            let (rd, imm, base) = mem_operand(&operands, line_no)?;
            Ok(Instruction {
                opcode: Opcode::Lw,
                rd: Some(rd),
                rs1: Some(base),
                rs2: None,
                imm,
                label: None,
            })
        }
        "SW" => {
            let (rs2, imm, base) = mem_operand(&operands, line_no)?;
            Ok(Instruction {
                opcode: Opcode::Sw,
                rd: None,
                rs1: Some(base),
                rs2: Some(rs2),
                imm,
                label: None,
            })
        }
        "J" => {
            let [target] = operands_n(&operands, line_no)?;
            Ok(Instruction {
                opcode: Opcode::J,
                rd: None,
                rs1: None,
                rs2: None,
                imm: target_addr(target, labels, line_no)?,
                label: None,
            })
        }
        "JAL" => {
            let [rd, target] = operands_n(&operands, line_no)?;
            Ok(Instruction {
                opcode: Opcode::Jal,
                rd: Some(reg(rd, line_no)?),
                rs1: None,
                rs2: None,
                imm: target_addr(target, labels, line_no)?,
                label: None,
            })
        }
        "BEQ" | "BNE" | "BLT" | "BGT" => {
            let opcode = match mnemonic.to_ascii_uppercase().as_str() {
                "BEQ" => Opcode::Beq,
                "BNE" => Opcode::Bne,
                "BLT" => Opcode::Blt,
                _ => Opcode::Bgt,
            };
            let [rs1, rs2, target] = operands_n(&operands, line_no)?;
            Ok(Instruction {
                opcode,
                rd: None,
                rs1: Some(reg(rs1, line_no)?),
                rs2: Some(reg(rs2, line_no)?),
                imm: target_addr(target, labels, line_no)?,
                label: None,
            })
        }
        "HALT" => Ok(Instruction::halt()),
        other => Err(err(format!("unknown mnemonic {other}"))),
    }
}

fn operands_n<'a, const N: usize>(
    operands: &[&'a str],
    line_no: usize,
) -> Result<[&'a str; N], SimError> {
    <[&str; N]>::try_from(operands).map_err(|_| SimError::Decode {
        line: line_no,
        message: format!("expected {N} operand(s), found {}", operands.len()),
    })
}

fn reg(token: &str, line_no: usize) -> Result<usize, SimError> {
    let digits = token.trim_start_matches(['R', 'r']);
    digits.parse().map_err(|_| SimError::Decode {
        line: line_no,
        message: format!("invalid register {token}"),
    })
}

fn target_addr(
    token: &str,
    labels: &std::collections::HashMap<String, usize>,
    line_no: usize,
) -> Result<i64, SimError> {
    if let Ok(n) = token.parse::<i64>() {
        return Ok(n);
    }
    labels
        .get(token)
        .map(|&pc| pc as i64)
        .ok_or_else(|| SimError::Decode {
            line: line_no,
            message: format!("undefined label {token}"),
        })
}

/// Parses `Rd, imm(Rbase)` into `(rd, imm, base)`.
fn mem_operand(operands: &[&str], line_no: usize) -> Result<(usize, i64, usize), SimError> {
    let [first, second] = operands_n(operands, line_no)?;
    let rd = reg(first, line_no)?;
    let open = second.find('(').ok_or_else(|| SimError::Decode {
        line: line_no,
        message: format!("expected imm(Rbase), found {second}"),
    })?;
    let close = second.find(')').ok_or_else(|| SimError::Decode {
        line: line_no,
        message: format!("expected imm(Rbase), found {second}"),
    })?;
    let imm: i64 = second[..open].trim().parse().map_err(|_| SimError::Decode {
        line: line_no,
        message: format!("invalid offset in {second}"),
    })?;
    let base = reg(&second[open + 1..close], line_no)?;
    Ok((rd, imm, base))
}
