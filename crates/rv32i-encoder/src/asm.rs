//! Assembler for the supported RV32I subset.
//!
//! Accepts one instruction per line, `label:` definitions (alone or in
//! front of an instruction) and `#` comments. Branch and jump targets may
//! be numeric offsets or labels.

use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec::Vec,
};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, hex_digit1, space0, space1},
    combinator::{map, map_res, opt},
    error::{Error, ErrorKind},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::{encode::*, regs::Gpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mnemonic {
    Add,
    Sub,
    Sll,
    Slt,
    Srl,
    Or,
    And,
    Addi,
    Sltiu,
    Lw,
    Sw,
    Jalr,
    Beq,
    Bne,
    Jal,
    Nop,
    Halt,
}

impl Mnemonic {
    fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "add" => Mnemonic::Add,
            "sub" => Mnemonic::Sub,
            "sll" => Mnemonic::Sll,
            "slt" => Mnemonic::Slt,
            "srl" => Mnemonic::Srl,
            "or" => Mnemonic::Or,
            "and" => Mnemonic::And,
            "addi" => Mnemonic::Addi,
            "sltiu" => Mnemonic::Sltiu,
            "lw" => Mnemonic::Lw,
            "sw" => Mnemonic::Sw,
            "jalr" => Mnemonic::Jalr,
            "beq" => Mnemonic::Beq,
            "bne" => Mnemonic::Bne,
            "jal" => Mnemonic::Jal,
            "nop" => Mnemonic::Nop,
            "halt" => Mnemonic::Halt,
            _ => return None,
        };
        Some(op)
    }
}

/// Branch/jump target: label or PC-relative offset.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Label(String),
    Offset(i32),
}

/// A parsed instruction with operands, before label resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Statement {
    RegReg { op: Mnemonic, rd: Gpr, rs1: Gpr, rs2: Gpr },
    RegImm { op: Mnemonic, rd: Gpr, rs1: Gpr, imm: i32 },
    /// `op reg, offset(base)`, used by lw, sw and jalr.
    Memory { op: Mnemonic, reg: Gpr, base: Gpr, offset: i32 },
    Branch { op: Mnemonic, rs1: Gpr, rs2: Gpr, target: Target },
    Jump { rd: Gpr, target: Target },
    Bare(Mnemonic),
}

impl Statement {
    fn encode(&self, pc: u32, labels: &BTreeMap<String, u32>) -> Result<u32, String> {
        let word = match self {
            Statement::RegReg { op, rd, rs1, rs2 } => match op {
                Mnemonic::Add => add(*rd, *rs1, *rs2),
                Mnemonic::Sub => sub(*rd, *rs1, *rs2),
                Mnemonic::Sll => sll(*rd, *rs1, *rs2),
                Mnemonic::Slt => slt(*rd, *rs1, *rs2),
                Mnemonic::Srl => srl(*rd, *rs1, *rs2),
                Mnemonic::Or => or(*rd, *rs1, *rs2),
                Mnemonic::And => and(*rd, *rs1, *rs2),
                _ => unreachable!("not a register-register mnemonic: {:?}", op),
            },
            Statement::RegImm { op, rd, rs1, imm } => {
                check_range(*imm, -2048, 2047)?;
                match op {
                    Mnemonic::Addi => addi(*rd, *rs1, *imm),
                    Mnemonic::Sltiu => sltiu(*rd, *rs1, *imm),
                    _ => unreachable!("not a register-immediate mnemonic: {:?}", op),
                }
            }
            Statement::Memory {
                op,
                reg,
                base,
                offset,
            } => {
                check_range(*offset, -2048, 2047)?;
                match op {
                    Mnemonic::Lw => lw(*reg, *base, *offset),
                    Mnemonic::Sw => sw(*base, *reg, *offset),
                    Mnemonic::Jalr => jalr(*reg, *base, *offset),
                    _ => unreachable!("not a memory-operand mnemonic: {:?}", op),
                }
            }
            Statement::Branch {
                op,
                rs1,
                rs2,
                target,
            } => {
                let offset = resolve_target(target, pc, labels)?;
                check_range(offset, -4096, 4094)?;
                check_even(offset)?;
                match op {
                    Mnemonic::Beq => beq(*rs1, *rs2, offset),
                    Mnemonic::Bne => bne(*rs1, *rs2, offset),
                    _ => unreachable!("not a branch mnemonic: {:?}", op),
                }
            }
            Statement::Jump { rd, target } => {
                let offset = resolve_target(target, pc, labels)?;
                check_range(offset, -(1 << 20), (1 << 20) - 2)?;
                check_even(offset)?;
                jal(*rd, offset)
            }
            Statement::Bare(Mnemonic::Nop) => addi(Gpr::ZERO, Gpr::ZERO, 0),
            Statement::Bare(Mnemonic::Halt) => halt(),
            Statement::Bare(op) => unreachable!("mnemonic requires operands: {:?}", op),
        };
        Ok(word)
    }
}

fn check_range(value: i32, min: i32, max: i32) -> Result<(), String> {
    if value < min || value > max {
        Err(format!("Immediate {} out of range [{}, {}]", value, min, max))
    } else {
        Ok(())
    }
}

/// Branch and jump offsets have no bit 0.
fn check_even(offset: i32) -> Result<(), String> {
    if offset % 2 != 0 {
        Err(format!("Offset {} is not a multiple of 2", offset))
    } else {
        Ok(())
    }
}

fn resolve_target(target: &Target, pc: u32, labels: &BTreeMap<String, u32>) -> Result<i32, String> {
    match target {
        Target::Offset(offset) => Ok(*offset),
        Target::Label(name) => {
            let addr = labels
                .get(name)
                .ok_or_else(|| format!("Unknown label: {}", name))?;
            Ok((*addr as i32).wrapping_sub(pc as i32))
        }
    }
}

/// Parse a register name.
fn parse_register(input: &str) -> IResult<&str, Gpr> {
    map_res(
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        Gpr::from_name,
    )(input)
}

/// Parse an integer immediate (decimal or hex, optionally negative).
/// Values outside the `i32` range are rejected.
fn parse_immediate(input: &str) -> IResult<&str, i32> {
    let (rest, negative) = map(opt(char('-')), |sign| sign.is_some())(input)?;
    let (rest, magnitude) = alt((
        map_res(preceded(alt((tag("0x"), tag("0X"))), hex_digit1), |s: &str| {
            u32::from_str_radix(s, 16)
        }),
        map_res(digit1, |s: &str| s.parse::<u32>()),
    ))(rest)?;
    let value = if negative {
        -i64::from(magnitude)
    } else {
        i64::from(magnitude)
    };
    match i32::try_from(value) {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::MapRes))),
    }
}

/// Parse a label name.
fn parse_label(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.')(input)
}

fn parse_target(input: &str) -> IResult<&str, Target> {
    alt((
        map(parse_immediate, Target::Offset),
        map(parse_label, |name| Target::Label(name.to_string())),
    ))(input)
}

/// Operand separator: a comma with optional surrounding blanks.
fn comma(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(input)
}

fn reg_reg_reg(input: &str) -> IResult<&str, (Gpr, Gpr, Gpr)> {
    tuple((
        preceded(space1, parse_register),
        preceded(comma, parse_register),
        preceded(comma, parse_register),
    ))(input)
}

fn reg_reg_imm(input: &str) -> IResult<&str, (Gpr, Gpr, i32)> {
    tuple((
        preceded(space1, parse_register),
        preceded(comma, parse_register),
        preceded(comma, parse_immediate),
    ))(input)
}

/// `reg, offset(base)`; a missing offset means 0.
fn reg_mem(input: &str) -> IResult<&str, (Gpr, i32, Gpr)> {
    let (input, reg) = preceded(space1, parse_register)(input)?;
    let (input, (offset, base)) = preceded(
        comma,
        pair(
            opt(parse_immediate),
            delimited(
                terminated(char('('), space0),
                parse_register,
                preceded(space0, char(')')),
            ),
        ),
    )(input)?;
    Ok((input, (reg, offset.unwrap_or(0), base)))
}

fn reg_reg_target(input: &str) -> IResult<&str, (Gpr, Gpr, Target)> {
    tuple((
        preceded(space1, parse_register),
        preceded(comma, parse_register),
        preceded(comma, parse_target),
    ))(input)
}

fn reg_target(input: &str) -> IResult<&str, (Gpr, Target)> {
    pair(
        preceded(space1, parse_register),
        preceded(comma, parse_target),
    )(input)
}

fn parse_statement(input: &str) -> IResult<&str, Statement> {
    let (rest, name) = take_while1(|c: char| c.is_ascii_alphabetic())(input)?;
    let op = Mnemonic::from_name(name).ok_or_else(|| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))
    })?;

    match op {
        Mnemonic::Add
        | Mnemonic::Sub
        | Mnemonic::Sll
        | Mnemonic::Slt
        | Mnemonic::Srl
        | Mnemonic::Or
        | Mnemonic::And => map(reg_reg_reg, move |(rd, rs1, rs2)| Statement::RegReg {
            op,
            rd,
            rs1,
            rs2,
        })(rest),
        Mnemonic::Addi | Mnemonic::Sltiu => {
            map(reg_reg_imm, move |(rd, rs1, imm)| Statement::RegImm {
                op,
                rd,
                rs1,
                imm,
            })(rest)
        }
        Mnemonic::Lw | Mnemonic::Sw | Mnemonic::Jalr => {
            map(reg_mem, move |(reg, offset, base)| Statement::Memory {
                op,
                reg,
                base,
                offset,
            })(rest)
        }
        Mnemonic::Beq | Mnemonic::Bne => {
            map(reg_reg_target, move |(rs1, rs2, target)| Statement::Branch {
                op,
                rs1,
                rs2,
                target,
            })(rest)
        }
        Mnemonic::Jal => map(reg_target, |(rd, target)| Statement::Jump { rd, target })(rest),
        Mnemonic::Nop | Mnemonic::Halt => Ok((rest, Statement::Bare(op))),
    }
}

/// Parse one source line (comments already stripped) into an optional
/// label definition and an optional instruction.
fn parse_line(input: &str) -> IResult<&str, (Option<&str>, Option<Statement>)> {
    let (input, _) = space0(input)?;
    let (input, label) = opt(terminated(parse_label, preceded(space0, char(':'))))(input)?;
    let (input, _) = space0(input)?;
    let (input, statement) = opt(parse_statement)(input)?;
    let (input, _) = space0(input)?;
    Ok((input, (label, statement)))
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Assemble a single instruction located at address 0.
///
/// Branch and jump targets must be numeric offsets.
pub fn assemble_instruction(asm: &str) -> Result<u32, String> {
    let source = strip_comment(asm).trim();
    match parse_statement(source) {
        Ok((rest, statement)) if rest.trim().is_empty() => statement.encode(0, &BTreeMap::new()),
        Ok((rest, _)) => Err(format!("Unexpected text after instruction: '{}'", rest.trim())),
        Err(e) => Err(format!("Parse error in '{}': {:?}", source, e)),
    }
}

/// Assemble a multi-line program into instruction words.
///
/// Labels defined in the source are collected in a first pass and can be
/// referenced before their definition. `labels` supplies extra, predefined
/// label addresses.
pub fn assemble_code(asm: &str, labels: Option<&BTreeMap<String, u32>>) -> Result<Vec<u32>, String> {
    let mut label_map: BTreeMap<String, u32> = labels.cloned().unwrap_or_default();
    let mut statements: Vec<(usize, u32, Statement)> = Vec::new();
    let mut addr = 0u32;

    for (idx, line) in asm.lines().enumerate() {
        let line_no = idx + 1;
        let source = strip_comment(line);
        if source.trim().is_empty() {
            continue;
        }

        let (rest, (label, statement)) = parse_line(source)
            .map_err(|e| format!("Line {}: parse error: {:?}", line_no, e))?;
        if !rest.is_empty() {
            return Err(format!("Line {}: unexpected text '{}'", line_no, rest.trim()));
        }

        if let Some(label) = label {
            if label_map.insert(label.to_string(), addr).is_some() {
                return Err(format!("Line {}: duplicate label '{}'", line_no, label));
            }
        }
        if let Some(statement) = statement {
            statements.push((line_no, addr, statement));
            addr += 4;
        }
    }

    statements
        .iter()
        .map(|(line_no, pc, statement)| {
            statement
                .encode(*pc, &label_map)
                .map_err(|e| format!("Line {} (0x{:04x}): {}", line_no, pc, e))
        })
        .collect()
}

/// Render instruction words in the simulator's input format: one line of
/// 32 binary digits per word, most significant bit first.
pub fn to_binary_text(words: &[u32]) -> String {
    let mut text = String::with_capacity(words.len() * 33);
    for word in words {
        text.push_str(&format!("{:032b}\n", word));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_parse_immediate() {
        assert_eq!(parse_immediate("42"), Ok(("", 42)));
        assert_eq!(parse_immediate("-8"), Ok(("", -8)));
        assert_eq!(parse_immediate("0x10)"), Ok((")", 16)));
        assert_eq!(parse_immediate("-0x800"), Ok(("", -2048)));
    }

    #[test]
    fn test_parse_register() {
        assert_eq!(parse_register("a0, a1"), Ok((", a1", Gpr::A0)));
        assert_eq!(parse_register("x31"), Ok(("", Gpr::T6)));
        assert!(parse_register("q9").is_err());
    }

    #[test]
    fn test_assemble_r_type() {
        assert_eq!(
            assemble_instruction("add a0, a1, a2"),
            Ok(add(Gpr::A0, Gpr::A1, Gpr::A2))
        );
        assert_eq!(
            assemble_instruction("srl  t0 ,t1,  t2"),
            Ok(srl(Gpr::T0, Gpr::T1, Gpr::T2))
        );
    }

    #[test]
    fn test_assemble_addi() {
        assert_eq!(assemble_instruction("addi x1, x0, 5"), Ok(0x0050_0093));
        assert_eq!(
            assemble_instruction("sltiu a0, a1, -1"),
            Ok(sltiu(Gpr::A0, Gpr::A1, -1))
        );
    }

    #[test]
    fn test_assemble_memory_operands() {
        assert_eq!(assemble_instruction("lw a0, 4(sp)"), Ok(lw(Gpr::A0, Gpr::SP, 4)));
        assert_eq!(assemble_instruction("sw a0, -4(sp)"), Ok(sw(Gpr::SP, Gpr::A0, -4)));
        assert_eq!(assemble_instruction("jalr zero, (ra)"), Ok(jalr(Gpr::ZERO, Gpr::RA, 0)));
    }

    #[test]
    fn test_assemble_pseudo() {
        assert_eq!(assemble_instruction("halt"), Ok(HALT_WORD));
        assert_eq!(assemble_instruction("nop"), Ok(0x0000_0013));
    }

    #[test]
    fn test_assemble_rejects_out_of_range() {
        assert!(assemble_instruction("addi a0, a0, 4096").is_err());
        assert!(assemble_instruction("addi a0, a0, 1 extra").is_err());
        assert!(assemble_instruction("mul a0, a1, a2").is_err());
        assert!(assemble_instruction("addi a0, zero, 4294967295").is_err());
        assert!(assemble_instruction("addi a0, zero, 0xffffffff").is_err());
    }

    #[test]
    fn test_parse_immediate_i32_bounds() {
        assert_eq!(parse_immediate("2147483647"), Ok(("", i32::MAX)));
        assert_eq!(parse_immediate("-2147483648"), Ok(("", i32::MIN)));
        assert!(parse_immediate("2147483648").is_err());
        assert!(parse_immediate("4294967295").is_err());
    }

    #[test]
    fn test_assemble_rejects_odd_offsets() {
        assert!(assemble_instruction("beq a0, a1, 3").is_err());
        assert!(assemble_instruction("bne a0, a1, -7").is_err());
        assert!(assemble_instruction("jal ra, 5").is_err());
        assert_eq!(
            assemble_instruction("beq a0, a1, 2"),
            Ok(beq(Gpr::A0, Gpr::A1, 2))
        );
    }

    #[test]
    fn test_assemble_code_with_labels() {
        let code = assemble_code(
            "
            # count down from 3
                addi a0, zero, 3
            loop:
                addi a0, a0, -1
                bne a0, zero, loop
                jal zero, done
                nop
            done: halt
            ",
            None,
        )
        .unwrap();

        assert_eq!(
            code,
            vec![
                addi(Gpr::A0, Gpr::ZERO, 3),
                addi(Gpr::A0, Gpr::A0, -1),
                bne(Gpr::A0, Gpr::ZERO, -4),
                jal(Gpr::ZERO, 8),
                addi(Gpr::ZERO, Gpr::ZERO, 0),
                HALT_WORD,
            ]
        );
    }

    #[test]
    fn test_assemble_code_external_labels() {
        let mut labels = BTreeMap::new();
        labels.insert("far".to_string(), 0x40);
        let code = assemble_code("jal ra, far", Some(&labels)).unwrap();
        assert_eq!(code, vec![jal(Gpr::RA, 0x40)]);
    }

    #[test]
    fn test_assemble_code_unknown_label() {
        let err = assemble_code("beq a0, a1, nowhere", None).unwrap_err();
        assert!(err.contains("Unknown label: nowhere"), "{}", err);
    }

    #[test]
    fn test_assemble_code_duplicate_label() {
        let err = assemble_code("a:\na: nop", None).unwrap_err();
        assert!(err.contains("duplicate label"), "{}", err);
    }

    #[test]
    fn test_to_binary_text() {
        let text = to_binary_text(&[0x0050_0093, HALT_WORD]);
        assert_eq!(
            text,
            "00000000010100000000000010010011\n00000000000000000000000001100011\n"
        );
    }
}
