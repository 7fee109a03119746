//! Instruction encoding for the supported RV32I subset.
//!
//! Each function returns the 32-bit machine word for one instruction.
//! Immediates are truncated to their field width; callers are expected
//! to pass in-range values.

use crate::regs::Gpr;

/// Opcode values of the supported formats.
pub mod opcode {
    pub const OP: u8 = 0x33;
    pub const OP_IMM: u8 = 0x13;
    pub const LOAD: u8 = 0x03;
    pub const STORE: u8 = 0x23;
    pub const BRANCH: u8 = 0x63;
    pub const JALR: u8 = 0x67;
    pub const JAL: u8 = 0x6f;
}

/// The program terminator: `beq zero, zero, 0`.
pub const HALT_WORD: u32 = 0x0000_0063;

/// Encode an R-type instruction.
///
/// Format: `funct7 rs2 rs1 funct3 rd opcode`
fn encode_r(opcode: u8, rd: Gpr, rs1: Gpr, rs2: Gpr, funct3: u8, funct7: u8) -> u32 {
    let opcode = opcode as u32;
    let rd = rd.num() as u32;
    let funct3 = funct3 as u32;
    let rs1 = rs1.num() as u32;
    let rs2 = rs2.num() as u32;
    let funct7 = funct7 as u32;

    opcode | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (rs2 << 20) | (funct7 << 25)
}

/// Encode an I-type instruction.
///
/// Format: `imm[11:0] rs1 funct3 rd opcode`
fn encode_i(opcode: u8, rd: Gpr, rs1: Gpr, imm: i32, funct3: u8) -> u32 {
    let opcode = opcode as u32;
    let rd = rd.num() as u32;
    let funct3 = funct3 as u32;
    let rs1 = rs1.num() as u32;
    let imm = (imm as u32) & 0xfff;

    opcode | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (imm << 20)
}

/// Encode an S-type instruction.
///
/// Format: `imm[11:5] rs2 rs1 funct3 imm[4:0] opcode`
fn encode_s(opcode: u8, rs1: Gpr, rs2: Gpr, imm: i32, funct3: u8) -> u32 {
    let opcode = opcode as u32;
    let funct3 = funct3 as u32;
    let rs1 = rs1.num() as u32;
    let rs2 = rs2.num() as u32;
    let imm = (imm as u32) & 0xfff;

    let imm_lo = imm & 0x1f;
    let imm_hi = (imm >> 5) & 0x7f;

    opcode | (imm_lo << 7) | (funct3 << 12) | (rs1 << 15) | (rs2 << 20) | (imm_hi << 25)
}

/// Encode a B-type instruction.
///
/// Format: `imm[12|10:5] rs2 rs1 funct3 imm[4:1|11] opcode`
fn encode_b(opcode: u8, rs1: Gpr, rs2: Gpr, imm: i32, funct3: u8) -> u32 {
    let opcode = opcode as u32;
    let funct3 = funct3 as u32;
    let rs1 = rs1.num() as u32;
    let rs2 = rs2.num() as u32;
    let imm = imm as u32;

    let imm_12 = (imm >> 12) & 0x1;
    let imm_10_5 = (imm >> 5) & 0x3f;
    let imm_4_1 = (imm >> 1) & 0xf;
    let imm_11 = (imm >> 11) & 0x1;

    opcode
        | (imm_11 << 7)
        | (imm_4_1 << 8)
        | (funct3 << 12)
        | (rs1 << 15)
        | (rs2 << 20)
        | (imm_10_5 << 25)
        | (imm_12 << 31)
}

/// Encode a J-type instruction.
///
/// Format: `imm[20|10:1|11|19:12] rd opcode`
fn encode_j(opcode: u8, rd: Gpr, imm: i32) -> u32 {
    let opcode = opcode as u32;
    let rd = rd.num() as u32;
    let imm = imm as u32;

    let imm_20 = (imm >> 20) & 0x1;
    let imm_10_1 = (imm >> 1) & 0x3ff;
    let imm_11 = (imm >> 11) & 0x1;
    let imm_19_12 = (imm >> 12) & 0xff;

    opcode | (rd << 7) | (imm_19_12 << 12) | (imm_11 << 20) | (imm_10_1 << 21) | (imm_20 << 31)
}

// Register-register

/// ADD: rd = rs1 + rs2
pub fn add(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(opcode::OP, rd, rs1, rs2, 0x0, 0x00)
}

/// SUB: rd = rs1 - rs2
pub fn sub(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(opcode::OP, rd, rs1, rs2, 0x0, 0x20)
}

/// SLL: rd = rs1 << rs2[4:0]
pub fn sll(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(opcode::OP, rd, rs1, rs2, 0x1, 0x00)
}

/// SLT: rd = (rs1 < rs2) ? 1 : 0 (signed)
pub fn slt(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(opcode::OP, rd, rs1, rs2, 0x2, 0x00)
}

/// SRL: rd = rs1 >> rs2[4:0] (logical)
pub fn srl(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(opcode::OP, rd, rs1, rs2, 0x5, 0x00)
}

/// OR: rd = rs1 | rs2
pub fn or(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(opcode::OP, rd, rs1, rs2, 0x6, 0x00)
}

/// AND: rd = rs1 & rs2
pub fn and(rd: Gpr, rs1: Gpr, rs2: Gpr) -> u32 {
    encode_r(opcode::OP, rd, rs1, rs2, 0x7, 0x00)
}

// Register-immediate

/// ADDI: rd = rs1 + imm
pub fn addi(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(opcode::OP_IMM, rd, rs1, imm, 0x0)
}

/// SLTIU: rd = (rs1 < imm) ? 1 : 0 (unsigned)
pub fn sltiu(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(opcode::OP_IMM, rd, rs1, imm, 0x3)
}

// Load/store

/// LW: rd = mem[rs1 + imm]
pub fn lw(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(opcode::LOAD, rd, rs1, imm, 0x2)
}

/// SW: mem[rs1 + imm] = rs2
pub fn sw(rs1: Gpr, rs2: Gpr, imm: i32) -> u32 {
    encode_s(opcode::STORE, rs1, rs2, imm, 0x2)
}

// Control flow

/// BEQ: if rs1 == rs2, pc = pc + imm
pub fn beq(rs1: Gpr, rs2: Gpr, imm: i32) -> u32 {
    encode_b(opcode::BRANCH, rs1, rs2, imm, 0x0)
}

/// BNE: if rs1 != rs2, pc = pc + imm
pub fn bne(rs1: Gpr, rs2: Gpr, imm: i32) -> u32 {
    encode_b(opcode::BRANCH, rs1, rs2, imm, 0x1)
}

/// JAL: rd = pc + 4; pc = pc + imm
pub fn jal(rd: Gpr, imm: i32) -> u32 {
    encode_j(opcode::JAL, rd, imm)
}

/// JALR: rd = pc + 4; pc = (rs1 + imm) & !1
pub fn jalr(rd: Gpr, rs1: Gpr, imm: i32) -> u32 {
    encode_i(opcode::JALR, rd, rs1, imm, 0x0)
}

/// The halt sentinel.
pub fn halt() -> u32 {
    HALT_WORD
}
