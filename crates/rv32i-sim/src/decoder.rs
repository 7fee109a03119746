//! Instruction decoder for the supported RV32I subset.
//!
//! Decoding never fails: any encoding outside the supported set becomes
//! [`DecodedInstruction::Unsupported`], which executes as a no-op.

use core::fmt;

use rv32i_encoder::{opcode, Gpr};

/// Raw fields of an instruction word, before format-specific interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionFields {
    /// bits [6:0]
    pub opcode: u8,
    /// bits [11:7]
    pub rd: Gpr,
    /// bits [14:12]
    pub funct3: u8,
    /// bits [19:15]
    pub rs1: Gpr,
    /// bits [24:20]
    pub rs2: Gpr,
    /// bits [31:25]
    pub funct7: u8,
}

impl InstructionFields {
    pub fn extract(word: u32) -> Self {
        Self {
            opcode: (word & 0x7f) as u8,
            rd: Gpr::from_field(word >> 7),
            funct3: ((word >> 12) & 0x7) as u8,
            rs1: Gpr::from_field(word >> 15),
            rs2: Gpr::from_field(word >> 20),
            funct7: ((word >> 25) & 0x7f) as u8,
        }
    }
}

/// Interpret the low `width` bits of `value` as a two's-complement number.
pub fn sign_extend(value: u32, width: u32) -> i32 {
    debug_assert!(width > 0 && width < 32);
    let value = value & ((1 << width) - 1);
    if value & (1 << (width - 1)) != 0 {
        value as i32 - (1i32 << width)
    } else {
        value as i32
    }
}

/// I-type immediate: bits [31:20].
pub fn imm_i(word: u32) -> i32 {
    sign_extend(word >> 20, 12)
}

/// S-type immediate: bits [31:25] and [11:7].
pub fn imm_s(word: u32) -> i32 {
    let hi = (word >> 25) & 0x7f;
    let lo = (word >> 7) & 0x1f;
    sign_extend((hi << 5) | lo, 12)
}

/// B-type immediate: 13 bits, always even.
pub fn imm_b(word: u32) -> i32 {
    let imm_12 = (word >> 31) & 0x1;
    let imm_11 = (word >> 7) & 0x1;
    let imm_10_5 = (word >> 25) & 0x3f;
    let imm_4_1 = (word >> 8) & 0xf;
    sign_extend(
        (imm_12 << 12) | (imm_11 << 11) | (imm_10_5 << 5) | (imm_4_1 << 1),
        13,
    )
}

/// J-type immediate: 21 bits, always even.
pub fn imm_j(word: u32) -> i32 {
    let imm_20 = (word >> 31) & 0x1;
    let imm_19_12 = (word >> 12) & 0xff;
    let imm_11 = (word >> 20) & 0x1;
    let imm_10_1 = (word >> 21) & 0x3ff;
    sign_extend(
        (imm_20 << 20) | (imm_19_12 << 12) | (imm_11 << 11) | (imm_10_1 << 1),
        21,
    )
}

/// Register-register operations (opcode 0110011).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ROp {
    Add,
    Sub,
    Sll,
    Slt,
    Srl,
    Or,
    And,
}

/// I-format operations: immediate arithmetic, load and `jalr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOp {
    Addi,
    Sltiu,
    Lw,
    Jalr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SOp {
    Sw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BOp {
    Beq,
    Bne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JOp {
    Jal,
}

impl ROp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ROp::Add => "add",
            ROp::Sub => "sub",
            ROp::Sll => "sll",
            ROp::Slt => "slt",
            ROp::Srl => "srl",
            ROp::Or => "or",
            ROp::And => "and",
        }
    }
}

impl IOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            IOp::Addi => "addi",
            IOp::Sltiu => "sltiu",
            IOp::Lw => "lw",
            IOp::Jalr => "jalr",
        }
    }
}

impl BOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BOp::Beq => "beq",
            BOp::Bne => "bne",
        }
    }
}

/// Decoded instruction, one variant per encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedInstruction {
    R { op: ROp, rd: Gpr, rs1: Gpr, rs2: Gpr },
    I { op: IOp, rd: Gpr, rs1: Gpr, imm: i32 },
    S { op: SOp, rs1: Gpr, rs2: Gpr, imm: i32 },
    B { op: BOp, rs1: Gpr, rs2: Gpr, imm: i32 },
    J { op: JOp, rd: Gpr, imm: i32 },
    /// Anything outside the supported set.
    Unsupported { word: u32 },
}

/// Decode a 32-bit instruction word.
pub fn decode_instruction(word: u32) -> DecodedInstruction {
    let InstructionFields {
        opcode: major,
        rd,
        funct3,
        rs1,
        rs2,
        funct7,
    } = InstructionFields::extract(word);
    let unsupported = DecodedInstruction::Unsupported { word };

    match major {
        opcode::OP => {
            let op = match (funct3, funct7) {
                (0x0, 0x00) => ROp::Add,
                (0x0, 0x20) => ROp::Sub,
                (0x1, 0x00) => ROp::Sll,
                (0x2, 0x00) => ROp::Slt,
                (0x5, 0x00) => ROp::Srl,
                (0x6, 0x00) => ROp::Or,
                (0x7, 0x00) => ROp::And,
                _ => return unsupported,
            };
            DecodedInstruction::R { op, rd, rs1, rs2 }
        }
        opcode::OP_IMM => {
            let op = match funct3 {
                0x0 => IOp::Addi,
                0x3 => IOp::Sltiu,
                _ => return unsupported,
            };
            DecodedInstruction::I {
                op,
                rd,
                rs1,
                imm: imm_i(word),
            }
        }
        opcode::LOAD if funct3 == 0x2 => DecodedInstruction::I {
            op: IOp::Lw,
            rd,
            rs1,
            imm: imm_i(word),
        },
        // funct3 is not checked for jalr
        opcode::JALR => DecodedInstruction::I {
            op: IOp::Jalr,
            rd,
            rs1,
            imm: imm_i(word),
        },
        opcode::STORE if funct3 == 0x2 => DecodedInstruction::S {
            op: SOp::Sw,
            rs1,
            rs2,
            imm: imm_s(word),
        },
        opcode::BRANCH => {
            let op = match funct3 {
                0x0 => BOp::Beq,
                0x1 => BOp::Bne,
                _ => return unsupported,
            };
            DecodedInstruction::B {
                op,
                rs1,
                rs2,
                imm: imm_b(word),
            }
        }
        opcode::JAL => DecodedInstruction::J {
            op: JOp::Jal,
            rd,
            imm: imm_j(word),
        },
        _ => unsupported,
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DecodedInstruction::R { op, rd, rs1, rs2 } => {
                write!(f, "{} {}, {}, {}", op.mnemonic(), rd, rs1, rs2)
            }
            DecodedInstruction::I { op, rd, rs1, imm } => match op {
                IOp::Addi | IOp::Sltiu => write!(f, "{} {}, {}, {}", op.mnemonic(), rd, rs1, imm),
                IOp::Lw | IOp::Jalr => write!(f, "{} {}, {}({})", op.mnemonic(), rd, imm, rs1),
            },
            DecodedInstruction::S {
                op: SOp::Sw,
                rs1,
                rs2,
                imm,
            } => write!(f, "sw {}, {}({})", rs2, imm, rs1),
            DecodedInstruction::B { op, rs1, rs2, imm } => {
                write!(f, "{} {}, {}, {}", op.mnemonic(), rs1, rs2, imm)
            }
            DecodedInstruction::J {
                op: JOp::Jal,
                rd,
                imm,
            } => write!(f, "jal {}, {}", rd, imm),
            DecodedInstruction::Unsupported { word } => write!(f, "unsupported 0x{:08x}", word),
        }
    }
}
