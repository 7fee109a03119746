//! Instruction executor.

use rv32i_encoder::Gpr;

use crate::{
    decoder::{BOp, DecodedInstruction, IOp, JOp, ROp, SOp},
    logging::Effect,
    memory::{word_aligned, DataMemory},
    registers::RegisterFile,
};

/// Result of executing a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    /// New PC value (None means PC += 4)
    pub new_pc: Option<u32>,
    pub effect: Effect,
}

impl ExecutionResult {
    fn sequential(effect: Effect) -> Self {
        Self {
            new_pc: None,
            effect,
        }
    }
}

/// Write an arithmetic result and describe it.
fn write_result(
    regs: &mut RegisterFile,
    rd: Gpr,
    rs1_val: u32,
    rs2_val: Option<u32>,
    value: u32,
) -> Effect {
    let rd_old = regs.write(rd, value);
    Effect::Arithmetic {
        rd,
        rs1_val,
        rs2_val,
        rd_old,
        rd_new: regs.read(rd),
    }
}

fn alu(op: ROp, a: u32, b: u32) -> u32 {
    match op {
        ROp::Add => a.wrapping_add(b),
        ROp::Sub => a.wrapping_sub(b),
        ROp::Sll => a << (b & 0x1f),
        ROp::Slt => ((a as i32) < (b as i32)) as u32,
        ROp::Srl => a >> (b & 0x1f),
        ROp::Or => a | b,
        ROp::And => a & b,
    }
}

/// Execute a decoded instruction at `pc`.
///
/// Execution cannot fail. Unsupported encodings only advance the PC.
pub fn execute_instruction(
    inst: DecodedInstruction,
    pc: u32,
    regs: &mut RegisterFile,
    memory: &mut DataMemory,
) -> ExecutionResult {
    match inst {
        DecodedInstruction::R { op, rd, rs1, rs2 } => {
            let a = regs.read(rs1);
            let b = regs.read(rs2);
            let effect = write_result(regs, rd, a, Some(b), alu(op, a, b));
            ExecutionResult::sequential(effect)
        }
        DecodedInstruction::I { op, rd, rs1, imm } => {
            let base = regs.read(rs1);
            match op {
                IOp::Addi => {
                    let value = base.wrapping_add(imm as u32);
                    ExecutionResult::sequential(write_result(regs, rd, base, None, value))
                }
                IOp::Sltiu => {
                    // The immediate is sign-extended, then compared unsigned.
                    let value = (base < imm as u32) as u32;
                    ExecutionResult::sequential(write_result(regs, rd, base, None, value))
                }
                IOp::Lw => {
                    let addr = base.wrapping_add(imm as u32);
                    let mem_val = memory.read_word(addr);
                    let rd_old = regs.write(rd, mem_val);
                    ExecutionResult::sequential(Effect::Load {
                        rd,
                        addr,
                        mem_val,
                        rd_old,
                        rd_new: regs.read(rd),
                    })
                }
                IOp::Jalr => {
                    // Target is computed from rs1 before rd is written, so
                    // `jalr ra, 0(ra)` jumps to the old ra.
                    let target_pc = base.wrapping_add(imm as u32) & !1;
                    let link = pc.wrapping_add(4);
                    regs.write(rd, link);
                    ExecutionResult {
                        new_pc: Some(target_pc),
                        effect: Effect::Jump {
                            rd,
                            link,
                            target_pc,
                        },
                    }
                }
            }
        }
        DecodedInstruction::S {
            op: SOp::Sw,
            rs1,
            rs2,
            imm,
        } => {
            let addr = word_aligned(regs.read(rs1).wrapping_add(imm as u32));
            let mem_new = regs.read(rs2);
            let mem_old = memory.write_word(addr, mem_new);
            ExecutionResult::sequential(Effect::Store {
                addr,
                mem_old,
                mem_new,
            })
        }
        DecodedInstruction::B { op, rs1, rs2, imm } => {
            let rs1_val = regs.read(rs1);
            let rs2_val = regs.read(rs2);
            let taken = match op {
                BOp::Beq => rs1_val == rs2_val,
                BOp::Bne => rs1_val != rs2_val,
            };
            let target_pc = taken.then(|| pc.wrapping_add(imm as u32));
            ExecutionResult {
                new_pc: target_pc,
                effect: Effect::Branch {
                    rs1_val,
                    rs2_val,
                    target_pc,
                },
            }
        }
        DecodedInstruction::J {
            op: JOp::Jal,
            rd,
            imm,
        } => {
            let link = pc.wrapping_add(4);
            let target_pc = pc.wrapping_add(imm as u32);
            regs.write(rd, link);
            ExecutionResult {
                new_pc: Some(target_pc),
                effect: Effect::Jump {
                    rd,
                    link,
                    target_pc,
                },
            }
        }
        DecodedInstruction::Unsupported { .. } => ExecutionResult::sequential(Effect::NoOp),
    }
}
