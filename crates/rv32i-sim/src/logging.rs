//! Structured per-instruction logging.

use core::fmt;

use rv32i_encoder::Gpr;

use crate::decoder::decode_instruction;

/// Which instructions are recorded in the log buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// No logging.
    #[default]
    None,
    /// Branches, jumps and the halt.
    Control,
    /// Every executed instruction.
    Instructions,
}

impl LogLevel {
    /// Whether an entry with this effect is kept at this level.
    pub fn records(self, effect: &Effect) -> bool {
        match self {
            LogLevel::None => false,
            LogLevel::Control => effect.is_control(),
            LogLevel::Instructions => true,
        }
    }
}

/// Architectural effect of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Register-register and register-immediate arithmetic.
    Arithmetic {
        rd: Gpr,
        rs1_val: u32,
        /// `None` for immediate forms
        rs2_val: Option<u32>,
        rd_old: u32,
        rd_new: u32,
    },
    Load {
        rd: Gpr,
        addr: u32,
        mem_val: u32,
        rd_old: u32,
        rd_new: u32,
    },
    Store {
        addr: u32,
        mem_old: u32,
        mem_new: u32,
    },
    Branch {
        rs1_val: u32,
        rs2_val: u32,
        /// Some if taken
        target_pc: Option<u32>,
    },
    Jump {
        rd: Gpr,
        link: u32,
        target_pc: u32,
    },
    /// Unsupported encoding; only the PC moved.
    NoOp,
    /// The halt sentinel was fetched.
    Halt,
}

impl Effect {
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Effect::Branch { .. } | Effect::Jump { .. } | Effect::Halt
        )
    }
}

/// Log entry for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstLog {
    /// 1-based step number.
    pub cycle: u64,
    pub pc: u32,
    pub word: u32,
    pub effect: Effect,
}

impl fmt::Display for InstLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:4}] 0x{:08x}: ", self.cycle, self.pc)?;
        if self.effect == Effect::Halt {
            write!(f, "halt")?;
        } else {
            write!(f, "{}", decode_instruction(self.word))?;
        }

        match self.effect {
            Effect::Arithmetic {
                rd,
                rs1_val,
                rs2_val,
                rd_old,
                rd_new,
            } => {
                write!(f, "\n    {}: {} -> {}", rd, rd_old, rd_new)?;
                match rs2_val {
                    Some(rs2_val) => write!(f, " (rs1={}, rs2={})", rs1_val, rs2_val)?,
                    None => write!(f, " (rs1={})", rs1_val)?,
                }
            }
            Effect::Load {
                rd,
                addr,
                mem_val,
                rd_old,
                rd_new,
            } => {
                write!(f, "\n    {}: {} -> {}", rd, rd_old, rd_new)?;
                write!(f, " (mem[0x{:08x}] = {})", addr, mem_val)?;
            }
            Effect::Store {
                addr,
                mem_old,
                mem_new,
            } => {
                write!(f, "\n    mem[0x{:08x}]: {} -> {}", addr, mem_old, mem_new)?;
            }
            Effect::Branch {
                rs1_val,
                rs2_val,
                target_pc,
            } => {
                match target_pc {
                    Some(target) => {
                        write!(f, "\n    branch taken: 0x{:08x} -> 0x{:08x}", self.pc, target)?
                    }
                    None => write!(f, "\n    branch not taken")?,
                }
                write!(f, " (rs1={}, rs2={})", rs1_val, rs2_val)?;
            }
            Effect::Jump {
                rd,
                link,
                target_pc,
            } => {
                if rd != Gpr::ZERO {
                    write!(f, "\n    {}: {}", rd, link)?;
                }
                write!(f, "\n    jump: 0x{:08x} -> 0x{:08x}", self.pc, target_pc)?;
            }
            Effect::NoOp => write!(f, "\n    no-op")?,
            Effect::Halt => {}
        }

        Ok(())
    }
}
