//! Per-step state snapshots.

use rv32i_encoder::Gpr;

use crate::registers::RegisterFile;

/// Program counter and register file captured after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub pc: u32,
    pub regs: [u32; 32],
}

impl TraceRecord {
    pub fn capture(pc: u32, regs: &RegisterFile) -> Self {
        Self {
            pc,
            regs: regs.snapshot(),
        }
    }

    pub fn register(&self, reg: Gpr) -> u32 {
        self.regs[reg.index()]
    }
}
