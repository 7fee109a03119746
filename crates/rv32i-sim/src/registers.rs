//! Integer register file.

use rv32i_encoder::Gpr;

/// Initial value of `sp` (x2).
pub const DEFAULT_STACK_POINTER: u32 = 380;

/// The 32 general-purpose registers. `x0` always reads as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u32; 32],
}

impl RegisterFile {
    /// All registers zero except `sp`.
    pub fn new(initial_sp: u32) -> Self {
        let mut regs = [0; 32];
        regs[Gpr::SP.index()] = initial_sp;
        Self { regs }
    }

    pub fn read(&self, reg: Gpr) -> u32 {
        if reg == Gpr::ZERO {
            0
        } else {
            self.regs[reg.index()]
        }
    }

    /// Write a register, returning its previous value. Writes to `x0` are dropped.
    pub fn write(&mut self, reg: Gpr, value: u32) -> u32 {
        let old = self.read(reg);
        if reg != Gpr::ZERO {
            self.regs[reg.index()] = value;
        }
        old
    }

    /// Force `x0` back to zero.
    pub fn enforce_zero(&mut self) {
        self.regs[0] = 0;
    }

    pub fn snapshot(&self) -> [u32; 32] {
        self.regs
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_POINTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let regs = RegisterFile::default();
        assert_eq!(regs.read(Gpr::SP), 380);
        for reg in Gpr::all().filter(|r| *r != Gpr::SP) {
            assert_eq!(regs.read(reg), 0, "{} should start at zero", reg);
        }
    }

    #[test]
    fn test_write_returns_old_value() {
        let mut regs = RegisterFile::default();
        assert_eq!(regs.write(Gpr::A0, 7), 0);
        assert_eq!(regs.write(Gpr::A0, 9), 7);
        assert_eq!(regs.read(Gpr::A0), 9);
    }

    #[test]
    fn test_zero_register_discards_writes() {
        let mut regs = RegisterFile::default();
        regs.write(Gpr::ZERO, 123);
        assert_eq!(regs.read(Gpr::ZERO), 0);
        assert_eq!(regs.snapshot()[0], 0);
    }
}
