//! RV32I general-purpose registers.

extern crate alloc;

use alloc::{format, string::String};
use core::fmt;

/// ABI names, indexed by register number.
const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// One of the 32 integer registers `x0`..`x31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gpr(u8);

impl Gpr {
    /// Create a register from its number.
    ///
    /// # Panics
    ///
    /// Panics if the register number is >= 32.
    pub fn new(num: u8) -> Self {
        assert!(num < 32, "Register number must be < 32");
        Self(num)
    }

    /// Build a register from the low five bits of an instruction field.
    pub fn from_field(bits: u32) -> Self {
        Self((bits & 0x1f) as u8)
    }

    /// Register number (0-31).
    pub fn num(&self) -> u8 {
        self.0
    }

    /// Register number as an array index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// ABI name (`zero`, `ra`, `sp`, ...).
    pub fn abi_name(&self) -> &'static str {
        ABI_NAMES[self.index()]
    }

    /// Iterate over all 32 registers in order.
    pub fn all() -> impl Iterator<Item = Gpr> {
        (0..32u8).map(Gpr)
    }

    /// Parse a register name.
    ///
    /// Accepts ABI names (`a0`, `sp`, `fp`, ...) and numeric names (`x0`..`x31`).
    pub fn from_name(name: &str) -> Result<Self, String> {
        if name == "fp" {
            return Ok(Gpr::S0);
        }
        if let Some(num) = ABI_NAMES.iter().position(|abi| *abi == name) {
            return Ok(Gpr(num as u8));
        }
        if let Some(num) = name.strip_prefix('x').and_then(|n| n.parse::<u8>().ok()) {
            if num < 32 {
                return Ok(Gpr(num));
            }
        }
        Err(format!("Invalid register name: {}", name))
    }
}

impl Gpr {
    pub const ZERO: Gpr = Gpr(0);
    pub const RA: Gpr = Gpr(1);
    pub const SP: Gpr = Gpr(2);
    pub const GP: Gpr = Gpr(3);
    pub const TP: Gpr = Gpr(4);
    pub const T0: Gpr = Gpr(5);
    pub const T1: Gpr = Gpr(6);
    pub const T2: Gpr = Gpr(7);
    pub const S0: Gpr = Gpr(8);
    pub const S1: Gpr = Gpr(9);
    pub const A0: Gpr = Gpr(10);
    pub const A1: Gpr = Gpr(11);
    pub const A2: Gpr = Gpr(12);
    pub const A3: Gpr = Gpr(13);
    pub const A4: Gpr = Gpr(14);
    pub const A5: Gpr = Gpr(15);
    pub const A6: Gpr = Gpr(16);
    pub const A7: Gpr = Gpr(17);
    pub const S2: Gpr = Gpr(18);
    pub const T6: Gpr = Gpr(31);
}

impl fmt::Display for Gpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abi_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_gpr_creation() {
        let reg = Gpr::new(5);
        assert_eq!(reg.num(), 5);
        assert_eq!(reg, Gpr::T0);
    }

    #[test]
    #[should_panic(expected = "Register number must be < 32")]
    fn test_gpr_invalid() {
        Gpr::new(32);
    }

    #[test]
    fn test_from_field_masks_high_bits() {
        assert_eq!(Gpr::from_field(0x21), Gpr::RA);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Gpr::from_name("zero"), Ok(Gpr::ZERO));
        assert_eq!(Gpr::from_name("x2"), Ok(Gpr::SP));
        assert_eq!(Gpr::from_name("fp"), Ok(Gpr::S0));
        assert_eq!(Gpr::from_name("t6"), Ok(Gpr::T6));
        assert_eq!(Gpr::from_name("x31"), Ok(Gpr::T6));
        assert!(Gpr::from_name("x32").is_err());
        assert!(Gpr::from_name("q1").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Gpr::ZERO), "zero");
        assert_eq!(format!("{}", Gpr::SP), "sp");
        assert_eq!(format!("{}", Gpr::A0), "a0");
        assert_eq!(format!("{}", Gpr::new(27)), "s11");
    }

    #[test]
    fn test_all_is_ordered() {
        let regs: alloc::vec::Vec<Gpr> = Gpr::all().collect();
        assert_eq!(regs.len(), 32);
        assert_eq!(regs[0], Gpr::ZERO);
        assert_eq!(regs[31], Gpr::T6);
    }
}
