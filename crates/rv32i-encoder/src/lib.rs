//! RV32I subset instruction encoder.
//!
//! This crate encodes the instructions understood by `rv32i-sim` into
//! 32-bit machine words, and provides a small assembler used to write
//! test programs in readable form.

#![no_std]

extern crate alloc;

mod asm;
mod encode;
mod regs;

pub use asm::{assemble_code, assemble_instruction, to_binary_text};
pub use encode::*;
pub use regs::Gpr;
