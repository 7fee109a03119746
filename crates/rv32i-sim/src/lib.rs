//! Instruction-level simulator for a subset of RV32I.
//!
//! Programs are sequences of 32-bit words fetched at `PC / 4`. Each executed
//! instruction appends a [`TraceRecord`] of the PC and register file. The
//! run stops at the halt sentinel (`0x00000063`), when the PC leaves the
//! program, or at an optional step limit.

#![no_std]

extern crate alloc;

mod config;
mod decoder;
mod error;
mod executor;
mod helpers;
mod logging;
mod memory;
mod program;
mod registers;
mod simulator;
mod trace;

pub use config::{SimConfig, DEFAULT_LOG_CAPACITY};
pub use decoder::{
    decode_instruction, imm_b, imm_i, imm_j, imm_s, sign_extend, BOp, DecodedInstruction, IOp,
    InstructionFields, JOp, ROp, SOp,
};
pub use error::{ConfigError, LoadError, LoadErrorKind};
pub use executor::{execute_instruction, ExecutionResult};
pub use helpers::{
    expect_a0, expect_halt, expect_register, run_asm, simulator_from_asm, HELPER_MAX_STEPS,
};
pub use logging::{Effect, InstLog, LogLevel};
pub use memory::{word_aligned, DataMemory, DEFAULT_MEMORY_BASE, DEFAULT_MEMORY_WORDS};
pub use program::Program;
pub use registers::{RegisterFile, DEFAULT_STACK_POINTER};
pub use simulator::{HaltReason, RunSummary, SimState, Simulator, StepOutcome};
pub use trace::TraceRecord;
pub use rv32i_encoder::{Gpr, HALT_WORD};
