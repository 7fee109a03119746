//! Helper functions for testing RV32I code.
//!
//! These panic with the execution log on failure, so they are meant for
//! tests rather than library use.

use alloc::{format, string::String};

use rv32i_encoder::{assemble_code, Gpr};

use crate::{
    logging::LogLevel,
    program::Program,
    simulator::{HaltReason, RunSummary, Simulator},
};

/// Step limit applied by the helpers so a broken loop fails instead of hanging.
pub const HELPER_MAX_STEPS: u64 = 100_000;

/// Create a simulator from assembly code, with full instruction logging.
pub fn simulator_from_asm(asm: &str) -> Result<Simulator, String> {
    let words = assemble_code(asm, None).map_err(|e| format!("Assembly error: {}", e))?;
    Ok(Simulator::new(Program::new(words))
        .with_max_steps(HELPER_MAX_STEPS)
        .with_log_level(LogLevel::Instructions))
}

fn failure_report(sim: &Simulator, asm: &str, summary: &RunSummary) -> String {
    let mut result = String::new();
    result.push_str(&format!("Stopped: {}\n\n", summary.reason));
    result.push_str("Code:\n");
    result.push_str(asm);
    result.push_str("\n\n");
    result.push_str(&sim.dump_state());
    result.push_str("\nLast execution logs:\n");
    result.push_str(&sim.format_logs());
    result
}

/// Assemble and run `asm` until it halts, returning the simulator.
pub fn run_asm(asm: &str) -> Simulator {
    let mut sim = match simulator_from_asm(asm) {
        Ok(sim) => sim,
        Err(e) => panic!("{}\n\nCode:\n{}", e, asm),
    };
    sim.run();
    sim
}

/// Expect the program to stop for `reason`.
pub fn expect_halt(asm: &str, reason: HaltReason) -> Simulator {
    let mut sim = match simulator_from_asm(asm) {
        Ok(sim) => sim,
        Err(e) => panic!("{}\n\nCode:\n{}", e, asm),
    };
    let summary = sim.run();
    if summary.reason != reason {
        panic!(
            "Expected halt by {}\n{}",
            reason,
            failure_report(&sim, asm, &summary)
        );
    }
    sim
}

/// Expect code to reach the halt sentinel with `expected` in `reg`.
pub fn expect_register(asm: &str, reg: Gpr, expected: u32) {
    let sim = expect_halt(asm, HaltReason::Sentinel);
    let actual = sim.register(reg);
    if actual != expected {
        let summary = RunSummary {
            reason: HaltReason::Sentinel,
            steps: sim.instruction_count(),
            records: sim.trace().len(),
        };
        panic!(
            "Register {} mismatch: expected {}, got {}\n{}",
            reg,
            expected,
            actual,
            failure_report(&sim, asm, &summary)
        );
    }
}

/// Expect code to leave `expected` in a0 (convenience function).
pub fn expect_a0(asm: &str, expected: u32) {
    expect_register(asm, Gpr::A0, expected);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_a0_simple() {
        expect_a0(
            "
addi a0, zero, 42
halt",
            42,
        );
    }

    #[test]
    fn test_expect_a0_loop() {
        // Sum 1..=5
        expect_a0(
            "
    addi a0, zero, 0
    addi t0, zero, 5
loop:
    add a0, a0, t0
    addi t0, t0, -1
    bne t0, zero, loop
    halt",
            15,
        );
    }

    #[test]
    fn test_expect_halt_end_of_program() {
        let sim = expect_halt("addi a0, zero, 1", HaltReason::EndOfProgram);
        assert_eq!(sim.trace().len(), 1);
    }

    #[test]
    fn test_runaway_loop_hits_limit() {
        let sim = expect_halt("spin: jal zero, spin", HaltReason::StepLimit);
        assert_eq!(sim.instruction_count(), HELPER_MAX_STEPS);
    }

    #[test]
    #[should_panic(expected = "Register a0 mismatch")]
    fn test_expect_register_reports_mismatch() {
        expect_a0("addi a0, zero, 1\nhalt", 2);
    }

    #[test]
    fn test_assembly_error_propagates() {
        assert!(simulator_from_asm("frob a0").is_err());
    }
}
