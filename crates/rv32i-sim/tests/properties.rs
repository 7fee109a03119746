//! Property tests over the simulator's arithmetic and control flow.

use proptest::prelude::*;
use rv32i_encoder::{add, addi, beq, bne, halt, jal, lw, slt, sltiu, sw, Gpr};
use rv32i_sim::{HaltReason, Program, Simulator};

fn run_with(words: &[u32], setup: &[(Gpr, u32)]) -> Simulator {
    let mut sim = Simulator::new(Program::from(words)).with_max_steps(10_000);
    for (reg, value) in setup {
        sim.set_register(*reg, *value);
    }
    sim.run();
    sim
}

fn gpr() -> impl Strategy<Value = Gpr> {
    (0u8..32).prop_map(Gpr::new)
}

/// Words that never change control flow.
fn straight_line_word() -> impl Strategy<Value = u32> {
    prop_oneof![
        (gpr(), gpr(), -2048i32..2048).prop_map(|(rd, rs1, imm)| addi(rd, rs1, imm)),
        (gpr(), gpr(), -2048i32..2048).prop_map(|(rd, rs1, imm)| sltiu(rd, rs1, imm)),
        (gpr(), gpr(), gpr()).prop_map(|(rd, rs1, rs2)| add(rd, rs1, rs2)),
        (gpr(), gpr(), gpr()).prop_map(|(rd, rs1, rs2)| slt(rd, rs1, rs2)),
        (gpr(), gpr(), -2048i32..2048).prop_map(|(rd, rs1, imm)| lw(rd, rs1, imm)),
        (gpr(), gpr(), -2048i32..2048).prop_map(|(rs1, rs2, imm)| sw(rs1, rs2, imm)),
    ]
}

/// Straight-line words mixed with branches and jumps to word-aligned offsets.
fn aligned_control_word() -> impl Strategy<Value = u32> {
    prop_oneof![
        straight_line_word(),
        (gpr(), gpr(), -16i32..16).prop_map(|(rs1, rs2, k)| beq(rs1, rs2, 4 * k)),
        (gpr(), gpr(), -16i32..16).prop_map(|(rs1, rs2, k)| bne(rs1, rs2, 4 * k)),
        (gpr(), -16i32..16).prop_map(|(rd, k)| jal(rd, 4 * k)),
    ]
}

proptest! {
    #[test]
    fn add_wraps_modulo_2_32(a in any::<u32>(), b in any::<u32>()) {
        let sim = run_with(&[add(Gpr::A2, Gpr::A0, Gpr::A1), halt()], &[(Gpr::A0, a), (Gpr::A1, b)]);
        prop_assert_eq!(sim.register(Gpr::A2), a.wrapping_add(b));
    }

    #[test]
    fn addi_sign_extends(a in any::<u32>(), imm in -2048i32..2048) {
        let sim = run_with(&[addi(Gpr::A1, Gpr::A0, imm), halt()], &[(Gpr::A0, a)]);
        prop_assert_eq!(sim.register(Gpr::A1), a.wrapping_add(imm as u32));
    }

    #[test]
    fn slt_compares_signed(a in any::<i32>(), b in any::<i32>()) {
        let sim = run_with(
            &[slt(Gpr::A2, Gpr::A0, Gpr::A1), halt()],
            &[(Gpr::A0, a as u32), (Gpr::A1, b as u32)],
        );
        prop_assert_eq!(sim.register(Gpr::A2), (a < b) as u32);
    }

    #[test]
    fn sltiu_compares_unsigned(a in any::<u32>(), imm in -2048i32..2048) {
        let sim = run_with(&[sltiu(Gpr::A1, Gpr::A0, imm), halt()], &[(Gpr::A0, a)]);
        prop_assert_eq!(sim.register(Gpr::A1), (a < imm as u32) as u32);
    }

    #[test]
    fn store_then_load_round_trips(value in any::<u32>(), word in 0u32..32) {
        let offset = (word * 4) as i32;
        let sim = run_with(
            &[sw(Gpr::T0, Gpr::A0, offset), lw(Gpr::A1, Gpr::T0, offset), halt()],
            &[(Gpr::T0, 0x1_0000), (Gpr::A0, value)],
        );
        prop_assert_eq!(sim.register(Gpr::A1), value);
        prop_assert_eq!(sim.memory_dump()[word as usize], (0x1_0000 + word * 4, value));
    }

    #[test]
    fn countdown_loop_runs_n_times(n in 1i32..200) {
        // 0: addi a0, zero, n
        // 4: addi a0, a0, -1
        // 8: bne a0, zero, -4
        // 12: halt
        let sim = run_with(
            &[addi(Gpr::A0, Gpr::ZERO, n), addi(Gpr::A0, Gpr::A0, -1), bne(Gpr::A0, Gpr::ZERO, -4), halt()],
            &[],
        );
        prop_assert_eq!(sim.register(Gpr::A0), 0);
        prop_assert_eq!(sim.trace().len(), 2 + 2 * n as usize);
    }

    #[test]
    fn halt_yields_exactly_one_record(prefix in 0usize..20) {
        let mut words = vec![0u32; prefix];
        words.push(halt());
        words.push(addi(Gpr::A0, Gpr::ZERO, 1));
        let sim = run_with(&words, &[]);
        prop_assert_eq!(sim.trace().len(), prefix + 1);
        let last = sim.trace()[prefix];
        prop_assert_eq!(last.pc, 4 * prefix as u32);
        prop_assert_eq!(last.register(Gpr::A0), 0);
    }

    #[test]
    fn step_limit_is_exact(limit in 0u64..500) {
        let mut sim = Simulator::new(Program::from(&[jal(Gpr::ZERO, 0)][..])).with_max_steps(limit);
        let summary = sim.run();
        prop_assert_eq!(summary.reason, HaltReason::StepLimit);
        prop_assert_eq!(summary.steps, limit);
        prop_assert_eq!(sim.trace().len() as u64, limit);
    }

    #[test]
    fn x0_reads_zero_in_every_record(words in proptest::collection::vec(any::<u32>(), 1..32)) {
        let mut sim = Simulator::new(Program::from(words)).with_max_steps(256);
        sim.run();
        for record in sim.trace() {
            prop_assert_eq!(record.register(Gpr::ZERO), 0);
        }
    }

    #[test]
    fn straight_line_program_ends_after_n_steps(
        words in proptest::collection::vec(straight_line_word(), 1..64),
    ) {
        let mut sim = Simulator::new(Program::from(words.clone()));
        let summary = sim.run();
        prop_assert_eq!(summary.reason, HaltReason::EndOfProgram);
        prop_assert_eq!(summary.steps, words.len() as u64);
        prop_assert_eq!(sim.trace().len(), words.len());
        prop_assert_eq!(sim.pc(), 4 * words.len() as u32);
    }

    #[test]
    fn pc_stays_word_aligned(
        words in proptest::collection::vec(aligned_control_word(), 1..32),
    ) {
        let mut sim = Simulator::new(Program::from(words)).with_max_steps(1_000);
        sim.run();
        for record in sim.trace() {
            prop_assert_eq!(record.pc % 4, 0);
        }
        prop_assert_eq!(sim.pc() % 4, 0);
    }
}
