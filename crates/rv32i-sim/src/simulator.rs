//! Fetch-execute loop.

use alloc::{collections::VecDeque, format, string::String, vec::Vec};
use core::fmt;

use rv32i_encoder::{Gpr, HALT_WORD};

use crate::{
    config::SimConfig,
    decoder::decode_instruction,
    error::ConfigError,
    executor::execute_instruction,
    logging::{Effect, InstLog, LogLevel},
    memory::DataMemory,
    program::Program,
    registers::RegisterFile,
    trace::TraceRecord,
};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The halt sentinel word was fetched.
    Sentinel,
    /// The PC left the program.
    EndOfProgram,
    /// The configured step limit was reached.
    StepLimit,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::Sentinel => write!(f, "halt instruction"),
            HaltReason::EndOfProgram => write!(f, "end of program"),
            HaltReason::StepLimit => write!(f, "step limit reached"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Running,
    Halted(HaltReason),
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction ran and the next one can be fetched.
    Continue,
    Halted(HaltReason),
}

/// What [`Simulator::run`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: HaltReason,
    /// Instructions executed, counting the halt sentinel.
    pub steps: u64,
    /// Trace records produced.
    pub records: usize,
}

/// RV32I subset simulator.
///
/// One trace record is appended per executed instruction, including the
/// halt sentinel. Running off the end of the program or hitting the step
/// limit stops without a record.
#[derive(Debug)]
pub struct Simulator {
    program: Program,
    config: SimConfig,
    regs: RegisterFile,
    pc: u32,
    memory: DataMemory,
    trace: Vec<TraceRecord>,
    state: SimState,
    instruction_count: u64,
    log_buffer: VecDeque<InstLog>,
}

impl Simulator {
    /// Create a simulator with the default configuration.
    pub fn new(program: Program) -> Self {
        let config = SimConfig::default();
        Self {
            regs: RegisterFile::new(config.initial_sp),
            memory: DataMemory::new(config.memory_base, config.memory_words),
            program,
            config,
            pc: 0,
            trace: Vec::new(),
            state: SimState::Running,
            instruction_count: 0,
            log_buffer: VecDeque::new(),
        }
    }

    /// Create a simulator with an explicit configuration.
    pub fn with_config(program: Program, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut sim = Self::new(program);
        sim.config = config;
        sim.reset();
        Ok(sim)
    }

    /// Set the maximum number of instructions to execute.
    pub fn with_max_steps(mut self, limit: u64) -> Self {
        self.config.max_steps = Some(limit);
        self
    }

    /// Set the logging level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    /// Return to the initial state: PC 0, fresh registers and memory, empty
    /// trace and logs.
    pub fn reset(&mut self) {
        self.regs = RegisterFile::new(self.config.initial_sp);
        self.memory = DataMemory::new(self.config.memory_base, self.config.memory_words);
        self.pc = 0;
        self.trace.clear();
        self.state = SimState::Running;
        self.instruction_count = 0;
        self.log_buffer.clear();
    }

    /// Execute a single instruction.
    ///
    /// Once halted, further calls do nothing and report the same reason.
    pub fn step(&mut self) -> StepOutcome {
        if let SimState::Halted(reason) = self.state {
            return StepOutcome::Halted(reason);
        }

        if let Some(limit) = self.config.max_steps {
            if self.instruction_count >= limit {
                return self.halt(HaltReason::StepLimit);
            }
        }

        let Some(word) = self.program.fetch(self.pc) else {
            return self.halt(HaltReason::EndOfProgram);
        };

        self.instruction_count += 1;

        if word == HALT_WORD {
            self.trace.push(TraceRecord::capture(self.pc, &self.regs));
            self.log_instruction(self.pc, word, Effect::Halt);
            return self.halt(HaltReason::Sentinel);
        }

        let pc = self.pc;
        let result = execute_instruction(
            decode_instruction(word),
            pc,
            &mut self.regs,
            &mut self.memory,
        );
        self.pc = result.new_pc.unwrap_or(pc.wrapping_add(4));
        self.regs.enforce_zero();

        self.trace.push(TraceRecord::capture(self.pc, &self.regs));
        self.log_instruction(pc, word, result.effect);
        StepOutcome::Continue
    }

    /// Step until the simulator halts.
    pub fn run(&mut self) -> RunSummary {
        let reason = loop {
            if let StepOutcome::Halted(reason) = self.step() {
                break reason;
            }
        };
        RunSummary {
            reason,
            steps: self.instruction_count,
            records: self.trace.len(),
        }
    }

    fn halt(&mut self, reason: HaltReason) -> StepOutcome {
        self.state = SimState::Halted(reason);
        StepOutcome::Halted(reason)
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn register(&self, reg: Gpr) -> u32 {
        self.regs.read(reg)
    }

    /// Set the value of a register.
    ///
    /// Note: Writing to x0 (ZERO) is a no-op.
    pub fn set_register(&mut self, reg: Gpr, value: u32) {
        self.regs.write(reg, value);
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn memory(&self) -> &DataMemory {
        &self.memory
    }

    /// Get a mutable reference to the memory (for initialization).
    pub fn memory_mut(&mut self) -> &mut DataMemory {
        &mut self.memory
    }

    /// `(address, value)` for each word of the data window.
    pub fn memory_dump(&self) -> Vec<(u32, u32)> {
        self.memory.window().collect()
    }

    pub fn trace(&self) -> &[TraceRecord] {
        &self.trace
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.state, SimState::Halted(_))
    }

    /// Get the number of instructions executed so far.
    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Captured log entries, oldest first.
    pub fn logs(&self) -> impl Iterator<Item = &InstLog> + '_ {
        self.log_buffer.iter()
    }

    /// Format all captured logs as a string.
    pub fn format_logs(&self) -> String {
        let mut result = String::new();
        for log in &self.log_buffer {
            result.push_str(&format!("{}\n", log));
        }
        result
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.clear();
    }

    /// Dump the current simulator state as a human-readable string.
    pub fn dump_state(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("PC: 0x{:08x}\n", self.pc));
        result.push_str(&format!(
            "Instructions executed: {}\n",
            self.instruction_count
        ));
        match self.state {
            SimState::Running => result.push_str("State: running\n"),
            SimState::Halted(reason) => result.push_str(&format!("State: halted ({})\n", reason)),
        }

        result.push_str("\nRegisters:\n");
        for reg in Gpr::all() {
            let value = self.regs.read(reg);
            if value != 0 || reg == Gpr::ZERO {
                result.push_str(&format!(
                    "  {} (x{}) = 0x{:08x} ({})\n",
                    reg,
                    reg.num(),
                    value,
                    value as i32
                ));
            }
        }

        let written: Vec<(u32, u32)> = self
            .memory
            .cells()
            .filter(|(_, value)| *value != 0)
            .collect();
        if !written.is_empty() {
            result.push_str("\nMemory:\n");
            for (addr, value) in written {
                result.push_str(&format!(
                    "  0x{:08x} = 0x{:08x} ({})\n",
                    addr, value, value as i32
                ));
            }
        }

        result
    }

    /// Push onto the rolling buffer if the log level keeps this entry.
    fn log_instruction(&mut self, pc: u32, word: u32, effect: Effect) {
        if !self.config.log_level.records(&effect) || self.config.log_capacity == 0 {
            return;
        }
        if self.log_buffer.len() >= self.config.log_capacity {
            self.log_buffer.pop_front();
        }
        self.log_buffer.push_back(InstLog {
            cycle: self.instruction_count,
            pc,
            word,
            effect,
        });
    }
}
