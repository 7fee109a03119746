//! Command-line front-end for the RV32I simulator.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use rv32i_sim::{HaltReason, LogLevel, Program, SimConfig, Simulator};

pub mod args;
pub mod report;

use args::Args;
use report::{write_report, Radix};

/// Parse program text and run it to completion.
pub fn load_and_run(text: &str, config: SimConfig) -> Result<Simulator> {
    let program = Program::parse(text).context("failed to parse program")?;
    tracing::debug!(words = program.len(), "program loaded");

    let mut sim = Simulator::with_config(program, config).context("invalid configuration")?;
    let summary = sim.run();

    for log in sim.logs() {
        if log.effect.is_control() {
            tracing::debug!("{}", log);
        } else {
            tracing::trace!("{}", log);
        }
    }
    match summary.reason {
        HaltReason::StepLimit => tracing::warn!(
            steps = summary.steps,
            pc = format_args!("0x{:08x}", sim.pc()),
            "step limit reached before halt"
        ),
        reason => tracing::info!(
            %reason,
            steps = summary.steps,
            records = summary.records,
            "simulation finished"
        ),
    }
    if sim.config().log_level == LogLevel::Instructions {
        tracing::trace!("final state:\n{}", sim.dump_state());
    }

    Ok(sim)
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn write_to(path: &Path, sim: &Simulator, radix: Radix) -> Result<()> {
    let mut out = open_output(path)?;
    write_report(&mut out, sim.trace(), &sim.memory_dump(), radix)
        .and_then(|()| out.flush())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?radix, "report written");
    Ok(())
}

/// Read the input, simulate, and write every requested report.
pub fn run(args: &Args) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let sim = load_and_run(&text, args.config())?;

    write_to(&args.output, &sim, args.radix)?;
    if let Some(path) = &args.binary_output {
        write_to(path, &sim, Radix::Binary)?;
    }
    Ok(())
}
