//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use rv32i_sim::{LogLevel, SimConfig, DEFAULT_MEMORY_BASE};

use crate::report::Radix;

/// Step limit applied when `--max-steps` is not given.
pub const DEFAULT_MAX_STEPS: u64 = 100_000;

/// Run an RV32I program and write its execution trace.
#[derive(Parser, Debug)]
#[command(name = "rv32i-run", version)]
pub struct Args {
    /// Program file: one 32-digit binary word per line
    pub input: PathBuf,

    /// Trace output file (`-` for stdout)
    pub output: PathBuf,

    /// Number format for the trace and memory dump
    #[arg(long, value_enum, default_value_t = Radix::Decimal)]
    pub radix: Radix,

    /// Also write the report in binary radix to this file
    #[arg(long)]
    pub binary_output: Option<PathBuf>,

    /// First address of the dumped data window (decimal or 0x hex)
    #[arg(long, value_parser = parse_address, default_value_t = DEFAULT_MEMORY_BASE)]
    pub mem_base: u32,

    /// Stop after N instructions
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: u64,

    /// Log more (-v control flow, -vv every instruction)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_address(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {:?}: {}", s, e))
}

impl Args {
    pub fn log_level(&self) -> LogLevel {
        match self.verbose {
            0 => LogLevel::None,
            1 => LogLevel::Control,
            _ => LogLevel::Instructions,
        }
    }

    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn default_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn config(&self) -> SimConfig {
        SimConfig::default()
            .with_memory_base(self.mem_base)
            .with_max_steps(self.max_steps)
            .with_log_level(self.log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x10000"), Ok(0x1_0000));
        assert_eq!(parse_address("256"), Ok(256));
        assert!(parse_address("0xzz").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["rv32i-run", "in.txt", "out.txt"]).unwrap();
        assert_eq!(args.radix, Radix::Decimal);
        assert_eq!(args.mem_base, 0x1_0000);
        assert_eq!(args.binary_output, None);
        assert_eq!(args.log_level(), LogLevel::None);
        assert_eq!(args.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(
            args.config(),
            SimConfig::default().with_max_steps(DEFAULT_MAX_STEPS)
        );
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "rv32i-run",
            "in.txt",
            "-",
            "--radix",
            "binary",
            "--binary-output",
            "bin.txt",
            "--mem-base",
            "0x2000",
            "--max-steps",
            "50",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.radix, Radix::Binary);
        assert_eq!(args.binary_output, Some(PathBuf::from("bin.txt")));
        assert_eq!(args.default_filter(), "trace");

        let config = args.config();
        assert_eq!(config.memory_base, 0x2000);
        assert_eq!(config.max_steps, Some(50));
        assert_eq!(config.log_level, LogLevel::Instructions);
    }
}
