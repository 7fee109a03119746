//! Text rendering of traces and memory dumps.

use std::io::{self, Write};

use clap::ValueEnum;
use rv32i_sim::TraceRecord;

/// How numbers are written in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Radix {
    /// Unsigned decimal.
    #[default]
    Decimal,
    /// `0b` followed by 32 binary digits.
    Binary,
}

pub fn format_value(value: u32, radix: Radix) -> String {
    match radix {
        Radix::Decimal => value.to_string(),
        Radix::Binary => format!("0b{:032b}", value),
    }
}

/// PC followed by x0..x31, space separated.
pub fn format_trace_record(record: &TraceRecord, radix: Radix) -> String {
    let mut line = format_value(record.pc, radix);
    for value in record.regs {
        line.push(' ');
        line.push_str(&format_value(value, radix));
    }
    line
}

pub fn format_memory_line(address: u32, value: u32, radix: Radix) -> String {
    format!("0x{:08X}:{}", address, format_value(value, radix))
}

/// Write every trace record, then the memory window.
pub fn write_report<W: Write>(
    out: &mut W,
    trace: &[TraceRecord],
    memory: &[(u32, u32)],
    radix: Radix,
) -> io::Result<()> {
    for record in trace {
        writeln!(out, "{}", format_trace_record(record, radix))?;
    }
    for (address, value) in memory {
        writeln!(out, "{}", format_memory_line(*address, *value, radix))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0, Radix::Decimal), "0");
        assert_eq!(format_value(u32::MAX, Radix::Decimal), "4294967295");
        assert_eq!(
            format_value(5, Radix::Binary),
            "0b00000000000000000000000000000101"
        );
    }

    #[test]
    fn test_format_memory_line() {
        assert_eq!(format_memory_line(0x1_007c, 9, Radix::Decimal), "0x0001007C:9");
    }
}
