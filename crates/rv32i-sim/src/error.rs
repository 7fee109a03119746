//! Error types for program loading and configuration.
//!
//! Execution itself has no error path: unsupported encodings run as
//! no-ops and unmapped loads read zero.

use core::fmt;

/// What was wrong with a program line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The line is not exactly 32 characters long.
    InvalidLength { found: usize },
    /// A character other than `0` or `1`.
    InvalidDigit { column: usize, found: char },
}

/// A program line that could not be read as an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadError {
    /// 1-based line number in the source text.
    pub line: usize,
    pub kind: LoadErrorKind,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LoadErrorKind::InvalidLength { found } => write!(
                f,
                "line {}: expected 32 binary digits, found {} characters",
                self.line, found
            ),
            LoadErrorKind::InvalidDigit { column, found } => write!(
                f,
                "line {}, column {}: invalid binary digit {:?}",
                self.line, column, found
            ),
        }
    }
}

impl core::error::Error for LoadError {}

/// Invalid simulator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The data window must start on a word boundary.
    UnalignedMemoryBase { base: u32 },
    /// The data window runs past the end of the address space.
    MemoryWindowOverflow { base: u32, words: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnalignedMemoryBase { base } => {
                write!(f, "memory base 0x{:08x} is not word-aligned", base)
            }
            ConfigError::MemoryWindowOverflow { base, words } => write!(
                f,
                "memory window of {} words at 0x{:08x} exceeds the 32-bit address space",
                words, base
            ),
        }
    }
}

impl core::error::Error for ConfigError {}
