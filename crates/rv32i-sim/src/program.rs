//! Program loading from binary text.
//!
//! The input format is one instruction per line, written as 32 `0`/`1`
//! characters with the most significant bit first. Blank lines are skipped
//! and surrounding whitespace is ignored.

use alloc::vec::Vec;

use nom::{
    bytes::complete::take_while_m_n,
    combinator::{all_consuming, map_res},
    IResult,
};

use crate::error::{LoadError, LoadErrorKind};

/// An immutable sequence of instruction words, addressed from 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    words: Vec<u32>,
}

fn is_binary_digit(c: char) -> bool {
    c == '0' || c == '1'
}

/// Parse exactly 32 binary digits.
fn parse_word(input: &str) -> IResult<&str, u32> {
    map_res(take_while_m_n(32, 32, is_binary_digit), |bits: &str| {
        u32::from_str_radix(bits, 2)
    })(input)
}

/// Work out why `line` is not a valid word.
fn diagnose(line: &str) -> LoadErrorKind {
    match line.chars().enumerate().find(|(_, c)| !is_binary_digit(*c)) {
        Some((idx, found)) => LoadErrorKind::InvalidDigit {
            column: idx + 1,
            found,
        },
        None => LoadErrorKind::InvalidLength {
            found: line.chars().count(),
        },
    }
}

impl Program {
    pub fn new(words: Vec<u32>) -> Self {
        Self { words }
    }

    /// Parse binary program text.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut words = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            match all_consuming(parse_word)(line) {
                Ok((_, word)) => words.push(word),
                Err(_) => {
                    return Err(LoadError {
                        line: idx + 1,
                        kind: diagnose(line),
                    })
                }
            }
        }
        Ok(Self { words })
    }

    /// The word at `pc`, or `None` past the end of the program.
    pub fn fetch(&self, pc: u32) -> Option<u32> {
        self.words.get((pc / 4) as usize).copied()
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<u32>> for Program {
    fn from(words: Vec<u32>) -> Self {
        Self::new(words)
    }
}

impl From<&[u32]> for Program {
    fn from(words: &[u32]) -> Self {
        Self::new(words.to_vec())
    }
}
