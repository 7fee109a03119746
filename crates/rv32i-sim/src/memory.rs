//! Sparse word-addressed data memory.

use alloc::collections::BTreeMap;

/// Default start of the data window.
pub const DEFAULT_MEMORY_BASE: u32 = 0x0001_0000;

/// Default number of words in the data window.
pub const DEFAULT_MEMORY_WORDS: usize = 32;

/// Clear the low two bits of an address.
pub fn word_aligned(address: u32) -> u32 {
    address & !0x3
}

/// Data memory: a sparse map from address to 32-bit value.
///
/// A window of `words` consecutive words starting at `base` is populated
/// with zero at construction and is what [`DataMemory::window`] reports.
/// Addresses outside the window are still writable; unmapped addresses
/// read as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMemory {
    cells: BTreeMap<u32, u32>,
    base: u32,
    words: usize,
}

impl DataMemory {
    pub fn new(base: u32, words: usize) -> Self {
        let cells = (0..words)
            .map(|i| (base.wrapping_add(4 * i as u32), 0))
            .collect();
        Self { cells, base, words }
    }

    /// Read the word at `address`; zero if nothing was ever stored there.
    pub fn read_word(&self, address: u32) -> u32 {
        self.cells.get(&address).copied().unwrap_or(0)
    }

    /// Store a word at `address` rounded down to a multiple of four.
    /// Returns the previous value.
    pub fn write_word(&mut self, address: u32, value: u32) -> u32 {
        self.cells
            .insert(word_aligned(address), value)
            .unwrap_or(0)
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn window_words(&self) -> usize {
        self.words
    }

    /// `(address, value)` for every word of the window, in address order.
    pub fn window(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.words).map(move |i| {
            let address = self.base.wrapping_add(4 * i as u32);
            (address, self.read_word(address))
        })
    }

    /// Every address ever populated, including writes outside the window.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.cells.iter().map(|(addr, value)| (*addr, *value))
    }
}

impl Default for DataMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_BASE, DEFAULT_MEMORY_WORDS)
    }
}
