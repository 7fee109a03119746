//! Simulator configuration.

use crate::{
    error::ConfigError,
    logging::LogLevel,
    memory::{DEFAULT_MEMORY_BASE, DEFAULT_MEMORY_WORDS},
    registers::DEFAULT_STACK_POINTER,
};

/// Default capacity of the rolling instruction log.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Tunables for a simulation run.
///
/// The defaults reproduce the reference model: data window of 32 words at
/// `0x0001_0000`, `sp` = 380, no step limit, logging off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// First address of the data window.
    pub memory_base: u32,
    /// Number of words in the data window.
    pub memory_words: usize,
    /// Initial value of `sp`.
    pub initial_sp: u32,
    /// Stop after this many executed instructions. `None` runs until the
    /// halt sentinel or the end of the program.
    pub max_steps: Option<u64>,
    pub log_level: LogLevel,
    /// Number of log entries kept; older entries are dropped first.
    pub log_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            memory_base: DEFAULT_MEMORY_BASE,
            memory_words: DEFAULT_MEMORY_WORDS,
            initial_sp: DEFAULT_STACK_POINTER,
            max_steps: None,
            log_level: LogLevel::None,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl SimConfig {
    pub fn with_memory_base(mut self, base: u32) -> Self {
        self.memory_base = base;
        self
    }

    pub fn with_memory_words(mut self, words: usize) -> Self {
        self.memory_words = words;
        self
    }

    pub fn with_initial_sp(mut self, sp: u32) -> Self {
        self.initial_sp = sp;
        self
    }

    pub fn with_max_steps(mut self, limit: u64) -> Self {
        self.max_steps = Some(limit);
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Check that the data window is word-aligned and fits in 32 bits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_base % 4 != 0 {
            return Err(ConfigError::UnalignedMemoryBase {
                base: self.memory_base,
            });
        }
        let window_end = u64::try_from(self.memory_words)
            .ok()
            .and_then(|words| words.checked_mul(4))
            .and_then(|bytes| bytes.checked_add(u64::from(self.memory_base)));
        let fits = matches!(window_end, Some(end) if end <= 1 << 32);
        if !fits {
            return Err(ConfigError::MemoryWindowOverflow {
                base: self.memory_base,
                words: self.memory_words,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.memory_base, 0x0001_0000);
        assert_eq!(config.memory_words, 32);
        assert_eq!(config.initial_sp, 380);
        assert_eq!(config.max_steps, None);
    }

    #[test]
    fn test_builder() {
        let config = SimConfig::default()
            .with_memory_base(0)
            .with_memory_words(8)
            .with_initial_sp(0x1000)
            .with_max_steps(50)
            .with_log_level(LogLevel::Instructions)
            .with_log_capacity(10);
        assert_eq!(config.memory_base, 0);
        assert_eq!(config.memory_words, 8);
        assert_eq!(config.initial_sp, 0x1000);
        assert_eq!(config.max_steps, Some(50));
        assert_eq!(config.log_level, LogLevel::Instructions);
        assert_eq!(config.log_capacity, 10);
    }

    #[test]
    fn test_unaligned_base_rejected() {
        let config = SimConfig::default().with_memory_base(0x1002);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnalignedMemoryBase { base: 0x1002 })
        );
    }

    #[test]
    fn test_window_at_top_of_address_space() {
        let fits = SimConfig::default()
            .with_memory_base(0xffff_fff8)
            .with_memory_words(2);
        assert_eq!(fits.validate(), Ok(()));

        let overflows = fits.with_memory_words(3);
        assert!(matches!(
            overflows.validate(),
            Err(ConfigError::MemoryWindowOverflow { .. })
        ));
    }
}
