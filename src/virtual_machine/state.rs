//! Execution state and interpreter configuration.

use std::fmt;

/// Default cap on memory growth, in words (128 MiB of `i64`).
pub const DEFAULT_MEMORY_LIMIT: usize = 1 << 24;

/// Stable state of a [`VM`](super::vm::VM) between calls.
///
/// There is no observable running state: `run` and `resume` execute
/// synchronously until one of the stable states below is reached.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ExecState {
    /// No program has been loaded yet.
    #[default]
    NotStarted,
    /// Suspended on an input instruction with an empty input queue.
    ///
    /// The instruction pointer still points at that instruction, so the next
    /// `resume` retries it.
    NeedsInput,
    /// The program executed `HALT`. Terminal until the next load.
    Halted,
}

impl ExecState {
    pub fn is_halted(&self) -> bool {
        *self == ExecState::Halted
    }
}

impl fmt::Display for ExecState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecState::NotStarted => write!(f, "not started"),
            ExecState::NeedsInput => write!(f, "needs input"),
            ExecState::Halted => write!(f, "halted"),
        }
    }
}

/// Interpreter configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Log every executed instruction at debug level.
    pub trace: bool,
    /// Writes at or beyond this address fail with
    /// [`VMError::MemoryLimitExceeded`](super::errors::VMError::MemoryLimitExceeded).
    pub memory_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace: false,
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl Config {
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_memory_limit(mut self, words: usize) -> Self {
        self.memory_limit = words;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_not_started() {
        assert_eq!(ExecState::default(), ExecState::NotStarted);
        assert!(!ExecState::NeedsInput.is_halted());
        assert!(ExecState::Halted.is_halted());
    }

    #[test]
    fn config_builder() {
        let config = Config::default().with_trace(true).with_memory_limit(1024);
        assert!(config.trace);
        assert_eq!(config.memory_limit, 1024);
        assert_eq!(Config::default().memory_limit, DEFAULT_MEMORY_LIMIT);
    }
}
