//! Intcode program representation and text parsing.
//!
//! Programs are conventionally stored as comma-separated decimal integers,
//! possibly wrapped over several lines. [`Program`] is the immutable source a
//! [`VM`](super::vm::VM) copies into its memory on every load.

use crate::virtual_machine::errors::VMError;
use std::fmt;
use std::str::FromStr;

/// An immutable sequence of program words.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    words: Vec<i64>,
}

impl Program {
    /// Creates a program from raw words.
    pub fn new(words: Vec<i64>) -> Self {
        Self { words }
    }

    /// Returns the program words.
    pub fn words(&self) -> &[i64] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns a copy with the word at `index` replaced by `value`.
    ///
    /// Drivers use this to search over initial parameters (e.g. the two words
    /// after the first instruction) without re-parsing the source. Indices past
    /// the end zero-fill, matching memory semantics.
    pub fn patched(&self, index: usize, value: i64) -> Self {
        let mut words = self.words.clone();
        if index >= words.len() {
            words.resize(index + 1, 0);
        }
        words[index] = value;
        Self { words }
    }
}

impl From<Vec<i64>> for Program {
    fn from(words: Vec<i64>) -> Self {
        Self::new(words)
    }
}

impl From<&[i64]> for Program {
    fn from(words: &[i64]) -> Self {
        Self::new(words.to_vec())
    }
}

impl FromStr for Program {
    type Err = VMError;

    /// Parses comma-separated integers. Line breaks and surrounding whitespace
    /// are ignored, as are empty fields from trailing commas or blank lines.
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        source
            .split(|c: char| c == ',' || c == '\n')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .enumerate()
            .map(|(index, token)| {
                token.parse::<i64>().map_err(|_| VMError::ParseError {
                    token: token.to_string(),
                    index,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", word)?;
        }
        Ok(())
    }
}
