use crate::virtual_machine::errors::VMError;

/// Zero-filled, growable word tape.
///
/// Conceptually unbounded: every address past the current length reads as 0.
/// Reads never allocate; a write past the end extends the tape with zeros up
/// to and including the written address, bounded by `limit`.
#[derive(Clone, Debug, Default)]
pub(crate) struct Memory {
    words: Vec<i64>,
    /// Writes at or beyond this address fail instead of growing the tape.
    limit: usize,
}

impl Memory {
    /// Creates a tape initialised with `words`.
    pub(crate) fn new(words: Vec<i64>, limit: usize) -> Self {
        Self { words, limit }
    }

    /// Returns the word at `address`, or 0 if it was never written.
    #[inline]
    pub(crate) fn read(&self, address: usize) -> i64 {
        self.words.get(address).copied().unwrap_or(0)
    }

    /// Stores `value` at `address`, growing the tape if needed.
    pub(crate) fn write(&mut self, address: usize, value: i64) -> Result<(), VMError> {
        self.ensure_len(address)?;
        self.words[address] = value;
        Ok(())
    }

    /// Grows the tape so that `address` is in bounds, zero-filling the gap.
    fn ensure_len(&mut self, address: usize) -> Result<(), VMError> {
        if address < self.words.len() {
            return Ok(());
        }
        if address >= self.limit {
            return Err(VMError::MemoryLimitExceeded {
                address,
                limit: self.limit,
            });
        }
        self.words.resize(address + 1, 0);
        Ok(())
    }

    /// Number of words currently backed by storage.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.words.len()
    }

    pub(crate) fn as_slice(&self) -> &[i64] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_past_end_is_zero_and_does_not_grow() {
        let memory = Memory::new(vec![1, 2, 3], 64);
        assert_eq!(memory.read(2), 3);
        assert_eq!(memory.read(3), 0);
        assert_eq!(memory.read(usize::MAX), 0);
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn write_past_end_zero_fills_the_gap() {
        let mut memory = Memory::new(vec![7], 64);
        memory.write(5, -9).unwrap();
        assert_eq!(memory.as_slice(), &[7, 0, 0, 0, 0, -9]);
    }

    #[test]
    fn write_in_bounds_overwrites() {
        let mut memory = Memory::new(vec![1, 2], 64);
        memory.write(0, 40).unwrap();
        assert_eq!(memory.as_slice(), &[40, 2]);
    }

    #[test]
    fn write_beyond_limit_fails_without_growing() {
        let mut memory = Memory::new(vec![0; 4], 8);
        memory.write(7, 1).unwrap();
        assert_eq!(
            memory.write(8, 1),
            Err(VMError::MemoryLimitExceeded {
                address: 8,
                limit: 8
            })
        );
        assert_eq!(memory.len(), 8);
    }

    #[test]
    fn program_longer_than_limit_stays_writable_in_bounds() {
        let mut memory = Memory::new(vec![0; 10], 4);
        memory.write(9, 5).unwrap();
        assert_eq!(memory.read(9), 5);
    }
}
