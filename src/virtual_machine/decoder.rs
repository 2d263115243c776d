//! Instruction word decoding.
//!
//! Splits a word into its [`Opcode`] and the addressing [`Mode`] of each
//! parameter slot, rejecting mode digits outside 0..=2 and immediate-mode
//! write destinations before anything executes.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Opcode, Param};
use std::fmt;

/// Maximum number of parameters any instruction takes.
pub const MAX_PARAMS: usize = 3;

/// How a raw parameter is turned into a value or an address.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// The parameter is an address to dereference.
    #[default]
    Position,
    /// The parameter is the value itself.
    Immediate,
    /// The parameter is an offset from the relative base.
    Relative,
}

impl Mode {
    /// Short tag used in instruction traces.
    pub const fn tag(&self) -> char {
        match self {
            Mode::Position => 'p',
            Mode::Immediate => 'i',
            Mode::Relative => 'r',
        }
    }
}

impl TryFrom<i64> for Mode {
    type Error = i64;

    fn try_from(digit: i64) -> Result<Self, Self::Error> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 => Ok(Mode::Relative),
            other => Err(other),
        }
    }
}

/// A decoded instruction word.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Modes of parameters 1..=3. Slots past the opcode's arity are `Position`.
    pub modes: [Mode; MAX_PARAMS],
}

impl Instruction {
    /// Decodes the instruction word found at `ip`.
    ///
    /// Only the mode digits of parameters the opcode actually takes are
    /// validated; higher digits are ignored.
    pub fn decode(word: i64, ip: usize) -> Result<Self, VMError> {
        let opcode = Opcode::try_from(word % 100).map_err(|_| VMError::UnknownOpcode {
            word,
            opcode: word % 100,
            ip,
        })?;

        let mut modes = [Mode::Position; MAX_PARAMS];
        let mut divisor = 100;
        for (param, kind) in opcode.params().iter().enumerate() {
            let digit = (word / divisor) % 10;
            let mode = Mode::try_from(digit).map_err(|mode| VMError::InvalidMode {
                mode,
                param: param + 1,
                ip,
            })?;
            if *kind == Param::Write && mode == Mode::Immediate {
                return Err(VMError::InvalidWriteMode {
                    mnemonic: opcode.mnemonic(),
                    param: param + 1,
                    ip,
                });
            }
            modes[param] = mode;
            divisor *= 10;
        }

        Ok(Self { opcode, modes })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode.mnemonic())?;
        for mode in &self.modes[..self.opcode.arity()] {
            write!(f, " {}", mode.tag())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_defaults_to_position_mode() {
        let instr = Instruction::decode(2, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Mul);
        assert_eq!(instr.modes, [Mode::Position; 3]);
    }

    #[test]
    fn decode_reads_mode_digits_in_order() {
        let instr = Instruction::decode(21002, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Mul);
        assert_eq!(instr.modes, [Mode::Position, Mode::Immediate, Mode::Relative]);

        let instr = Instruction::decode(1105, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::JumpIfTrue);
        assert_eq!(instr.modes[..2], [Mode::Immediate, Mode::Immediate]);
    }

    #[test]
    fn decode_relative_input_destination() {
        let instr = Instruction::decode(203, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Input);
        assert_eq!(instr.modes[0], Mode::Relative);
    }

    #[test]
    fn decode_unknown_opcode() {
        assert_eq!(
            Instruction::decode(1142, 7),
            Err(VMError::UnknownOpcode {
                word: 1142,
                opcode: 42,
                ip: 7
            })
        );
        assert!(matches!(
            Instruction::decode(0, 0),
            Err(VMError::UnknownOpcode { opcode: 0, .. })
        ));
        assert!(matches!(
            Instruction::decode(-1, 0),
            Err(VMError::UnknownOpcode { opcode: -1, .. })
        ));
    }

    #[test]
    fn decode_rejects_immediate_destination() {
        assert_eq!(
            Instruction::decode(11101, 4),
            Err(VMError::InvalidWriteMode {
                mnemonic: "ADD",
                param: 3,
                ip: 4
            })
        );
        assert!(matches!(
            Instruction::decode(103, 0),
            Err(VMError::InvalidWriteMode { param: 1, .. })
        ));
    }

    #[test]
    fn decode_rejects_unknown_mode_digit() {
        assert_eq!(
            Instruction::decode(304, 2),
            Err(VMError::InvalidMode {
                mode: 3,
                param: 1,
                ip: 2
            })
        );
    }

    #[test]
    fn decode_ignores_digits_beyond_arity() {
        let instr = Instruction::decode(99999, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Halt);
        let instr = Instruction::decode(90104, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Output);
        assert_eq!(instr.modes[0], Mode::Immediate);
    }

    #[test]
    fn display_lists_used_modes() {
        assert_eq!(Instruction::decode(21002, 0).unwrap().to_string(), "MUL p i r");
        assert_eq!(Instruction::decode(99, 0).unwrap().to_string(), "HALT");
    }
}
