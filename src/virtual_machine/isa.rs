//! Instruction set definitions.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode table and hands it to a callback macro, so the table is written once
//! and every consumer (the [`Opcode`] enum, the static table check) is generated
//! from the same source.
//!
//! # Instruction format
//!
//! An instruction is one word followed by its parameters. The word's low two
//! decimal digits are the opcode; the hundreds, thousands and ten-thousands
//! digits are the addressing modes of parameters 1, 2 and 3.
//!
//! ```text
//!   1002,4,3,4   ->  opcode 02 (MUL), modes [position, immediate, position]
//! ```

use crate::virtual_machine::errors::VMError;

/// How an instruction uses one of its parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Param {
    /// The parameter is resolved to a value (any addressing mode).
    Read,
    /// The parameter is resolved to a destination address (never immediate).
    Write,
}

/// Invokes a callback macro with the complete opcode table.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            /// ADD a, b, dst ; dst = a + b
            Add = 1, "ADD" => [a: Read, b: Read, dst: Write],
            /// MUL a, b, dst ; dst = a * b
            Mul = 2, "MUL" => [a: Read, b: Read, dst: Write],
            /// IN dst ; dst = next input, suspends when the input queue is empty
            Input = 3, "IN" => [dst: Write],
            /// OUT a ; push a to the output queue
            Output = 4, "OUT" => [a: Read],
            /// JNZ a, target ; ip = target if a != 0
            JumpIfTrue = 5, "JNZ" => [a: Read, target: Read],
            /// JZ a, target ; ip = target if a == 0
            JumpIfFalse = 6, "JZ" => [a: Read, target: Read],
            /// LT a, b, dst ; dst = (a < b) as 0/1
            LessThan = 7, "LT" => [a: Read, b: Read, dst: Write],
            /// EQ a, b, dst ; dst = (a == b) as 0/1
            Equals = 8, "EQ" => [a: Read, b: Read, dst: Write],
            /// ARB a ; relative base += a
            AdjustRelativeBase = 9, "ARB" => [a: Read],
            /// HALT ; stop execution
            Halt = 99, "HALT" => [],
        }
    };
}

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $code:literal, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        /// The closed set of Intcode operations.
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $code,
            )*
        }

        impl TryFrom<i64> for Opcode {
            type Error = VMError;

            /// Maps a two-digit opcode to its operation.
            ///
            /// The returned error carries a zero `ip` and `word`; the decoder fills them in.
            fn try_from(value: i64) -> Result<Self, Self::Error> {
                match value {
                    $( $code => Ok(Opcode::$name), )*
                    _ => Err(VMError::UnknownOpcode {
                        word: value,
                        opcode: value,
                        ip: 0,
                    }),
                }
            }
        }

        impl Opcode {
            /// Returns the trace mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Returns how each parameter is used, in order.
            pub const fn params(&self) -> &'static [Param] {
                match self {
                    $( Opcode::$name => &[ $( Param::$kind ),* ], )*
                }
            }

            /// Returns the number of parameters.
            pub const fn arity(&self) -> usize {
                self.params().len()
            }

            /// Returns the instruction length in words, opcode word included.
            pub const fn width(&self) -> usize {
                1 + self.arity()
            }
        }
    };
}

for_each_opcode!(define_opcodes);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_try_from_known_codes() {
        assert_eq!(Opcode::try_from(1i64), Ok(Opcode::Add));
        assert_eq!(Opcode::try_from(9i64), Ok(Opcode::AdjustRelativeBase));
        assert_eq!(Opcode::try_from(99i64), Ok(Opcode::Halt));
    }

    #[test]
    fn opcode_try_from_invalid() {
        for code in [0i64, 10, 42, 98, -1] {
            assert!(matches!(
                Opcode::try_from(code),
                Err(VMError::UnknownOpcode { opcode, .. }) if opcode == code
            ));
        }
    }

    #[test]
    fn widths_match_the_instruction_format() {
        assert_eq!(Opcode::Add.width(), 4);
        assert_eq!(Opcode::Input.width(), 2);
        assert_eq!(Opcode::JumpIfFalse.width(), 3);
        assert_eq!(Opcode::Halt.width(), 1);
    }

    #[test]
    fn only_destinations_are_write_params() {
        assert_eq!(Opcode::Equals.params(), &[Param::Read, Param::Read, Param::Write]);
        assert_eq!(Opcode::Input.params(), &[Param::Write]);
        assert_eq!(Opcode::Output.params(), &[Param::Read]);
    }
}
