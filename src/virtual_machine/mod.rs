//! Suspendable Intcode interpreter.
//!
//! # Architecture
//!
//! - **Memory**: zero-indexed tape of `i64` words; reads past the end yield 0,
//!   writes past the end grow it
//! - **Decoder**: splits a word into an opcode and three parameter modes
//!   (position, immediate, relative)
//! - **Executor**: applies one of ten operations to memory, the instruction
//!   pointer and the relative base
//! - **Suspension**: an input instruction with an empty queue returns
//!   [`state::ExecState::NeedsInput`]; no threads or callbacks are involved
//!
//! # Modules
//!
//! - [`decoder`]: Instruction word decoding and addressing modes
//! - [`errors`]: Execution, parse and orchestration error types
//! - [`isa`]: Opcode table and per-opcode parameter layout
//! - [`program`]: Program words and comma-separated text parsing
//! - [`state`]: Execution state and configuration
//! - [`vm`]: The interpreter

pub mod decoder;
pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub(crate) mod memory;
pub mod program;
pub mod state;
pub mod vm;
