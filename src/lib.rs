//! Intcode interpreter library.
//!
//! Provides a suspendable virtual machine for the Intcode instruction set and
//! helpers for wiring several machines together.

pub mod network;
pub mod utils;
pub mod virtual_machine;
