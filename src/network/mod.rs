//! Orchestration of several VMs in one process.
//!
//! Each [`VM`](crate::virtual_machine::vm::VM) stays single-threaded and
//! private; these helpers only move values between output and input queues and
//! call `resume` in turn, relying on the guarantee that queued input is never
//! lost or reordered across suspensions.
//!
//! - [`pipeline`]: stages in a ring, each feeding the next
//! - [`router`]: addressable nodes exchanging `(dest, x, y)` packets

pub mod pipeline;
pub mod router;
