//! Chained VMs with feedback.
//!
//! Each stage is booted with its own configuration value (a "phase"), then a
//! signal is injected into the first stage. Every stage's outputs become the
//! next stage's inputs, and the last stage feeds the first, until the last
//! stage halts. A plain chain is the special case where every stage halts
//! after one pass.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::state::ExecState;
use crate::virtual_machine::vm::VM;
use crate::info;

/// A ring of VMs running the same program.
pub struct Pipeline {
    stages: Vec<VM>,
}

impl Pipeline {
    /// Boots one stage per phase, each with its phase as first input.
    pub fn new(program: &Program, phases: &[i64]) -> Result<Self, VMError> {
        if phases.is_empty() {
            return Err(VMError::EmptyPipeline);
        }
        let stages = phases
            .iter()
            .map(|&phase| -> Result<VM, VMError> {
                let mut vm = VM::new();
                vm.run(program, [phase])?;
                Ok(vm)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stages })
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[VM] {
        &self.stages
    }

    /// Feeds `signal` to the first stage and cycles until the last stage halts.
    ///
    /// Returns the last value emitted by the last stage. Fails with
    /// [`VMError::PipelineStalled`] if a full round moves no value and the
    /// last stage has not halted.
    pub fn run(&mut self, signal: i64) -> Result<i64, VMError> {
        let count = self.stages.len();
        let mut last_signal = None;
        self.stages[0].add_input(signal);

        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut moved = false;

            for i in 0..count {
                if self.stages[i].state().is_halted() {
                    continue;
                }
                let previous = (i + count - 1) % count;
                let forwarded = self.stages[previous].drain_outputs();
                if previous == count - 1 {
                    if let Some(&value) = forwarded.last() {
                        last_signal = Some(value);
                    }
                }
                moved |= !forwarded.is_empty();

                let stage = &mut self.stages[i];
                let before = stage.steps();
                stage.resume(forwarded)?;
                moved |= stage.steps() != before;
            }

            if self.stages[count - 1].state() == ExecState::Halted {
                break;
            }
            if !moved {
                return Err(VMError::PipelineStalled { rounds });
            }
        }

        if let Some(value) = self.stages[count - 1].outputs().last() {
            last_signal = Some(value);
        }
        info!("pipeline of {} stages settled after {} rounds", count, rounds);
        last_signal.ok_or(VMError::PipelineStalled { rounds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(words: &[i64]) -> Program {
        Program::from(words)
    }

    #[test]
    fn linear_chain_43210() {
        let p = program(&[3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0]);
        let mut pipeline = Pipeline::new(&p, &[4, 3, 2, 1, 0]).unwrap();
        assert_eq!(pipeline.run(0).unwrap(), 43210);
        assert!(pipeline.stages().iter().all(|vm| vm.state().is_halted()));
    }

    #[test]
    fn linear_chain_54321() {
        let p = program(&[
            3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23, 23, 4, 23,
            99, 0, 0,
        ]);
        let mut pipeline = Pipeline::new(&p, &[0, 1, 2, 3, 4]).unwrap();
        assert_eq!(pipeline.run(0).unwrap(), 54321);
    }

    #[test]
    fn feedback_loop_139629729() {
        let p = program(&[
            3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1,
            28, 1005, 28, 6, 99, 0, 0, 5,
        ]);
        let mut pipeline = Pipeline::new(&p, &[9, 8, 7, 6, 5]).unwrap();
        assert_eq!(pipeline.len(), 5);
        assert_eq!(pipeline.run(0).unwrap(), 139629729);
    }

    #[test]
    fn feedback_loop_18216() {
        let p = program(&[
            3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55, 26, 1001, 54,
            -5, 54, 1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001, 55, 1, 55, 2, 53, 55, 53, 4,
            53, 1001, 56, -1, 56, 1005, 56, 6, 99, 0, 0, 0, 0, 10,
        ]);
        let mut pipeline = Pipeline::new(&p, &[9, 7, 8, 5, 6]).unwrap();
        assert_eq!(pipeline.run(0).unwrap(), 18216);
    }

    #[test]
    fn single_stage_feeds_itself() {
        // Reads the phase, then doubles its input until it exceeds 100.
        // in p; loop: in x; x *= 2; out x; if x < 100 goto loop; halt
        let p = program(&[
            3, 100, 3, 101, 1002, 101, 2, 101, 4, 101, 1007, 101, 100, 102, 1005, 102, 2, 99,
        ]);
        let mut pipeline = Pipeline::new(&p, &[0]).unwrap();
        assert_eq!(pipeline.run(1).unwrap(), 128);
    }

    #[test]
    fn empty_pipeline_is_rejected() {
        let p = program(&[99]);
        assert!(matches!(Pipeline::new(&p, &[]), Err(VMError::EmptyPipeline)));
    }

    #[test]
    fn stalled_pipeline_is_detected() {
        // Every stage waits for two inputs per output, so the ring starves.
        let p = program(&[3, 100, 3, 101, 3, 102, 4, 102, 1105, 1, 4]);
        let mut pipeline = Pipeline::new(&p, &[0, 0]).unwrap();
        assert!(matches!(
            pipeline.run(1),
            Err(VMError::PipelineStalled { .. })
        ));
    }

    #[test]
    fn boot_errors_propagate() {
        let p = program(&[3, -1, 99]);
        assert!(matches!(
            Pipeline::new(&p, &[1]),
            Err(VMError::NegativeAddress { address: -1, ip: 0 })
        ));
    }
}
