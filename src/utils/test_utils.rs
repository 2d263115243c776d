//! Test utilities for interpreter and orchestration tests.

#[cfg(test)]
pub mod utils {
    use crate::virtual_machine::program::Program;
    use crate::virtual_machine::vm::VM;

    /// Runs `words` with `inputs` queued and returns the VM for inspection.
    ///
    /// Panics if execution fails; use `VM::run` directly to test errors.
    pub fn run_words(words: &[i64], inputs: &[i64]) -> VM {
        let mut vm = VM::new();
        vm.run(&Program::from(words), inputs.iter().copied())
            .expect("vm run failed");
        vm
    }

    /// Runs `words` to completion and returns every output.
    pub fn outputs_of(words: &[i64], inputs: &[i64]) -> Vec<i64> {
        run_words(words, inputs).drain_outputs()
    }

    /// Runs `words` with a single input and returns the first output.
    pub fn first_output(words: &[i64], input: i64) -> i64 {
        run_words(words, &[input])
            .pop_output()
            .expect("program produced no output")
    }
}
