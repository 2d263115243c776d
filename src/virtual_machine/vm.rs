//! Core interpreter.
//!
//! A [`VM`] owns a private memory tape, instruction pointer, relative base and
//! FIFO input/output queues. Execution is synchronous and single-threaded; the
//! only suspension point is an input instruction meeting an empty input queue,
//! which returns [`ExecState::NeedsInput`] with the instruction pointer still on
//! that instruction. Feeding more input and calling [`VM::resume`] retries it.
//!
//! Arithmetic wraps on overflow instead of panicking.

use crate::virtual_machine::decoder::{Instruction, Mode};
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Opcode;
use crate::virtual_machine::memory::Memory;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::state::{Config, ExecState};
use crate::{debug, warn};
use std::collections::VecDeque;

/// Outcome of a single executed instruction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Step {
    /// Keep executing.
    Next,
    /// Input queue empty; nothing was changed.
    Suspend,
    /// `HALT` executed.
    Halt,
}

/// Intcode virtual machine.
pub struct VM {
    /// Working copy of the loaded program.
    memory: Memory,
    /// Address of the next instruction word.
    ip: usize,
    /// Offset applied to relative-mode parameters.
    relative_base: i64,
    inputs: VecDeque<i64>,
    outputs: VecDeque<i64>,
    state: ExecState,
    /// Set by the first load; `resume` refuses to run before it.
    loaded: bool,
    /// Instructions executed since the last load.
    steps: u64,
    config: Config,
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl VM {
    /// Creates an empty VM with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty VM with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            memory: Memory::new(Vec::new(), config.memory_limit),
            ip: 0,
            relative_base: 0,
            inputs: VecDeque::new(),
            outputs: VecDeque::new(),
            state: ExecState::NotStarted,
            loaded: false,
            steps: 0,
            config,
        }
    }

    /// Loads `program` and runs it with `inputs` queued.
    ///
    /// Memory is reset to a copy of the program, both queues are cleared, and
    /// the instruction pointer and relative base are reset to 0 before
    /// executing. Returns once the program halts or needs more input.
    pub fn run<I>(&mut self, program: &Program, inputs: I) -> Result<ExecState, VMError>
    where
        I: IntoIterator<Item = i64>,
    {
        self.load(program);
        self.inputs.extend(inputs);
        self.execute()
    }

    /// Appends `inputs` to the input queue and continues execution.
    ///
    /// Resuming a halted program is a no-op that returns
    /// [`ExecState::Halted`]; the inputs stay queued. Resuming after a fatal
    /// error re-executes the faulting instruction.
    pub fn resume<I>(&mut self, inputs: I) -> Result<ExecState, VMError>
    where
        I: IntoIterator<Item = i64>,
    {
        self.inputs.extend(inputs);
        if !self.loaded {
            return Err(VMError::NoProgramLoaded);
        }
        if self.state.is_halted() {
            warn!("resume called on a halted program (ip {})", self.ip);
            return Ok(ExecState::Halted);
        }
        self.execute()
    }

    /// Queues one input value without executing anything.
    pub fn add_input(&mut self, value: i64) {
        self.inputs.push_back(value);
    }

    /// Removes and returns the oldest output.
    pub fn pop_output(&mut self) -> Result<i64, VMError> {
        self.outputs.pop_front().ok_or(VMError::EmptyOutputPop)
    }

    /// Iterates over queued outputs, oldest first, without consuming them.
    pub fn outputs(&self) -> impl ExactSizeIterator<Item = i64> + '_ {
        self.outputs.iter().copied()
    }

    /// Removes and returns every queued output, oldest first.
    pub fn drain_outputs(&mut self) -> Vec<i64> {
        self.outputs.drain(..).collect()
    }

    pub fn clear_outputs(&mut self) {
        self.outputs.clear();
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Returns a copy of the backed portion of memory.
    pub fn snapshot_memory(&self) -> Vec<i64> {
        self.memory.as_slice().to_vec()
    }

    /// Reads one memory word; unwritten addresses read as 0.
    pub fn read(&self, address: usize) -> i64 {
        self.memory.read(address)
    }

    /// Returns the state reached by the last `run` or `resume`.
    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn load(&mut self, program: &Program) {
        self.memory = Memory::new(program.words().to_vec(), self.config.memory_limit);
        self.ip = 0;
        self.relative_base = 0;
        self.inputs.clear();
        self.outputs.clear();
        self.state = ExecState::NotStarted;
        self.loaded = true;
        self.steps = 0;
    }

    /// Executes instructions until a halt, a suspension or an error.
    fn execute(&mut self) -> Result<ExecState, VMError> {
        loop {
            match self.step()? {
                Step::Next => {}
                Step::Suspend => {
                    if self.config.trace {
                        debug!("{:04} suspended waiting for input", self.ip);
                    }
                    self.state = ExecState::NeedsInput;
                    return Ok(self.state);
                }
                Step::Halt => {
                    if self.config.trace {
                        debug!("{:04} halted after {} steps", self.ip, self.steps);
                    }
                    self.state = ExecState::Halted;
                    return Ok(self.state);
                }
            }
        }
    }

    /// Decodes and executes the instruction at the instruction pointer.
    fn step(&mut self) -> Result<Step, VMError> {
        let instr = Instruction::decode(self.memory.read(self.ip), self.ip)?;
        if self.config.trace {
            self.trace(&instr);
        }

        let step = match instr.opcode {
            Opcode::Add => self.op_add(&instr)?,
            Opcode::Mul => self.op_mul(&instr)?,
            Opcode::Input => self.op_input(&instr)?,
            Opcode::Output => self.op_output(&instr)?,
            Opcode::JumpIfTrue => self.op_jump_if_true(&instr)?,
            Opcode::JumpIfFalse => self.op_jump_if_false(&instr)?,
            Opcode::LessThan => self.op_less_than(&instr)?,
            Opcode::Equals => self.op_equals(&instr)?,
            Opcode::AdjustRelativeBase => self.op_adjust_relative_base(&instr)?,
            Opcode::Halt => Step::Halt,
        };

        if step != Step::Suspend {
            self.steps += 1;
        }
        Ok(step)
    }

    fn trace(&self, instr: &Instruction) {
        let params: Vec<String> = (0..instr.opcode.arity())
            .map(|i| self.raw_param(i).to_string())
            .collect();
        debug!(
            "{:04} {:<12} [{}] rb={}",
            self.ip,
            instr.to_string(),
            params.join(", "),
            self.relative_base
        );
    }

    /// Returns parameter `index` (0-based) exactly as stored.
    fn raw_param(&self, index: usize) -> i64 {
        self.memory.read(self.ip.saturating_add(1 + index))
    }

    /// Converts a computed address to a memory index.
    fn to_address(&self, address: i64) -> Result<usize, VMError> {
        if address < 0 {
            return Err(VMError::NegativeAddress {
                address,
                ip: self.ip,
            });
        }
        usize::try_from(address).map_err(|_| VMError::AddressOverflow { ip: self.ip })
    }

    /// Resolves parameter `index` to the address it refers to.
    fn param_address(&self, instr: &Instruction, index: usize) -> Result<usize, VMError> {
        let raw = self.raw_param(index);
        let address = match instr.modes[index] {
            Mode::Position => raw,
            Mode::Relative => self
                .relative_base
                .checked_add(raw)
                .ok_or(VMError::AddressOverflow { ip: self.ip })?,
            Mode::Immediate => {
                return Err(VMError::InvalidWriteMode {
                    mnemonic: instr.opcode.mnemonic(),
                    param: index + 1,
                    ip: self.ip,
                });
            }
        };
        self.to_address(address)
    }

    /// Resolves parameter `index` to a value.
    fn read_param(&self, instr: &Instruction, index: usize) -> Result<i64, VMError> {
        match instr.modes[index] {
            Mode::Immediate => Ok(self.raw_param(index)),
            _ => Ok(self.memory.read(self.param_address(instr, index)?)),
        }
    }

    /// Stores `value` at the address named by parameter `index`.
    fn write_param(&mut self, instr: &Instruction, index: usize, value: i64) -> Result<(), VMError> {
        let address = self.param_address(instr, index)?;
        self.memory.write(address, value)
    }

    /// Shared body of the three-parameter `dst = f(a, b)` instructions.
    fn binary_op(
        &mut self,
        instr: &Instruction,
        f: impl Fn(i64, i64) -> i64,
    ) -> Result<Step, VMError> {
        let a = self.read_param(instr, 0)?;
        let b = self.read_param(instr, 1)?;
        self.write_param(instr, 2, f(a, b))?;
        self.ip += instr.opcode.width();
        Ok(Step::Next)
    }

    /// Shared body of the conditional jumps.
    fn jump_if(&mut self, instr: &Instruction, taken: impl Fn(i64) -> bool) -> Result<Step, VMError> {
        let value = self.read_param(instr, 0)?;
        let target = self.read_param(instr, 1)?;
        if taken(value) {
            self.ip = self.to_address(target)?;
        } else {
            self.ip += instr.opcode.width();
        }
        Ok(Step::Next)
    }

    fn op_add(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        self.binary_op(instr, i64::wrapping_add)
    }

    fn op_mul(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        self.binary_op(instr, i64::wrapping_mul)
    }

    fn op_input(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        let Some(&value) = self.inputs.front() else {
            return Ok(Step::Suspend);
        };
        // Resolve before dequeuing so a faulting destination keeps the input.
        self.write_param(instr, 0, value)?;
        self.inputs.pop_front();
        self.ip += instr.opcode.width();
        Ok(Step::Next)
    }

    fn op_output(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        let value = self.read_param(instr, 0)?;
        self.outputs.push_back(value);
        self.ip += instr.opcode.width();
        Ok(Step::Next)
    }

    fn op_jump_if_true(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        self.jump_if(instr, |v| v != 0)
    }

    fn op_jump_if_false(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        self.jump_if(instr, |v| v == 0)
    }

    fn op_less_than(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        self.binary_op(instr, |a, b| (a < b) as i64)
    }

    fn op_equals(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        self.binary_op(instr, |a, b| (a == b) as i64)
    }

    fn op_adjust_relative_base(&mut self, instr: &Instruction) -> Result<Step, VMError> {
        let delta = self.read_param(instr, 0)?;
        self.relative_base = self
            .relative_base
            .checked_add(delta)
            .ok_or(VMError::AddressOverflow { ip: self.ip })?;
        self.ip += instr.opcode.width();
        Ok(Step::Next)
    }
}
