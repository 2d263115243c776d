use intcode_derive::Error;

/// Errors raised while loading, running or orchestrating Intcode programs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMError {
    /// The low two digits of an instruction word name no known operation.
    #[error("unknown opcode {opcode} in instruction word {word} at ip {ip}")]
    UnknownOpcode { word: i64, opcode: i64, ip: usize },
    /// A parameter mode digit is not 0 (position), 1 (immediate) or 2 (relative).
    #[error("invalid addressing mode {mode} for parameter {param} at ip {ip}")]
    InvalidMode { mode: i64, param: usize, ip: usize },
    /// A write destination was encoded in immediate mode.
    #[error("{mnemonic} parameter {param} at ip {ip} is a write destination and cannot be immediate")]
    InvalidWriteMode {
        mnemonic: &'static str,
        param: usize,
        ip: usize,
    },
    /// A position, relative or jump address resolved below zero.
    #[error("negative address {address} at ip {ip}")]
    NegativeAddress { address: i64, ip: usize },
    /// Address arithmetic left the representable range.
    #[error("address computation overflowed at ip {ip}")]
    AddressOverflow { ip: usize },
    /// A write would grow memory past the configured limit.
    #[error("write to address {address} exceeds the memory limit of {limit} words")]
    MemoryLimitExceeded { address: usize, limit: usize },
    /// `pop_output` was called with nothing queued.
    #[error("output queue is empty")]
    EmptyOutputPop,
    /// `resume` was called before any program was loaded.
    #[error("no program loaded")]
    NoProgramLoaded,
    /// Program text contained a token that is not a signed 64-bit integer.
    #[error("invalid program token {token:?} at index {index}")]
    ParseError { token: String, index: usize },
    /// A pipeline was built without stages.
    #[error("pipeline requires at least one stage")]
    EmptyPipeline,
    /// Every pipeline stage is waiting for input that will never arrive.
    #[error("pipeline stalled after {rounds} rounds")]
    PipelineStalled { rounds: usize },
}
