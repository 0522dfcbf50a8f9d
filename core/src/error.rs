use thiserror::Error;

use crate::constants::MAX_PROGRAM_SIZE;

/// Reasons a program can't be loaded.
/// None of these touch the interpreter, so the caller may simply try another ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("program is {size} bytes but at most {max} bytes fit in memory", max = MAX_PROGRAM_SIZE)]
    ProgramTooLarge { size: usize },
}

/// Faults raised while executing a program.
///
/// Stack faults mean the program is malformed; the interpreter stops advancing once it hits one.
/// An invalid opcode is skipped like a no-op and only reported so the host can decide what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeFault {
    #[error("call at {address:#05X} overflowed the stack")]
    StackOverflow { address: u16 },

    #[error("return at {address:#05X} with an empty stack")]
    StackUnderflow { address: u16 },

    #[error("unknown opcode {opcode:#06X} at {address:#05X}")]
    InvalidOpcode { opcode: u16, address: u16 },
}

impl RuntimeFault {
    /// Whether execution can carry on after this fault
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RuntimeFault::InvalidOpcode { .. })
    }
}
