pub use chip8::{Chip8, StepOutcome};
pub use clock::{Clock, Ticks};
pub use constants::DEFAULT_CLOCK_SPEED;
pub use error::{LoadError, RuntimeFault};
pub use frame_buffer::FrameBuffer;
pub use instruction::Instruction;

mod chip8;
mod clock;
pub mod constants;
mod error;
mod frame_buffer;
mod instruction;
mod opcode;
mod operations;
pub mod state;
