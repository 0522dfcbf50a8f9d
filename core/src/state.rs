use crate::constants::{
    ADDRESS_MASK, FONT_ADDRESS, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET, STACK_DEPTH,
};
use crate::frame_buffer::FrameBuffer;
use crate::opcode;

/// A snapshot of the Chip-8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry, borrow and collision flag
/// - (i) a 12-bit memory address register
///
/// Counter
/// - (pc) a 12-bit program counter; the address of the next instruction's high byte
///
/// Pointer
/// - (sp) the number of return addresses on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound) counting down at 60Hz
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x200 is reserved for the interpreter; the sprite sheet lives at 0x050
///     - 0x200..=0xFFF holds the program and its working memory
/// - 64x32 frame buffer
///
/// ## Input
/// - Emulation halts until a key is written to `register_needing_key`
#[derive(Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub register_needing_key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = FONT_ADDRESS as usize;
        memory[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: FrameBuffer::new(),
            draw_flag: false,
            register_needing_key: None,
        }
    }

    /// Reads a byte; addresses wrap at the 12-bit boundary
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDRESS_MASK) as usize]
    }

    /// Writes a byte; addresses wrap at the 12-bit boundary
    pub fn write(&mut self, addr: u16, value: u8) {
        self.memory[(addr & ADDRESS_MASK) as usize] = value;
    }

    /// Gets the opcode at `addr`.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn op_at(&self, addr: u16) -> u16 {
        opcode::from_bytes(self.read(addr), self.read(addr.wrapping_add(1)))
    }

    /// The value of register `x`; only the low nibble of `x` is significant
    pub fn reg(&self, x: u8) -> u8 {
        self.v[(x & 0xF) as usize]
    }

    pub fn set_reg(&mut self, x: u8, value: u8) {
        self.v[(x & 0xF) as usize] = value;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
