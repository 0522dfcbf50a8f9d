use std::time::Duration;

/// Addressable memory in bytes
pub const MEMORY_SIZE: usize = 4096;

/// The highest valid 12-bit address
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// Where ROMs are loaded and where execution starts
pub const PROGRAM_START: u16 = 0x200;

/// `0xFFF - 0x200`; the last byte of memory is left out, as it can't start an instruction
pub const MAX_PROGRAM_SIZE: usize = ADDRESS_MASK as usize - PROGRAM_START as usize;

/// Where the font sprite sheet lives inside the interpreter's reserved memory
pub const FONT_ADDRESS: u16 = 0x050;

/// Bytes per font glyph
pub const FONT_GLYPH_SIZE: u16 = 5;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Return addresses the stack can hold
pub const STACK_DEPTH: usize = 16;

/// The delay and sound timers count down at 60Hz regardless of CPU speed
pub const TIMER_HZ: u32 = 60;

/// Wall time between two timer decrements
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ as u64);

/// Chip-8 has no canonical clock speed; ~700 instructions per second suits most games
pub const DEFAULT_CLOCK_SPEED: u32 = 700;

/// The fastest supported CPU speed in instructions per second
pub const MAX_CLOCK_SPEED: u32 = 1_000_000;

/// # Sprite Sheet
/// Glyphs for the hexadecimal digits 0..F, each 4 pixels wide and 5 rows tall.
/// Only the high nibble of each row is lit.
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
#[rustfmt::skip]
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
