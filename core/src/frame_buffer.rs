use std::fmt;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// # Frame Buffer
/// The Chip-8 display is 64x32 monochrome pixels.
///
/// Pixels are stored row-major and indexed as `[y][x]`.
/// Only the draw and clear instructions mutate it; everything else gets a shared reference or a
/// copy, so a renderer on another thread can be handed a snapshot between steps.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        }
    }

    /// Turns every pixel off
    pub fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    }

    /// Whether the pixel at `x`, `y` is lit. Coordinates wrap like sprite drawing does.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH]
    }

    /// The rows of the display from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool; DISPLAY_WIDTH]> {
        self.pixels.iter()
    }

    /// Number of lit pixels
    pub fn lit(&self) -> usize {
        self.pixels.iter().flatten().filter(|p| **p).count()
    }

    /// XORs a sprite onto the display with its top left corner at `origin_x`, `origin_y`.
    ///
    /// Each byte of `sprite` is one 8-pixel row, most significant bit leftmost.
    /// Coordinates wrap around both edges rather than clipping.
    ///
    /// Returns whether any lit pixel was turned off.
    ///
    /// # Arguments
    /// * `origin_x` the column of the sprite's leftmost pixel
    /// * `origin_y` the row of the sprite's top row
    /// * `sprite` the rows of the sprite
    pub fn draw_sprite(&mut self, origin_x: usize, origin_y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (row, byte) in sprite.iter().enumerate() {
            let y = (origin_y + row) % DISPLAY_HEIGHT;
            for bit in 0..8 {
                let x = (origin_x + bit) % DISPLAY_WIDTH;
                let sprite_pixel = (byte >> (7 - bit)) & 0x1 == 0x1;
                let before = self.pixels[y][x];
                let after = before ^ sprite_pixel;
                collision |= before && !after;
                self.pixels[y][x] = after;
            }
        }
        collision
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, x: usize, y: usize, on: bool) {
        self.pixels[y][x] = on;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameBuffer({} lit)", self.lit())
    }
}

/// Renders the frame as text; one line per row, `█` for lit pixels.
impl fmt::Display for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &pixel in row.iter() {
                f.write_str(if pixel { "█" } else { " " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
