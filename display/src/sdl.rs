use sdl2::pixels::PixelFormatEnum;

use c8vm::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use c8vm::FrameBuffer;

use crate::{Display, DisplayError, SCALE};

/// # SDL Display
/// A window showing the 64x32 frame scaled up by `SCALE`.
pub struct SdlDisplay {
    canvas: sdl2::render::WindowCanvas,
    width: usize,
    height: usize,
}

impl SdlDisplay {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    pub fn new(sdl: &sdl2::Sdl) -> Result<Self, DisplayError> {
        let video_subsystem = sdl.video().map_err(DisplayError::Sdl)?;
        let window = video_subsystem
            .window(
                "c8vm",
                (DISPLAY_WIDTH * SCALE) as u32,
                (DISPLAY_HEIGHT * SCALE) as u32,
            )
            .position_centered()
            .opengl()
            .build()
            .map_err(|e| DisplayError::Sdl(e.to_string()))?;
        let canvas = window
            .into_canvas()
            .build()
            .map_err(|e| DisplayError::Sdl(e.to_string()))?;

        Ok(SdlDisplay {
            canvas,
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
        })
    }

    /// Formats a Chip-8 FrameBuffer for rendering as an SDL2 texture.
    ///
    /// An SDL2 texture is a 1D array of ints that represent concatenated rows of RGB pixels.
    ///
    /// This creates a black and white rendering by:
    /// - Flattening the frame buffer's rows into one sequence of pixels
    /// - Triplicating each pixel to represent its RGB values
    /// - Mapping lit pixels to full intensity and unlit ones to 0
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    fn frame_to_sdl_texture(frame: &FrameBuffer) -> Vec<u8> {
        frame
            .rows()
            .flat_map(|row| row.iter())
            .flat_map(|&on| std::iter::repeat(if on { 255 } else { 0 }).take(3))
            .collect()
    }
}

impl Display for SdlDisplay {
    /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
    fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGB24,
                self.width as u32,
                self.height as u32,
            )
            .map_err(|e| DisplayError::Sdl(e.to_string()))?;

        let pixels = SdlDisplay::frame_to_sdl_texture(frame);
        texture
            .with_lock(None, |buffer: &mut [u8], _pitch: usize| {
                buffer.copy_from_slice(&pixels);
            })
            .map_err(DisplayError::Sdl)?;

        self.canvas
            .copy(&texture, None, None)
            .map_err(DisplayError::Sdl)?;
        self.canvas.present();
        Ok(())
    }
}
