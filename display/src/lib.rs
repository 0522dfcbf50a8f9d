//! Sinks that present Chip-8 frames.
//!
//! The interpreter never draws anything itself. A driving loop takes a `FrameBuffer` snapshot
//! whenever the frame changes and hands it to one of these.

use c8vm::FrameBuffer;
use thiserror::Error;

pub use console::ConsoleDisplay;
pub use text::{NullDisplay, TextDisplay};

#[cfg(feature = "sdl")]
pub use sdl::SdlDisplay;

mod console;
#[cfg(feature = "sdl")]
mod sdl;
mod text;

/// Scale factor for windowed displays; each Chip-8 pixel becomes a SCALE x SCALE square
pub const SCALE: usize = 10;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed writing to the terminal")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "sdl")]
    #[error("sdl: {0}")]
    Sdl(String),
}

/// # Display
/// Anything that can show a Chip-8 frame.
///
/// `render` only gets called when the frame buffer changed, so implementations can redraw the
/// whole frame every time.
pub trait Display {
    fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError>;
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        (**self).render(frame)
    }
}
