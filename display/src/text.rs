use std::io::Write;

use c8vm::FrameBuffer;

use crate::{Display, DisplayError};

/// Writes every rendered frame to `W` as a text grid followed by a blank line
pub struct TextDisplay<W: Write> {
    out: W,
    frames: usize,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        TextDisplay { out, frames: 0 }
    }

    /// How many frames have been rendered
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for TextDisplay<W> {
    fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        writeln!(self.out, "{}", frame)?;
        self.out.flush()?;
        self.frames += 1;
        Ok(())
    }
}

/// Discards frames; for runs where only the final frame matters
#[derive(Debug, Default)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn render(&mut self, _frame: &FrameBuffer) -> Result<(), DisplayError> {
        Ok(())
    }
}
