use std::io::{self, Stdout, Write};

use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};

use c8vm::FrameBuffer;

use crate::{Display, DisplayError};

/// # Console Display
/// Draws frames in place on the terminal using `█` for lit pixels.
///
/// Takes over the alternate screen and hides the cursor until dropped. Rows are positioned
/// explicitly since a raw mode terminal doesn't return the carriage on newline.
pub struct ConsoleDisplay {
    out: Stdout,
}

impl ConsoleDisplay {
    pub fn new() -> Result<Self, DisplayError> {
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        Ok(ConsoleDisplay { out })
    }
}

impl Display for ConsoleDisplay {
    fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let text = frame.to_string();
        for (y, row) in text.lines().enumerate() {
            queue!(self.out, cursor::MoveTo(0, y as u16), Print(row))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for ConsoleDisplay {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, cursor::Show, LeaveAlternateScreen) {
            log::error!("couldn't restore the terminal: {}", e);
        }
    }
}
