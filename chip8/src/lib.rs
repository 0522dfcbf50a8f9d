pub use input::{ConsoleInput, Input, InputEvent, ScriptedInput};
pub use keymap::keymap;
pub use run::{run, Exit};
pub use settings::{Frontend, Settings};

#[cfg(feature = "sdl")]
pub use input::SdlInput;

mod input;
mod keymap;
mod run;
mod settings;
