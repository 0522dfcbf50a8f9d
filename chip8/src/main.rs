use std::fs;

use anyhow::Context;
use clap::Parser;

use c8vm::Chip8;
use c8vm_cli::{run, ConsoleInput, Exit, Frontend, ScriptedInput, Settings};
use c8vm_display::{ConsoleDisplay, NullDisplay};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let settings = Settings::parse();

    let rom = fs::read(&settings.rom)
        .with_context(|| format!("couldn't read ROM {}", settings.rom.display()))?;
    let mut chip8 = match settings.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };
    chip8
        .load(&rom)
        .with_context(|| format!("couldn't load {}", settings.rom.display()))?;
    log::info!("running {} at {} ips", settings.rom.display(), settings.ips);

    let exit: Exit = match settings.frontend {
        Frontend::Console => {
            // dropped in reverse: the screen is restored before raw mode is left
            let mut input = ConsoleInput::new()?;
            let mut display = ConsoleDisplay::new()?;
            run(&mut chip8, &mut display, &mut input, &settings)?
        }
        Frontend::Headless => {
            let exit = run(
                &mut chip8,
                &mut NullDisplay,
                &mut ScriptedInput::default(),
                &settings,
            )?;
            print!("{}", chip8.frame());
            exit
        }
        #[cfg(feature = "sdl")]
        Frontend::Sdl => {
            let sdl = sdl2::init().map_err(anyhow::Error::msg)?;
            let mut display = c8vm_display::SdlDisplay::new(&sdl)?;
            let mut input = c8vm_cli::SdlInput::new(&sdl)?;
            run(&mut chip8, &mut display, &mut input, &settings)?
        }
    };
    log::info!("stopped: {:?}", exit);
    Ok(())
}
