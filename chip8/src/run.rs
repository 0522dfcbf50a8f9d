use std::time::Instant;

use anyhow::Context;

use c8vm::constants::TIMER_PERIOD;
use c8vm::{Chip8, Clock, StepOutcome};
use c8vm_display::Display;

use crate::input::{Input, InputEvent};
use crate::settings::Settings;

/// Why the run loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The user asked to stop
    Quit,
    /// The program ran off the end of memory
    Halted,
    /// `Settings::frames` frames were run
    FrameLimit,
}

/// Drives a loaded Chip-8 until it halts, the user quits, or the frame limit is reached.
///
/// Each frame:
/// - applies pending input
/// - runs however many instructions the CPU clock owes, stopping early while awaiting a key
/// - ticks the timers however many times the 60Hz clock owes
/// - renders if the frame changed
///
/// Realtime frontends sleep out the rest of each 1/60s; headless runs simulate it.
/// Invalid opcodes are skipped; any other fault ends the run with an error.
///
/// # Arguments
/// * `chip8` a machine with a program loaded
/// * `display` where changed frames are rendered
/// * `input` polled once per frame
/// * `settings` speed, pacing and frame limit
pub fn run(
    chip8: &mut Chip8,
    display: &mut dyn Display,
    input: &mut dyn Input,
    settings: &Settings,
) -> anyhow::Result<Exit> {
    let realtime = settings.frontend.is_realtime();
    let mut clock = Clock::new(settings.ips);
    let mut frames: u64 = 0;
    let mut sounding = false;
    let mut last_frame = Instant::now();

    loop {
        if settings.frames.map_or(false, |limit| frames >= limit) {
            return Ok(Exit::FrameLimit);
        }

        for event in input.poll().context("reading input")? {
            match event {
                InputEvent::Quit => return Ok(Exit::Quit),
                InputEvent::Key { key, pressed } => chip8.key_event(key, pressed),
            }
        }

        let elapsed = if realtime {
            let now = Instant::now();
            let elapsed = now - last_frame;
            last_frame = now;
            elapsed
        } else {
            TIMER_PERIOD
        };
        let ticks = clock.advance(elapsed);

        let halted = step(chip8, ticks.steps)
            .with_context(|| format!("program stopped on frame {}", frames))?;
        for _ in 0..ticks.timer_ticks {
            chip8.tick_timers();
        }
        if chip8.sound_active() != sounding {
            sounding = !sounding;
            log::debug!("sound {}", if sounding { "on" } else { "off" });
        }

        if let Some(frame) = chip8.take_frame() {
            display.render(&frame).context("rendering frame")?;
        }
        if halted {
            log::info!("halted after {} frames", frames + 1);
            return Ok(Exit::Halted);
        }
        frames += 1;

        if realtime {
            let spent = last_frame.elapsed();
            if spent < TIMER_PERIOD {
                std::thread::sleep(TIMER_PERIOD - spent);
            }
        }
    }
}

/// Runs up to `steps` instructions and reports whether the program halted
fn step(chip8: &mut Chip8, steps: u32) -> Result<bool, c8vm::RuntimeFault> {
    for _ in 0..steps {
        match chip8.step() {
            Ok(StepOutcome::Executed(_)) => {}
            Ok(StepOutcome::AwaitingKey) => break,
            Ok(StepOutcome::Halted) => return Ok(true),
            Err(fault) if fault.is_recoverable() => {}
            Err(fault) => {
                log::error!("{}", fault);
                return Err(fault);
            }
        }
    }
    Ok(false)
}
