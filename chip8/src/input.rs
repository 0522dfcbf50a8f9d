use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use crate::keymap::keymap;

/// How long a console key counts as held when the terminal can't report releases
const CONSOLE_HOLD: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A keypad key changed state
    Key { key: u8, pressed: bool },
    /// The user asked to stop
    Quit,
}

/// Reads host input without blocking.
/// The run loop polls once per frame.
pub trait Input {
    fn poll(&mut self) -> anyhow::Result<Vec<InputEvent>>;
}

/// # Console Input
/// Reads keys from the terminal in raw mode.
///
/// Most terminals only report presses. When that's the case each press is released again after
/// `CONSOLE_HOLD`, and the terminal's own key repeat keeps a held key down.
/// Escape or Ctrl-C quits.
pub struct ConsoleInput {
    reports_release: bool,
    held: [Option<Instant>; 16],
}

impl ConsoleInput {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;
        let reports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if reports_release {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::debug!("console input, key releases reported: {}", reports_release);
        Ok(ConsoleInput {
            reports_release,
            held: [None; 16],
        })
    }

    fn key(&mut self, key: KeyEvent, events: &mut Vec<InputEvent>) {
        let quit = key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
        if quit {
            events.push(InputEvent::Quit);
            return;
        }
        let KeyCode::Char(c) = key.code else {
            return;
        };
        let Some(mapped) = keymap(c) else {
            log::warn!("{:?} isn't mapped to a keypad key", c);
            return;
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.held[mapped as usize] = Some(Instant::now());
                events.push(InputEvent::Key {
                    key: mapped,
                    pressed: true,
                });
            }
            KeyEventKind::Release => {
                self.held[mapped as usize] = None;
                events.push(InputEvent::Key {
                    key: mapped,
                    pressed: false,
                });
            }
        }
    }

    fn release_stale(&mut self, events: &mut Vec<InputEvent>) {
        for (key, held) in self.held.iter_mut().enumerate() {
            if held.map_or(false, |since| since.elapsed() >= CONSOLE_HOLD) {
                *held = None;
                events.push(InputEvent::Key {
                    key: key as u8,
                    pressed: false,
                });
            }
        }
    }
}

impl Input for ConsoleInput {
    fn poll(&mut self) -> anyhow::Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                self.key(key, &mut events);
            }
        }
        if !self.reports_release {
            self.release_stale(&mut events);
        }
        Ok(events)
    }
}

impl Drop for ConsoleInput {
    fn drop(&mut self) {
        if self.reports_release {
            if let Err(e) = execute!(io::stdout(), PopKeyboardEnhancementFlags) {
                log::error!("couldn't restore keyboard reporting: {}", e);
            }
        }
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("couldn't leave raw mode: {}", e);
        }
    }
}

/// Keys from an SDL window's event pump
#[cfg(feature = "sdl")]
pub struct SdlInput {
    events: sdl2::EventPump,
}

#[cfg(feature = "sdl")]
impl SdlInput {
    pub fn new(sdl: &sdl2::Sdl) -> anyhow::Result<Self> {
        let events = sdl.event_pump().map_err(anyhow::Error::msg)?;
        Ok(SdlInput { events })
    }
}

#[cfg(feature = "sdl")]
impl Input for SdlInput {
    fn poll(&mut self) -> anyhow::Result<Vec<InputEvent>> {
        use sdl2::event::Event;
        use sdl2::keyboard::Keycode;

        use crate::keymap::sdl_keymap;

        let mut events = Vec::new();
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => {
                    if let Some(key) = sdl_keymap(key) {
                        events.push(InputEvent::Key { key, pressed: true });
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(key) = sdl_keymap(key) {
                        events.push(InputEvent::Key {
                            key,
                            pressed: false,
                        });
                    }
                }
                _ => continue,
            }
        }
        Ok(events)
    }
}

/// Replays a fixed script of events, for headless runs and tests.
/// Each entry fires on the given poll, counting from 0; one poll happens per frame.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    script: VecDeque<(u64, InputEvent)>,
    polls: u64,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = (u64, InputEvent)>) -> Self {
        let mut script: Vec<_> = script.into_iter().collect();
        script.sort_by_key(|(frame, _)| *frame);
        ScriptedInput {
            script: script.into(),
            polls: 0,
        }
    }

    /// Whether every scripted event has fired
    pub fn is_finished(&self) -> bool {
        self.script.is_empty()
    }
}

impl Input for ScriptedInput {
    fn poll(&mut self) -> anyhow::Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        while let Some((frame, event)) = self.script.front().copied() {
            if frame > self.polls {
                break;
            }
            self.script.pop_front();
            events.push(event);
        }
        self.polls += 1;
        Ok(events)
    }
}
