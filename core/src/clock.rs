use std::time::Duration;

use crate::constants::{MAX_CLOCK_SPEED, TIMER_PERIOD};

/// The most wall time a single `advance` will account for.
/// A host that stalls for longer (debugger, suspended laptop) resumes at normal speed instead of
/// replaying the whole gap.
pub const MAX_ELAPSED: Duration = Duration::from_millis(250);

/// Work owed to the interpreter for some slice of wall time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ticks {
    /// how many times to call `step`
    pub steps: u32,
    /// how many times to call `tick_timers`
    pub timer_ticks: u32,
}

/// # Clock
/// Chip-8 runs two independent clocks:
/// - the CPU, at whatever speed the host picks
/// - the delay and sound timers, always at 60Hz
///
/// Each clock has its own accumulator. Elapsed wall time is added to both and drained in whole
/// periods, so the number of timer ticks never depends on how many instructions ran.
#[derive(Debug, Clone)]
pub struct Clock {
    step_period: Duration,
    step_debt: Duration,
    timer_debt: Duration,
}

impl Clock {
    /// # Arguments
    /// * `instructions_per_second` the CPU speed, clamped to 1..=`MAX_CLOCK_SPEED`
    pub fn new(instructions_per_second: u32) -> Self {
        let ips = u64::from(instructions_per_second.clamp(1, MAX_CLOCK_SPEED));
        Clock {
            step_period: Duration::from_nanos(1_000_000_000 / ips),
            step_debt: Duration::ZERO,
            timer_debt: Duration::ZERO,
        }
    }

    pub fn step_period(&self) -> Duration {
        self.step_period
    }

    /// Accounts for `elapsed` wall time and returns the steps and timer ticks now due
    pub fn advance(&mut self, elapsed: Duration) -> Ticks {
        let elapsed = elapsed.min(MAX_ELAPSED);
        self.step_debt += elapsed;
        self.timer_debt += elapsed;

        Ticks {
            steps: drain(&mut self.step_debt, self.step_period),
            timer_ticks: drain(&mut self.timer_debt, TIMER_PERIOD),
        }
    }
}

/// Removes as many whole `period`s from `debt` as it holds and returns how many
fn drain(debt: &mut Duration, period: Duration) -> u32 {
    let whole = (debt.as_nanos() / period.as_nanos()) as u32;
    *debt -= period * whole;
    whole
}
