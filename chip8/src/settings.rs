use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use c8vm::constants::MAX_CLOCK_SPEED;
use c8vm::DEFAULT_CLOCK_SPEED;

/// Where frames go and where keys come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Frontend {
    /// Draw in the terminal and read keys from it
    Console,
    /// No input or output while running; print the last frame once `--frames` have run
    Headless,
    /// A scaled SDL2 window
    #[cfg(feature = "sdl")]
    Sdl,
}

impl Frontend {
    /// Whether the run loop should pace itself against the wall clock.
    /// Headless runs simulate 1/60s per frame as fast as they can.
    pub fn is_realtime(self) -> bool {
        !matches!(self, Frontend::Headless)
    }
}

/// Runs a Chip-8 program
#[derive(Debug, Clone, Parser)]
#[command(name = "c8vm", version, about, long_about = None)]
pub struct Settings {
    /// Path to the ROM file to run
    pub rom: PathBuf,

    /// Instructions per second
    #[arg(
        long,
        default_value_t = DEFAULT_CLOCK_SPEED,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_CLOCK_SPEED))
    )]
    pub ips: u32,

    #[arg(long, value_enum, default_value_t = Frontend::Console)]
    pub frontend: Frontend,

    /// Stop after this many 60Hz frames; required when headless
    #[arg(long, required_if_eq("frontend", "headless"))]
    pub frames: Option<u64>,

    /// Seed for the random number instruction, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["c8vm", "pong.ch8"]).unwrap();
        assert_eq!(settings.rom, PathBuf::from("pong.ch8"));
        assert_eq!(settings.ips, 700);
        assert_eq!(settings.frontend, Frontend::Console);
        assert_eq!(settings.frames, None);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_all_flags() {
        let settings = Settings::try_parse_from([
            "c8vm",
            "maze.ch8",
            "--ips",
            "1000",
            "--frontend",
            "headless",
            "--frames",
            "120",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(settings.ips, 1000);
        assert_eq!(settings.frontend, Frontend::Headless);
        assert!(!settings.frontend.is_realtime());
        assert_eq!(settings.frames, Some(120));
        assert_eq!(settings.seed, Some(7));
    }

    #[test]
    fn test_headless_requires_frame_limit() {
        let settings = Settings::try_parse_from(["c8vm", "a.ch8", "--frontend", "headless"]);
        assert!(settings.is_err());
    }

    #[test]
    fn test_ips_range() {
        assert!(Settings::try_parse_from(["c8vm", "a.ch8", "--ips", "0"]).is_err());
        assert!(Settings::try_parse_from(["c8vm", "a.ch8", "--ips", "2000000000"]).is_err());
        let fastest = Settings::try_parse_from(["c8vm", "a.ch8", "--ips", "1000000"]).unwrap();
        assert_eq!(fastest.ips, MAX_CLOCK_SPEED);
    }

    #[test]
    fn test_requires_rom() {
        assert!(Settings::try_parse_from(["c8vm"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_frontend() {
        assert!(Settings::try_parse_from(["c8vm", "a.ch8", "--frontend", "vga"]).is_err());
    }
}
