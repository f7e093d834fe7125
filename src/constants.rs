use std::time::Duration;

// Animation frame cadence (~60 Hz)
pub const FRAME_MS: u64 = 16;

// Frame-rate window, in samples
pub const FPS_CAPACITY: usize = 60;

// Clicks older than this are dropped from the CPS window
pub const CPS_WINDOW: Duration = Duration::from_secs(1);
pub const CPS_INTERVAL_MS: u64 = 80;

pub const METRICS_INTERVAL_MS: u64 = 1000;
pub const TYPING_DELAY_MS: u64 = 10;
pub const SUMMARY_TYPING_DELAY_MS: u64 = 8;

// Console scrollback
pub const MAX_CONSOLE_LINES: usize = 500;

pub const POINTER_SPEED_MIN: u32 = 1;
pub const POINTER_SPEED_MAX: u32 = 20;
pub const POINTER_SPEED_DEFAULT: u32 = 10;

// Bouncing ball track, in canvas units
pub const BALL_TRACK_WIDTH: f64 = 300.0;
pub const BALL_DIAMETER: f64 = 20.0;
pub const BALL_SPEED: f64 = 3.0;
pub const BALL_EDGE_MARGIN: f64 = 5.0;

pub const BANNER: &str = "DELTA DOS v1.0 | Build 2025-01.";
pub const WELCOME: &str = "Welcome to DELTA DOS. Press '/' for commands, 'q' to quit.";
