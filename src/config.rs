use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    constants::{CPS_INTERVAL_MS, FRAME_MS, METRICS_INTERVAL_MS, TYPING_DELAY_MS},
    maintenance::default_temp_dir,
};

#[derive(Debug, Parser)]
#[command(name = "delta-dos")]
#[command(about = "Retro terminal dashboard: device info, FPS and CPS meters, speed boosts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Animation frame period in milliseconds
    #[arg(long, default_value_t = FRAME_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_ms: u64,

    /// CPS sampling period in milliseconds
    #[arg(long, default_value_t = CPS_INTERVAL_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub cps_interval_ms: u64,

    /// CPU/RAM sampling period in milliseconds
    #[arg(long, default_value_t = METRICS_INTERVAL_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub metrics_interval_ms: u64,

    /// Console typing delay per character in milliseconds
    #[arg(long, default_value_t = TYPING_DELAY_MS)]
    pub typing_delay_ms: u64,

    /// Directory swept by "Clear Temp Files" (defaults to the OS temp dir)
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, env_logger syntax (overrides RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// runtime settings resolved from the command line.
#[derive(Clone, Debug)]
pub struct Config {
    pub frame: Duration,
    pub cps_interval: Duration,
    pub metrics_interval: Duration,
    pub typing_delay: Duration,
    pub temp_dir: PathBuf,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            frame: Duration::from_millis(cli.frame_ms),
            cps_interval: Duration::from_millis(cli.cps_interval_ms),
            metrics_interval: Duration::from_millis(cli.metrics_interval_ms),
            typing_delay: Duration::from_millis(cli.typing_delay_ms),
            temp_dir: cli.temp_dir.clone().unwrap_or_else(default_temp_dir),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame: Duration::from_millis(FRAME_MS),
            cps_interval: Duration::from_millis(CPS_INTERVAL_MS),
            metrics_interval: Duration::from_millis(METRICS_INTERVAL_MS),
            typing_delay: Duration::from_millis(TYPING_DELAY_MS),
            temp_dir: default_temp_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_constants() {
        let cli = Cli::try_parse_from(["delta-dos"]).unwrap();
        let config = Config::from(&cli);
        assert_eq!(config.frame, Duration::from_millis(16));
        assert_eq!(config.cps_interval, Duration::from_millis(80));
        assert_eq!(config.metrics_interval, Duration::from_secs(1));
        assert_eq!(config.temp_dir, default_temp_dir());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "delta-dos",
            "--cps-interval-ms",
            "40",
            "--temp-dir",
            "/scratch",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = Config::from(&cli);
        assert_eq!(config.cps_interval, Duration::from_millis(40));
        assert_eq!(config.temp_dir, PathBuf::from("/scratch"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn zero_periods_are_rejected() {
        assert!(Cli::try_parse_from(["delta-dos", "--frame-ms", "0"]).is_err());
    }
}
