use std::{fs::File, path::PathBuf, sync::Once};

/// Logger configuration.
///
/// `filter` follows the `env_logger` filter syntax (e.g. "info",
/// "delta_dos=debug"). The terminal is owned by the UI while it runs, so
/// records only go somewhere when a log file is given.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub file: Option<PathBuf>,
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) -> std::io::Result<()> {
    let target = match &config.file {
        Some(path) => Some(File::create(path)?),
        None => None,
    };

    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match target {
            Some(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
                builder.write_style(env_logger::WriteStyle::Never);
                if let Some(filter) = config.filter.as_deref() {
                    builder.parse_filters(filter);
                } else if let Ok(filter) = std::env::var("RUST_LOG") {
                    builder.parse_filters(&filter);
                } else {
                    builder.filter_level(log::LevelFilter::Info);
                }
            }
            None => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }

        // a logger installed elsewhere (tests) wins.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });

    Ok(())
}
