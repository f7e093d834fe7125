mod app;
mod bounce;
mod clock;
mod command;
mod config;
mod console;
mod constants;
mod cps;
mod error;
mod fps;
mod logging;
mod maintenance;
mod metrics;
mod pointer;
mod ticker;
mod ui;
mod util;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;

use crate::{
    app::App,
    config::{Cli, Config},
    logging::{init_logging, LoggingConfig},
    metrics::SysinfoSource,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        filter: cli.log_level.clone(),
        file: cli.log_file.clone(),
    })
    .context("cannot open log file")?;

    let config = Config::from(&cli);
    log::info!("starting with {config:?}");

    // SIGINT sent from outside; ctrl-c typed in raw mode arrives as a key event
    let quit = Arc::new(AtomicBool::new(false));
    let quit_flag = Arc::clone(&quit);
    ctrlc::set_handler(move || quit_flag.store(true, Ordering::SeqCst))
        .context("cannot install signal handler")?;

    let frame = config.frame;
    let app = App::new(config, SysinfoSource::new()).context("cannot start metrics sampler")?;

    ui::run(app, frame, quit).context("terminal ui failed")?;

    log::info!("bye");
    Ok(())
}
