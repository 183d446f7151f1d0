//! Logging initialization for clipper_app.
//!
//! Writes logs to `./clipper.log` in the current working directory.

use std::fs::File;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

const LOG_FILE: &str = "./clipper.log";

/// Destination for log output.
#[allow(dead_code)]
pub enum LogDestination {
    File,
    Terminal,
    Both,
}

/// Initialize the logger with the specified destination. A file destination
/// that cannot be created is skipped with a warning on stderr.
pub fn initialize(destination: LogDestination) {
    let level = LevelFilter::Info;
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        match File::create(LOG_FILE) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => eprintln!("Warning: Could not create log file at {LOG_FILE}: {err}"),
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}
