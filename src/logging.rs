//! Logger initialization.
//!
//! The TUI owns the terminal, so it logs to a file. One-shot commands log
//! warnings and errors to stderr.

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Destination for log output.
pub enum LogDestination<'a> {
    /// Write to the given file, truncating it.
    File(&'a Path),
    /// Write to stderr.
    Stderr,
}

/// Initialize the global logger. Safe to call more than once.
pub fn initialize(destination: LogDestination<'_>, level: &str) {
    let level = parse_level(level);
    let config = build_config();

    let logger: Box<dyn SharedLogger> = match destination {
        LogDestination::File(path) => match File::create(path) {
            Ok(file) => WriteLogger::new(level, config, file),
            Err(err) => {
                eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
                return;
            }
        },
        LogDestination::Stderr => TermLogger::new(
            level.min(LevelFilter::Warn),
            config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    };

    let _ = CombinedLogger::init(vec![logger]);
}

/// Parse a level name, falling back to `Info` for unknown names
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str("bookwise")
        .build()
}
