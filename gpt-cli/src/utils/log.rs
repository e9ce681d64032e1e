// SPDX-License-Identifier: MIT

//! Console backend for the `log` facade: `[gpt] ...` lines on stderr.

use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Errors only
    Quiet,
    /// Warnings and errors
    Normal,
    /// Everything the libraries report
    Verbose,
}

impl LogLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (_, true) => LogLevel::Quiet,
            (true, false) => LogLevel::Verbose,
            (false, false) => LogLevel::Normal,
        }
    }

    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::Error,
            LogLevel::Normal => LevelFilter::Warn,
            LogLevel::Verbose => LevelFilter::Debug,
        }
    }
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), &record.args().to_string());
        eprintln!("{line}");
    }

    fn flush(&self) {}
}

fn format_line(level: Level, msg: &str) -> String {
    match level {
        Level::Error => format!("[gpt] {} {msg}", "error:".red().bold()),
        Level::Warn => format!("[gpt] {} {msg}", "warning:".yellow().bold()),
        _ => format!("[gpt] {msg}"),
    }
}

/// Installs the console logger. Calling it twice keeps the first logger
/// and only updates the level.
pub fn set_log_level(level: LogLevel) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level.filter());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_to_level() {
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Normal);
        assert_eq!(LogLevel::from_flags(true, false), LogLevel::Verbose);
        assert_eq!(LogLevel::from_flags(false, true), LogLevel::Quiet);
        assert_eq!(LogLevel::Quiet.filter(), LevelFilter::Error);
    }

    #[test]
    fn lines_are_prefixed() {
        colored::control::set_override(false);
        assert_eq!(format_line(Level::Debug, "hello"), "[gpt] hello");
        assert_eq!(
            format_line(Level::Warn, "backup degraded"),
            "[gpt] warning: backup degraded"
        );
    }
}
