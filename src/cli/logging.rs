//! Logging utilities for CLI output

/// Log level for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    /// Level selected by the global `--quiet` / `--verbose` flags.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    /// Whether a message requiring `required` is printed at this level.
    pub fn permits(self, required: LogLevel) -> bool {
        self != LogLevel::Quiet && (self == required || required == LogLevel::Normal)
    }
}

/// Log a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level.permits(required) {
        println!("{msg}");
    }
}

/// Log a message prefixed with the local wall-clock time
pub fn log_with_time(level: LogLevel, required: LogLevel, msg: &str) {
    if level.permits(required) {
        println!("[{}] {msg}", timestamp());
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
