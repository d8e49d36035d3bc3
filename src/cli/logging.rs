//! Console output gating for CLI commands
//!
//! Structured events go through `tracing`; this only decides what the user
//! sees on stdout.

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
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }
}

/// Print a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if allows(level, required) {
        println!("{msg}");
    }
}

fn allows(level: LogLevel, required: LogLevel) -> bool {
    level != LogLevel::Quiet && (level == required || required == LogLevel::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags_quiet_wins() {
        assert_eq!(LogLevel::from_flags(true, true), LogLevel::Quiet);
        assert_eq!(LogLevel::from_flags(false, true), LogLevel::Verbose);
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Normal);
    }

    #[test]
    fn test_allows() {
        assert!(allows(LogLevel::Normal, LogLevel::Normal));
        assert!(!allows(LogLevel::Normal, LogLevel::Verbose));
        assert!(allows(LogLevel::Verbose, LogLevel::Normal));
        assert!(allows(LogLevel::Verbose, LogLevel::Verbose));
        assert!(!allows(LogLevel::Quiet, LogLevel::Normal));
    }
}
