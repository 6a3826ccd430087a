//! Logging types and configuration.

/// Severity of a job log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Very verbose tracing.
    Trace,
    /// Diagnostic detail, kept out of the console sink by default.
    Debug,
    /// Normal progress.
    #[default]
    Info,
    /// Something degraded but the run continues.
    Warn,
    /// The run is failing.
    Error,
}

impl LogLevel {
    /// Directive string for a tracing `EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Behavior knobs for the per-job logger.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level forwarded to the console sink.
    pub level: LogLevel,
    /// Compact mode: collapse progress updates and buffer tool output,
    /// showing the tail only on failure.
    pub compact: bool,
    /// Progress bucket size, in percent, for compact mode.
    pub progress_step: u32,
    /// How many buffered tool-output lines to keep for the failure tail.
    pub error_tail: usize,
    /// Prefix each line with a timestamp.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            progress_step: 20,
            error_tail: 20,
            show_timestamps: true,
        }
    }
}

impl LogConfig {
    /// Verbose configuration: debug level, no compact filtering.
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
            compact: false,
            progress_step: 10,
            error_tail: 50,
            show_timestamps: true,
        }
    }
}

/// Type alias for the log sink callback.
///
/// The sink receives each formatted log line; the CLI installs one that
/// prints to stdout.
pub type LogSink = Box<dyn Fn(&str) + Send + Sync>;

/// Line prefixes for the job log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Phase marker: `=== Phase ===`
    Phase,
    /// Section marker: `--- Section ---`
    Section,
    /// Success: `[SUCCESS]`
    Success,
    /// Warning: `[WARNING]`
    Warning,
    /// Error: `[ERROR]`
    Error,
    /// Debug: `[DEBUG]`
    Debug,
    /// No prefix
    None,
}

impl MessagePrefix {
    /// Format a message with this prefix.
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Phase => format!("=== {} ===", message),
            MessagePrefix::Section => format!("--- {} ---", message),
            MessagePrefix::Success => format!("[SUCCESS] {}", message),
            MessagePrefix::Warning => format!("[WARNING] {}", message),
            MessagePrefix::Error => format!("[ERROR] {}", message),
            MessagePrefix::Debug => format!("[DEBUG] {}", message),
            MessagePrefix::None => message.to_string(),
        }
    }
}
