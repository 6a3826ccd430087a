//! Logging for pipeline jobs.
//!
//! Two layers: `tracing` for library diagnostics, and [`JobLogger`] for
//! the per-job `job.log` file plus the console sink the CLI installs.

mod job_logger;
mod types;

pub use job_logger::{JobLogger, JobLoggerBuilder};
pub use types::{LogConfig, LogLevel, LogSink, MessagePrefix};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise uses the given level.
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_maps_to_filter_directive() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Error.as_filter_str(), "error");
    }

    #[test]
    fn prefixes_format_consistently() {
        assert_eq!(MessagePrefix::Phase.format("Acquire"), "=== Acquire ===");
        assert_eq!(MessagePrefix::Section.format("tail"), "--- tail ---");
        assert_eq!(MessagePrefix::Warning.format("slow"), "[WARNING] slow");
    }
}
