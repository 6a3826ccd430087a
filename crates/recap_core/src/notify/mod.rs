//! Delivery channels for finished summaries.
//!
//! Channels run in a fixed order and are isolated from each other: a failure
//! in one is logged and recorded, then the next channel still runs.

pub mod desktop;
pub mod email;
pub mod telegram;

use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::JobLogger;
use crate::render::RenderError;

pub use desktop::DesktopChannel;
pub use email::EmailChannel;
pub use telegram::{TelegramChannel, TELEGRAM_CHAR_LIMIT};

/// Error type for delivery operations.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Failed to spawn or run an external tool.
    #[error("Failed to run {tool}: {message}")]
    ExecutionFailed { tool: String, message: String },

    /// External tool exited with a nonzero status.
    #[error("{tool} exited with code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// HTTP API responded with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Desktop notification backend failure.
    #[error("Desktop notification failed: {0}")]
    Desktop(String),
}

/// Result type for delivery operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

impl NotifyError {
    pub fn execution_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }
}

/// A finished summary ready for delivery.
#[derive(Debug, Clone)]
pub struct SummaryArtifact {
    /// Full markdown to deliver, including the source footer.
    pub markdown: String,
    /// Item title, used for subjects and notification bodies.
    pub title: String,
    /// Canonical URL of the source item.
    pub canonical_url: String,
}

/// One delivery channel (email, telegram, desktop).
pub trait NotifyChannel: Send + Sync {
    /// Stable channel name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Whether this channel is turned on in the configuration.
    fn enabled(&self) -> bool;

    /// Deliver the summary through this channel.
    fn deliver(&self, summary: &SummaryArtifact) -> NotifyResult<()>;
}

/// Outcome of one channel's delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Delivered,
    Skipped,
    Failed(String),
}

impl ChannelOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-channel delivery record.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub channel: &'static str,
    pub outcome: ChannelOutcome,
}

/// Run every channel in order, never letting one failure stop the rest.
///
/// Disabled channels are skipped with a log line. Failures are logged as
/// warnings and recorded in the returned report.
pub fn dispatch_all(
    channels: &[Box<dyn NotifyChannel>],
    summary: &SummaryArtifact,
    logger: &JobLogger,
) -> Vec<DeliveryReport> {
    let mut reports = Vec::with_capacity(channels.len());
    for channel in channels {
        let name = channel.name();
        if !channel.enabled() {
            logger.info(&format!("{name}: disabled, skipping"));
            reports.push(DeliveryReport {
                channel: name,
                outcome: ChannelOutcome::Skipped,
            });
            continue;
        }
        match channel.deliver(summary) {
            Ok(()) => {
                logger.success(&format!("{name}: summary delivered"));
                reports.push(DeliveryReport {
                    channel: name,
                    outcome: ChannelOutcome::Delivered,
                });
            }
            Err(err) => {
                logger.warn(&format!("{name} delivery failed: {err}"));
                reports.push(DeliveryReport {
                    channel: name,
                    outcome: ChannelOutcome::Failed(err.to_string()),
                });
            }
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::JobLoggerBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FakeChannel {
        name: &'static str,
        enabled: bool,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl NotifyChannel for FakeChannel {
        fn name(&self) -> &'static str {
            self.name
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        fn deliver(&self, _summary: &SummaryArtifact) -> NotifyResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotifyError::Desktop("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn summary() -> SummaryArtifact {
        SummaryArtifact {
            markdown: "# Recap".to_string(),
            title: "Recap".to_string(),
            canonical_url: "https://example.com/v".to_string(),
        }
    }

    fn logger(dir: &TempDir) -> JobLogger {
        JobLoggerBuilder::new("test", dir.path().to_path_buf())
            .build()
            .unwrap()
    }

    #[test]
    fn failure_in_one_channel_does_not_stop_the_next() {
        let dir = TempDir::new().unwrap();
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));
        let channels: Vec<Box<dyn NotifyChannel>> = vec![
            Box::new(FakeChannel {
                name: "email",
                enabled: true,
                fail: true,
                calls: first_calls.clone(),
            }),
            Box::new(FakeChannel {
                name: "telegram",
                enabled: true,
                fail: false,
                calls: second_calls.clone(),
            }),
        ];

        let reports = dispatch_all(&channels, &summary(), &logger(&dir));

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert!(reports[0].outcome.is_failed());
        assert_eq!(reports[1].outcome, ChannelOutcome::Delivered);
    }

    #[test]
    fn disabled_channels_are_skipped_without_calling_deliver() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let channels: Vec<Box<dyn NotifyChannel>> = vec![Box::new(FakeChannel {
            name: "desktop",
            enabled: false,
            fail: false,
            calls: calls.clone(),
        })];

        let reports = dispatch_all(&channels, &summary(), &logger(&dir));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(reports[0].outcome, ChannelOutcome::Skipped);
    }

    #[test]
    fn reports_preserve_channel_order() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let channels: Vec<Box<dyn NotifyChannel>> = vec![
            Box::new(FakeChannel {
                name: "email",
                enabled: true,
                fail: false,
                calls: calls.clone(),
            }),
            Box::new(FakeChannel {
                name: "telegram",
                enabled: false,
                fail: false,
                calls: calls.clone(),
            }),
            Box::new(FakeChannel {
                name: "desktop",
                enabled: true,
                fail: false,
                calls: calls.clone(),
            }),
        ];

        let reports = dispatch_all(&channels, &summary(), &logger(&dir));
        let names: Vec<&str> = reports.iter().map(|r| r.channel).collect();
        assert_eq!(names, vec!["email", "telegram", "desktop"]);
    }
}
