//! Desktop notification delivery.

use crate::config::DesktopSettings;

use super::{NotifyChannel, NotifyError, NotifyResult, SummaryArtifact};

/// Pops a desktop notification when a summary finishes. Off by default since
/// the pipeline usually runs headless.
pub struct DesktopChannel {
    enabled: bool,
}

impl DesktopChannel {
    pub fn from_settings(settings: &DesktopSettings) -> Self {
        Self {
            enabled: settings.enabled,
        }
    }
}

impl NotifyChannel for DesktopChannel {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn deliver(&self, summary: &SummaryArtifact) -> NotifyResult<()> {
        notify_rust::Notification::new()
            .summary("Recap")
            .body(&notification_body(&summary.title))
            .show()
            .map_err(|e| NotifyError::Desktop(e.to_string()))?;
        Ok(())
    }
}

fn notification_body(title: &str) -> String {
    format!("Summary ready: {title}")
}
