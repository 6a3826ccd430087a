//! Email delivery through the local sendmail binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use crate::config::EmailSettings;
use crate::render::markdown_to_html;

use super::{NotifyChannel, NotifyError, NotifyResult, SummaryArtifact};

const MIME_BOUNDARY: &str = "recap-multipart-boundary";

/// Sends the summary as a multipart/alternative email: the raw markdown as
/// the plain part and a styled render as the HTML part.
pub struct EmailChannel {
    enabled: bool,
    recipient: String,
    sender: String,
    sendmail_path: String,
}

impl EmailChannel {
    pub fn from_settings(settings: &EmailSettings) -> Self {
        Self {
            enabled: settings.enabled,
            recipient: settings.resolved_recipient(),
            sender: settings.resolved_sender(),
            sendmail_path: settings.sendmail_path.clone(),
        }
    }

    fn build_message(&self, summary: &SummaryArtifact) -> String {
        let html = markdown_to_html(&summary.markdown);
        let mut message = String::new();
        message.push_str(&format!("From: {}\n", self.sender));
        message.push_str(&format!("To: {}\n", self.recipient));
        message.push_str(&format!("Subject: [Recap] {}\n", summary.title));
        message.push_str("MIME-Version: 1.0\n");
        message.push_str(&format!(
            "Content-Type: multipart/alternative; boundary=\"{MIME_BOUNDARY}\"\n\n"
        ));
        message.push_str(&format!("--{MIME_BOUNDARY}\n"));
        message.push_str("Content-Type: text/plain; charset=\"utf-8\"\n");
        message.push_str("Content-Transfer-Encoding: 8bit\n\n");
        message.push_str(&summary.markdown);
        message.push_str(&format!("\n--{MIME_BOUNDARY}\n"));
        message.push_str("Content-Type: text/html; charset=\"utf-8\"\n");
        message.push_str("Content-Transfer-Encoding: 8bit\n\n");
        message.push_str(&html);
        message.push_str(&format!("\n--{MIME_BOUNDARY}--\n"));
        message
    }
}

impl NotifyChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn deliver(&self, summary: &SummaryArtifact) -> NotifyResult<()> {
        let message = self.build_message(summary);

        let mut child = Command::new(&self.sendmail_path)
            .args(["-t", "-oi"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| NotifyError::execution_failed("sendmail", e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.as_bytes())
                .map_err(|e| NotifyError::execution_failed("sendmail", e.to_string()))?;
            drop(stdin); // close the pipe so sendmail sees EOF
        }

        let output = child
            .wait_with_output()
            .map_err(|e| NotifyError::execution_failed("sendmail", e.to_string()))?;
        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            return Err(NotifyError::command_failed(
                "sendmail",
                exit_code,
                failure_message(&output),
            ));
        }
        Ok(())
    }
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    "No error output captured.".to_string()
}
