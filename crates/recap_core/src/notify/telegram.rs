//! Telegram delivery through the Bot API.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde_json::json;

use crate::config::TelegramSettings;
use crate::render::{markdown_to_pdf, markdown_to_telegram_html};

use super::{NotifyChannel, NotifyError, NotifyResult, SummaryArtifact};

/// Hard limit on message text length imposed by the Bot API.
pub const TELEGRAM_CHAR_LIMIT: usize = 4096;

/// Sends the summary as an HTML message when it fits, otherwise renders it
/// to PDF and sends that as a document with an explanatory caption.
pub struct TelegramChannel {
    settings: TelegramSettings,
    client: Client,
}

impl TelegramChannel {
    pub fn from_settings(settings: &TelegramSettings) -> NotifyResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            settings: settings.clone(),
            client,
        })
    }

    fn send_message(&self, token: &str, chat_id: &str, text: &str) -> NotifyResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.settings.api_base, token);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()?;
        check_status(response)
    }

    fn send_document(
        &self,
        token: &str,
        chat_id: &str,
        summary: &SummaryArtifact,
    ) -> NotifyResult<()> {
        let bytes = markdown_to_pdf(&summary.markdown, &summary.title)?;
        let caption = oversize_caption(summary.markdown.chars().count());
        let document = Part::bytes(bytes)
            .file_name(pdf_filename(&summary.title))
            .mime_str("application/pdf")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption)
            .part("document", document);

        let url = format!("{}/bot{}/sendDocument", self.settings.api_base, token);
        let response = self.client.post(&url).multipart(form).send()?;
        check_status(response)
    }
}

impl NotifyChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn enabled(&self) -> bool {
        self.settings.enabled
    }

    fn deliver(&self, summary: &SummaryArtifact) -> NotifyResult<()> {
        let token = self.settings.resolve_bot_token()?;
        let chat_id = self.settings.resolve_chat_id()?;

        let rendered = markdown_to_telegram_html(&summary.markdown);
        if fits_in_message(&rendered) {
            self.send_message(&token, &chat_id, &rendered)
        } else {
            self.send_document(&token, &chat_id, summary)
        }
    }
}

fn check_status(response: Response) -> NotifyResult<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(NotifyError::ApiStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

/// Routing is decided on the rendered HTML length, not the raw markdown.
fn fits_in_message(rendered: &str) -> bool {
    rendered.chars().count() < TELEGRAM_CHAR_LIMIT
}

fn pdf_filename(title: &str) -> String {
    let stem: String = title.chars().take(50).collect();
    format!("{stem}.pdf")
}

fn oversize_caption(raw_chars: usize) -> String {
    format!("Summary too long for message ({raw_chars} chars), sent as PDF")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_route_boundary_is_the_api_limit() {
        let just_under = "a".repeat(TELEGRAM_CHAR_LIMIT - 1);
        let at_limit = "a".repeat(TELEGRAM_CHAR_LIMIT);
        assert!(fits_in_message(&just_under));
        assert!(!fits_in_message(&at_limit));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let multibyte = "é".repeat(TELEGRAM_CHAR_LIMIT - 1);
        assert!(multibyte.len() > TELEGRAM_CHAR_LIMIT);
        assert!(fits_in_message(&multibyte));
    }

    #[test]
    fn pdf_filename_truncates_long_titles() {
        let long_title = "x".repeat(80);
        let name = pdf_filename(&long_title);
        assert_eq!(name.len(), 54);
        assert!(name.ends_with(".pdf"));
        assert_eq!(pdf_filename("Short"), "Short.pdf");
    }

    #[test]
    fn oversize_caption_reports_raw_length() {
        assert_eq!(
            oversize_caption(5210),
            "Summary too long for message (5210 chars), sent as PDF"
        );
    }

    #[test]
    fn missing_credentials_fail_delivery_without_network() {
        if std::env::var("TELEGRAM_BOT_TOKEN").is_ok() {
            return;
        }
        let channel = TelegramChannel::from_settings(&TelegramSettings {
            enabled: true,
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
        })
        .unwrap();
        let summary = SummaryArtifact {
            markdown: "# Recap".to_string(),
            title: "Recap".to_string(),
            canonical_url: "https://example.com/v".to_string(),
        };
        let err = channel.deliver(&summary).unwrap_err();
        assert!(matches!(err, NotifyError::Config(_)));
    }
}
