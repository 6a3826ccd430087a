//! Types for media source and transcription operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error type for media operations.
#[derive(Error, Debug)]
pub enum MediaError {
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

    /// Failed to parse tool output.
    #[error("Failed to parse {tool} output: {source}")]
    ParseFailed {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    /// Metadata record is missing a required field.
    #[error("Metadata for {locator} is missing required field '{field}'")]
    MissingField { locator: String, field: String },

    /// Expected output file missing after a tool run.
    #[error("{tool} produced no output file: {path}")]
    OutputMissing { tool: String, path: PathBuf },
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Create an ExecutionFailed error.
    pub fn execution_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a CommandFailed error.
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

    /// Raw tool output attached to this error, if any.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Validated metadata for one media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Item title.
    pub title: String,
    /// Canonical URL of the item.
    pub canonical_url: String,
    /// Stable item identifier from the source.
    pub item_id: String,
}

impl MediaInfo {
    /// Validate a raw metadata record into a [`MediaInfo`].
    ///
    /// Title and item ID must be present and non-empty; the canonical URL
    /// falls back to the input locator when the record lacks one.
    pub fn from_value(raw: &Value, locator: &str) -> MediaResult<Self> {
        let title = required_field(raw, "title", locator)?;
        let item_id = required_field(raw, "id", locator)?;

        let canonical_url = raw
            .get("webpage_url")
            .and_then(|u| u.as_str())
            .filter(|u| !u.is_empty())
            .unwrap_or(locator)
            .to_string();

        Ok(Self {
            title,
            canonical_url,
            item_id,
        })
    }
}

fn required_field(raw: &Value, field: &str, locator: &str) -> MediaResult<String> {
    raw.get(field)
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .ok_or_else(|| MediaError::MissingField {
            locator: locator.to_string(),
            field: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_complete_record() {
        let raw = json!({
            "id": "abc123",
            "title": "Quarterly Outlook",
            "webpage_url": "https://example.com/watch?v=abc123",
        });
        let info = MediaInfo::from_value(&raw, "https://example.com/short").unwrap();
        assert_eq!(info.item_id, "abc123");
        assert_eq!(info.title, "Quarterly Outlook");
        assert_eq!(info.canonical_url, "https://example.com/watch?v=abc123");
    }

    #[test]
    fn canonical_url_falls_back_to_locator() {
        let raw = json!({ "id": "abc123", "title": "Quarterly Outlook" });
        let info = MediaInfo::from_value(&raw, "https://example.com/short").unwrap();
        assert_eq!(info.canonical_url, "https://example.com/short");
    }

    #[test]
    fn missing_title_is_an_error() {
        let raw = json!({ "id": "abc123" });
        let err = MediaInfo::from_value(&raw, "https://example.com/x").unwrap_err();
        assert!(matches!(err, MediaError::MissingField { ref field, .. } if field == "title"));
    }

    #[test]
    fn empty_id_is_an_error() {
        let raw = json!({ "id": "", "title": "Quarterly Outlook" });
        let err = MediaInfo::from_value(&raw, "https://example.com/x").unwrap_err();
        assert!(matches!(err, MediaError::MissingField { ref field, .. } if field == "id"));
    }
}
