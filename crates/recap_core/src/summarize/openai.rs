//! Summarization through an OpenAI-compatible chat-completions API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{prompt_body, SummarizeError, SummarizeResult, Summarizer, ANALYST_FRAMING};
use crate::config::SummarizerSettings;

/// Chat completion request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

/// Chat message.
#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

impl Message {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// HTTP summarizer against a chat-completions endpoint.
pub struct OpenAiChat {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
    prompt_template: String,
}

impl OpenAiChat {
    /// Create a summarizer from settings, resolving the API key.
    pub fn new(settings: &SummarizerSettings) -> SummarizeResult<Self> {
        let api_key = settings.resolve_api_key()?;
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.openai_base_url.trim_end_matches('/').to_string(),
            model: settings.openai_model.clone(),
            api_key,
            prompt_template: settings.prompt.clone(),
        })
    }
}

impl Summarizer for OpenAiChat {
    fn summarize(
        &self,
        transcript: &str,
        _title: &str,
        _canonical_url: &str,
    ) -> SummarizeResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(ANALYST_FRAMING),
                Message::user(prompt_body(&self.prompt_template, transcript)),
            ],
            temperature: 0.7,
        };

        tracing::debug!(model = %self.model, "requesting chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = %status, "summarizer API error");
            return Err(SummarizeError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| SummarizeError::MalformedResponse("no choices in response".to_string()))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_expected_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message::system("framing"), Message::user("content")],
            temperature: 0.7,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        let temperature = value["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn response_content_is_extracted() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"the summary"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "the summary");
    }
}
