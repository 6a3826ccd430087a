//! Summarizer collaborators.
//!
//! Two backends behind one trait: a CLI agent subprocess (default) and an
//! OpenAI-compatible chat-completions API. Both receive the configured
//! prompt template followed by the transcript.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

mod codex;
mod openai;

pub use codex::CodexCli;
pub use openai::OpenAiChat;

/// System framing shared by both backends.
const ANALYST_FRAMING: &str =
    "You are a financial analyst helping investors extract actionable insights from content.";

/// Error type for summarization.
#[derive(Error, Debug)]
pub enum SummarizeError {
    /// Failed to spawn or run the CLI backend.
    #[error("Failed to run {tool}: {message}")]
    ExecutionFailed { tool: String, message: String },

    /// CLI backend exited with a nonzero status.
    #[error("{tool} exited with code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// CLI runner is not installed.
    #[error("{runner} not found on PATH. Install it or adjust summarizer.codex_runner in the config")]
    RunnerMissing { runner: String },

    /// Neither an API key nor an agent auth file is available.
    #[error("Codex CLI credentials not found. Run `{runner} {package} login` or set {env_var}")]
    CredentialsMissing {
        runner: String,
        package: String,
        env_var: String,
    },

    /// CLI backend did not write its output file.
    #[error("Summarizer wrote no output file: {0}")]
    OutputMissing(PathBuf),

    /// Backend produced an empty summary.
    #[error("Summarizer returned an empty summary")]
    EmptyResponse,

    /// HTTP request failed.
    #[error("Summarization request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP backend returned a non-success status.
    #[error("Summarizer API returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// HTTP backend response did not have the expected shape.
    #[error("Unexpected response from summarizer API: {0}")]
    MalformedResponse(String),

    /// Reading or writing backend artifacts failed.
    #[error("Summarizer I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Credential resolution failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for summarization.
pub type SummarizeResult<T> = Result<T, SummarizeError>;

/// Summary generator.
pub trait Summarizer: Send + Sync {
    /// Produce a markdown summary of the transcript.
    fn summarize(
        &self,
        transcript: &str,
        title: &str,
        canonical_url: &str,
    ) -> SummarizeResult<String>;
}

/// User-facing prompt body: template followed by the transcript.
fn prompt_body(template: &str, transcript: &str) -> String {
    format!("{}\n\nTranscript:\n{}", template, transcript)
}
