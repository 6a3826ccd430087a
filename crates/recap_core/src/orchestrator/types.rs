//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::checkpoint::CheckpointStore;
use crate::config::Settings;
use crate::logging::JobLogger;
use crate::media::{MediaInfo, MediaSource, Transcriber};
use crate::notify::{DeliveryReport, NotifyChannel};
use crate::summarize::Summarizer;

use super::errors::{StepError, StepResult};

/// Read-only context passed to pipeline steps.
///
/// Holds the job's configuration, its checkpoint store, and the external
/// collaborators. Mutable state goes in [`JobState`].
pub struct Context {
    /// Application settings.
    pub settings: Settings,
    /// The input locator (URL) this job was started with.
    pub locator: String,
    /// Durable per-job state.
    pub store: CheckpointStore,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// Metadata fetch and audio download.
    pub media: Box<dyn MediaSource>,
    /// Audio to text.
    pub transcriber: Box<dyn Transcriber>,
    /// Transcript to summary.
    pub summarizer: Box<dyn Summarizer>,
    /// Delivery channels in dispatch order.
    pub channels: Vec<Box<dyn NotifyChannel>>,
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Each field is filled exactly once, either by a step's `execute` on a
/// fresh run or by its `load` on resume; downstream steps read it the same
/// way in both cases.
#[derive(Debug, Clone, Default)]
pub struct JobState {
    /// Validated metadata (from Identify).
    pub info: Option<MediaInfo>,
    /// Path to the downloaded audio file (from Acquire).
    pub audio_path: Option<PathBuf>,
    /// Raw transcript text (from Transcribe).
    pub transcript: Option<String>,
    /// Final summary markdown, including its header (from Summarize).
    pub summary: Option<String>,
    /// Per-channel delivery outcomes (from Deliver).
    pub delivery: Vec<DeliveryReport>,
}

impl JobState {
    /// Metadata recorded by Identify.
    pub fn require_info(&self) -> StepResult<&MediaInfo> {
        self.info
            .as_ref()
            .ok_or_else(|| StepError::missing_input("media metadata"))
    }

    /// Audio path recorded by Acquire.
    pub fn require_audio_path(&self) -> StepResult<&PathBuf> {
        self.audio_path
            .as_ref()
            .ok_or_else(|| StepError::missing_input("audio path"))
    }

    /// Transcript recorded by Transcribe.
    pub fn require_transcript(&self) -> StepResult<&str> {
        self.transcript
            .as_deref()
            .ok_or_else(|| StepError::missing_input("transcript"))
    }

    /// Summary recorded by Summarize.
    pub fn require_summary(&self) -> StepResult<&str> {
        self.summary
            .as_deref()
            .ok_or_else(|| StepError::missing_input("summary"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_reports_missing_inputs() {
        let state = JobState::default();
        assert!(state.require_info().is_err());
        assert!(state.require_audio_path().is_err());
        assert!(state.require_transcript().is_err());
        assert!(state.require_summary().is_err());
    }

    #[test]
    fn populated_state_hands_out_references() {
        let state = JobState {
            transcript: Some("hello".to_string()),
            ..Default::default()
        };
        assert_eq!(state.require_transcript().unwrap(), "hello");
    }
}
