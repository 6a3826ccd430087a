//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Job → Step → Operation → Detail

use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::media::MediaError;
use crate::summarize::SummarizeError;

/// Top-level pipeline error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution or while loading its prior result.
    #[error("Job '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// The step-level error underneath this failure.
    pub fn step_error(&self) -> &StepError {
        match self {
            Self::StepFailed { source, .. } => source,
        }
    }
}

/// Error from a pipeline step.
#[derive(Error, Debug)]
pub enum StepError {
    /// Checkpoint store failure, including consistency violations.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// Media source or transcription failure.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Summarizer failure.
    #[error(transparent)]
    Summarize(#[from] SummarizeError),

    /// A value an earlier step should have produced is absent.
    #[error("Missing {what} in job state; an earlier step did not record it")]
    MissingInput { what: &'static str },
}

impl StepError {
    /// Create a missing input error.
    pub fn missing_input(what: &'static str) -> Self {
        Self::MissingInput { what }
    }

    /// Whether this is a marker/artifact consistency violation.
    pub fn is_consistency_violation(&self) -> bool {
        matches!(
            self,
            Self::Checkpoint(CheckpointError::MissingArtifact { .. })
        )
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_chains_context() {
        let step_err = StepError::missing_input("transcript");
        let pipeline_err =
            PipelineError::step_failed("https://example.com/v", "Summarize", step_err);

        let msg = pipeline_err.to_string();
        assert!(msg.contains("https://example.com/v"));
        assert!(msg.contains("Summarize"));
        assert!(msg.contains("transcript"));
    }

    #[test]
    fn consistency_violations_are_distinguishable() {
        let err = StepError::Checkpoint(CheckpointError::MissingArtifact {
            step: "Identify".to_string(),
            marker: "identify.done".into(),
            path: "info.json".into(),
        });
        assert!(err.is_consistency_violation());
        assert!(!StepError::missing_input("summary").is_consistency_violation());
    }
}
