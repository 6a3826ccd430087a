//! Pipeline orchestrator for running checkpointed jobs.
//!
//! This module provides the infrastructure for running the five-step
//! summary pipeline. Each step re-hydrates its prior result when its
//! completion marker exists, or executes and gets its marker written.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Identify
//!     ├── Step: Acquire
//!     ├── Step: Transcribe
//!     ├── Step: Summarize
//!     └── Step: Deliver
//! ```
//!
//! # Example
//!
//! ```ignore
//! use recap_core::orchestrator::{create_standard_pipeline, Context, JobState};
//!
//! let pipeline = create_standard_pipeline();
//! let mut state = JobState::default();
//! let result = pipeline.run(&ctx, &mut state)?;
//! println!("Executed: {:?}", result.steps_executed);
//! println!("Resumed:  {:?}", result.steps_resumed);
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{AcquireStep, DeliverStep, IdentifyStep, SummarizeStep, TranscribeStep};
pub use types::{Context, JobState};

/// Create the standard pipeline with all steps in the correct order.
///
/// 1. Identify - fetch and validate metadata
/// 2. Acquire - download the audio
/// 3. Transcribe - audio to text
/// 4. Summarize - transcript to markdown summary
/// 5. Deliver - fan the summary out to the channels
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(IdentifyStep::new())
        .with_step(AcquireStep::new())
        .with_step(TranscribeStep::new())
        .with_step(SummarizeStep::new())
        .with_step(DeliverStep::new())
}
