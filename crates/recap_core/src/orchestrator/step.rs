//! Pipeline step trait definition.

use super::errors::StepResult;
use super::types::{Context, JobState};

/// Trait for pipeline steps.
///
/// The runner consults the checkpoint store before each step:
/// a step whose marker exists gets `load` (re-hydrate the prior result
/// into `JobState`), everything else gets `execute` followed by the
/// marker write. Steps never write their own markers.
///
/// # Example
///
/// ```ignore
/// struct TranscribeStep;
///
/// impl PipelineStep for TranscribeStep {
///     fn name(&self) -> &str { "Transcribe" }
///
///     fn load(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
///         let name = transcript_name(state.require_info()?);
///         ctx.store.require_artifact("Transcribe", &name)?;
///         state.transcript = Some(ctx.store.load_text(&name)?);
///         Ok(())
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
///         // run the transcriber, verify its output, record it in state
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for markers, logging, and error context).
    fn name(&self) -> &str;

    /// Re-hydrate this step's persisted artifact into `state`.
    ///
    /// Called instead of `execute` when the step's marker is present.
    /// Must fail with a consistency-violation error if a declared
    /// artifact is missing despite the marker; never fall back to
    /// re-executing.
    fn load(&self, ctx: &Context, state: &mut JobState) -> StepResult<()>;

    /// Execute the step's work and record results in `state`.
    ///
    /// Must persist artifacts through the store (or verify files written
    /// by an external tool) before returning; the runner writes the
    /// marker only after this returns `Ok`.
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()>;
}
