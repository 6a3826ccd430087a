//! Pipeline runner that executes steps in sequence.

use super::errors::{PipelineError, PipelineResult, StepError};
use super::step::PipelineStep;
use super::types::{Context, JobState};

/// Pipeline that runs a sequence of checkpointed steps.
///
/// For each step in order, the runner consults the checkpoint store:
/// completed steps are re-hydrated through `load`, everything else runs
/// `execute` and gets its marker written afterwards. A failure anywhere
/// stops the run and leaves earlier markers intact.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Each step goes through the skip-if-done protocol:
    /// 1. Marker present: call `load`; a load failure is corrupted state
    ///    and aborts the run rather than silently re-executing.
    /// 2. Marker absent: call `execute`, then write the marker. On failure
    ///    no marker is written, so the next run retries this step.
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult {
            steps_executed: Vec::new(),
            steps_resumed: Vec::new(),
        };

        for step in &self.steps {
            let step_name = step.name();

            if ctx.store.is_complete(step_name) {
                ctx.logger
                    .info(&format!("{} already complete, loading prior result", step_name));
                step.load(ctx, state).map_err(|e| {
                    ctx.logger.error(&format!("Failed to load prior result: {}", e));
                    PipelineError::step_failed(&ctx.locator, step_name, e)
                })?;
                result.steps_resumed.push(step_name.to_string());
                continue;
            }

            ctx.logger.phase(step_name);
            step.execute(ctx, state).map_err(|e| {
                ctx.logger.error(&format!("Execution failed: {}", e));
                PipelineError::step_failed(&ctx.locator, step_name, e)
            })?;

            ctx.store.mark_complete(step_name).map_err(|e| {
                PipelineError::step_failed(&ctx.locator, step_name, StepError::from(e))
            })?;

            ctx.logger.success(&format!("{} completed", step_name));
            ctx.logger.flush();
            result.steps_executed.push(step_name.to_string());
        }

        ctx.logger.success("Pipeline completed");
        Ok(result)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    /// Steps that executed this run.
    pub steps_executed: Vec<String>,
    /// Steps re-hydrated from a prior run's markers.
    pub steps_resumed: Vec<String>,
}

impl PipelineRunResult {
    /// Check if every step executed fresh (nothing resumed).
    pub fn all_executed(&self) -> bool {
        self.steps_resumed.is_empty()
    }

    /// Total number of steps that ran.
    pub fn total_steps(&self) -> usize {
        self.steps_executed.len() + self.steps_resumed.len()
    }
}
