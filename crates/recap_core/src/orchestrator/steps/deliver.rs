//! Deliver step - fans the finished summary out to every channel.

use crate::notify::{dispatch_all, SummaryArtifact};
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState};

/// Appends the source footer to the summary and dispatches it through the
/// configured channels.
///
/// The step is marked complete once every channel has been attempted,
/// whatever the individual outcomes. Re-running a completed job does not
/// re-send: retrying would duplicate the deliveries that already went
/// through, and there is one marker for the whole step.
pub struct DeliverStep;

impl DeliverStep {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineStep for DeliverStep {
    fn name(&self) -> &str {
        "Deliver"
    }

    fn load(&self, ctx: &Context, _state: &mut JobState) -> StepResult<()> {
        ctx.logger.info("Delivery already attempted, not re-sending");
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let info = state.require_info()?.clone();
        let summary = state.require_summary()?;
        let markdown = format!("{}\n\n---\n\n**Source:** {}", summary, info.canonical_url);

        let artifact = SummaryArtifact {
            markdown,
            title: info.title.clone(),
            canonical_url: info.canonical_url.clone(),
        };

        let reports = dispatch_all(&ctx.channels, &artifact, ctx.logger.as_ref());
        let failures = reports.iter().filter(|r| r.outcome.is_failed()).count();
        if failures > 0 {
            ctx.logger.warn(&format!(
                "{failures} of {} channels failed; completed deliveries are not retried on re-run",
                reports.len()
            ));
        }

        state.delivery = reports;
        Ok(())
    }
}
