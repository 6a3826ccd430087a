//! Summarize step - produces the final markdown summary.

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState};

/// Invokes the summarizer on the transcript and persists the result as
/// `<item_id>.md`, prefixed with `URL:` / `Title:` lines so the stored
/// artifact is self-describing.
pub struct SummarizeStep;

impl SummarizeStep {
    pub fn new() -> Self {
        Self
    }
}

fn summary_artifact(item_id: &str) -> String {
    format!("{item_id}.md")
}

impl PipelineStep for SummarizeStep {
    fn name(&self) -> &str {
        "Summarize"
    }

    fn load(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let artifact = summary_artifact(&state.require_info()?.item_id);
        ctx.store.require_artifact("Summarize", &artifact)?;
        state.summary = Some(ctx.store.load_text(&artifact)?);
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let info = state.require_info()?.clone();
        let transcript = state.require_transcript()?;
        ctx.logger.info(&format!(
            "Summarizing transcript ({} chars)",
            transcript.chars().count()
        ));

        let body = ctx
            .summarizer
            .summarize(transcript, &info.title, &info.canonical_url)?;
        let summary = format!(
            "URL: {}\nTitle: {}\n\n{}",
            info.canonical_url, info.title, body
        );
        ctx.store
            .save_text(&summary_artifact(&info.item_id), &summary)?;

        ctx.logger
            .info(&format!("Summary saved ({} chars)", summary.chars().count()));
        state.summary = Some(summary);
        Ok(())
    }
}
