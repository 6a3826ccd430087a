//! Identify step - fetches and validates media metadata.

use crate::media::MediaInfo;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState};

/// Artifact holding the raw metadata record.
pub const INFO_ARTIFACT: &str = "info.json";

/// Fetches the metadata record for the locator, validates that it names a
/// title and a stable item ID, and persists the raw record as `info.json`.
pub struct IdentifyStep;

impl IdentifyStep {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineStep for IdentifyStep {
    fn name(&self) -> &str {
        "Identify"
    }

    fn load(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        ctx.store.require_artifact("Identify", INFO_ARTIFACT)?;
        let raw = ctx.store.load_json(INFO_ARTIFACT)?;
        state.info = Some(MediaInfo::from_value(&raw, &ctx.locator)?);
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        ctx.logger
            .info(&format!("Fetching metadata for {}", ctx.locator));

        let raw = ctx.media.fetch_metadata(&ctx.locator)?;
        let info = MediaInfo::from_value(&raw, &ctx.locator)?;
        ctx.store.save_json(INFO_ARTIFACT, &raw)?;

        ctx.logger
            .info(&format!("Identified '{}' ({})", info.title, info.item_id));
        state.info = Some(info);
        Ok(())
    }
}
