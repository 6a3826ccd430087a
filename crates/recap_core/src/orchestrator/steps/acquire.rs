//! Acquire step - downloads the audio into the job directory.

use std::path::PathBuf;

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState};

/// Artifact recording where the downloaded audio landed.
pub const AUDIO_POINTER_ARTIFACT: &str = "audio_path.txt";

/// Downloads the item's audio via the media collaborator and records the
/// resulting file path in `audio_path.txt`.
///
/// On resume the recorded audio file is re-validated: a pointer whose
/// target has vanished (cleanup, manual deletion) is reported as corrupted
/// state naming the missing file, never silently re-downloaded.
pub struct AcquireStep;

impl AcquireStep {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineStep for AcquireStep {
    fn name(&self) -> &str {
        "Acquire"
    }

    fn load(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        ctx.store.require_artifact("Acquire", AUDIO_POINTER_ARTIFACT)?;
        let recorded = ctx.store.load_text(AUDIO_POINTER_ARTIFACT)?;
        let audio_path = PathBuf::from(recorded.trim());
        ctx.store.require_file("Acquire", &audio_path)?;
        state.audio_path = Some(audio_path);
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        ctx.logger.info("Downloading audio");

        let audio_path = ctx.media.download_audio(&ctx.locator, ctx.store.dir())?;
        ctx.store
            .save_text(AUDIO_POINTER_ARTIFACT, &audio_path.to_string_lossy())?;

        ctx.logger
            .info(&format!("Audio saved to {}", audio_path.display()));
        state.audio_path = Some(audio_path);
        Ok(())
    }
}
