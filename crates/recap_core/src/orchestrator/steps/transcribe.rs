//! Transcribe step - turns the downloaded audio into text.

use std::fs;

use crate::checkpoint::CheckpointError;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState};

/// Runs the transcription collaborator on the audio file, verifies the
/// transcript it wrote, and reads the text back into the job state.
///
/// On engine failure the captured tool output is replayed through the
/// job logger's tail buffer so the log ends with the interesting lines.
pub struct TranscribeStep;

impl TranscribeStep {
    pub fn new() -> Self {
        Self
    }
}

fn transcript_artifact(item_id: &str) -> String {
    format!("{item_id}.txt")
}

impl PipelineStep for TranscribeStep {
    fn name(&self) -> &str {
        "Transcribe"
    }

    fn load(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let artifact = transcript_artifact(&state.require_info()?.item_id);
        ctx.store.require_artifact("Transcribe", &artifact)?;
        state.transcript = Some(ctx.store.load_text(&artifact)?);
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let audio_path = state.require_audio_path()?.clone();
        ctx.logger
            .info(&format!("Transcribing {}", audio_path.display()));

        let transcript_path = match ctx.transcriber.transcribe(&audio_path, ctx.store.dir()) {
            Ok(path) => path,
            Err(err) => {
                if let Some(output) = err.tool_output() {
                    for line in output.lines() {
                        ctx.logger.output_line(line, true);
                    }
                    ctx.logger.show_tail("transcription");
                }
                return Err(err.into());
            }
        };

        let transcript = fs::read_to_string(&transcript_path).map_err(|e| {
            CheckpointError::io(format!("reading {}", transcript_path.display()), e)
        })?;

        ctx.logger.info(&format!(
            "Transcript ready ({} chars)",
            transcript.chars().count()
        ));
        state.transcript = Some(transcript);
        Ok(())
    }
}
