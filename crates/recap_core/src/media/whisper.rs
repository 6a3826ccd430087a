//! Transcription engine run through uvx.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::{MediaError, MediaResult};
use super::{failure_message, Transcriber};
use crate::config::ToolSettings;

/// Whisper CLI transcriber, run as an ephemeral uvx package.
pub struct WhisperCli {
    uvx: String,
    package: String,
    model: String,
    upgrade: bool,
}

impl WhisperCli {
    /// Create a transcriber from tool settings.
    ///
    /// With `upgrade` set, the `@latest` package spec is used so uvx pulls
    /// the newest engine release.
    pub fn from_settings(tools: &ToolSettings, upgrade: bool) -> Self {
        Self {
            uvx: tools.uvx_path.clone(),
            package: tools.whisper_package.clone(),
            model: tools.whisper_model.clone(),
            upgrade,
        }
    }

    fn package_spec(&self) -> String {
        if self.upgrade && !self.package.contains('@') {
            format!("{}@latest", self.package)
        } else {
            self.package.clone()
        }
    }
}

impl Transcriber for WhisperCli {
    fn transcribe(&self, audio: &Path, dest_dir: &Path) -> MediaResult<PathBuf> {
        let package = self.package_spec();
        tracing::debug!(tool = %self.uvx, package = %package, audio = %audio.display(), "transcribing");

        let output = Command::new(&self.uvx)
            .arg(&package)
            .args(["--verbose", "False"])
            .args(["--model", &self.model])
            .arg(audio)
            .arg("-o")
            .arg(dest_dir)
            .output()
            .map_err(|e| MediaError::execution_failed(&self.uvx, e.to_string()))?;

        if !output.status.success() {
            return Err(MediaError::command_failed(
                &package,
                output.status.code().unwrap_or(-1),
                failure_message(&output),
            ));
        }

        // The engine writes <audio stem>.txt next to its other outputs.
        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let transcript = dest_dir.join(format!("{}.txt", stem));

        if !transcript.exists() {
            return Err(MediaError::OutputMissing {
                tool: package,
                path: transcript,
            });
        }

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcriber(upgrade: bool) -> WhisperCli {
        WhisperCli::from_settings(&ToolSettings::default(), upgrade)
    }

    #[test]
    fn upgrade_selects_latest_package_spec() {
        assert_eq!(transcriber(false).package_spec(), "mlx_whisper");
        assert_eq!(transcriber(true).package_spec(), "mlx_whisper@latest");
    }

    #[test]
    fn pinned_package_is_not_rewritten() {
        let mut tools = ToolSettings::default();
        tools.whisper_package = "mlx_whisper@1.2".to_string();
        let t = WhisperCli::from_settings(&tools, true);
        assert_eq!(t.package_spec(), "mlx_whisper@1.2");
    }
}
