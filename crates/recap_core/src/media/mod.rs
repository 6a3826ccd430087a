//! Media collaborators: metadata/download source and transcription engine.
//!
//! Both are narrow trait contracts so the pipeline can be driven with mocks
//! in tests; the production implementations shell out to yt-dlp and a
//! uvx-run whisper engine.

use std::path::{Path, PathBuf};

use serde_json::Value;

mod types;
mod whisper;
mod ytdlp;

pub use types::{MediaError, MediaInfo, MediaResult};
pub use whisper::WhisperCli;
pub use ytdlp::YtDlp;

/// Source of media metadata and audio.
pub trait MediaSource: Send + Sync {
    /// Fetch the raw metadata record for a locator.
    fn fetch_metadata(&self, locator: &str) -> MediaResult<Value>;

    /// Download the item's audio into `dest_dir`, returning the audio path.
    fn download_audio(&self, locator: &str, dest_dir: &Path) -> MediaResult<PathBuf>;
}

/// Speech-to-text engine.
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into `dest_dir`, returning the transcript path.
    fn transcribe(&self, audio: &Path, dest_dir: &Path) -> MediaResult<PathBuf>;
}

/// Best available failure detail from a finished process.
pub(crate) fn failure_message(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    "No error output captured.".to_string()
}
