//! Media source backed by the yt-dlp CLI.
//!
//! Metadata comes from `yt-dlp -J`; audio is extracted with `-x` into the
//! job directory using an id-based output template.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use super::types::{MediaError, MediaResult};
use super::{failure_message, MediaSource};
use crate::config::ToolSettings;

/// Extensions of bookkeeping files that live in the job directory and are
/// never the downloaded audio.
const BOOKKEEPING_EXTENSIONS: &[&str] = &["json", "txt", "md", "done", "log", "part", "tmp", "pdf"];

/// yt-dlp backed media source.
pub struct YtDlp {
    binary: String,
}

impl YtDlp {
    /// Create a media source using the given yt-dlp binary.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Create a media source from tool settings.
    pub fn from_settings(tools: &ToolSettings) -> Self {
        Self::new(&tools.ytdlp_path)
    }
}

impl MediaSource for YtDlp {
    fn fetch_metadata(&self, locator: &str) -> MediaResult<Value> {
        tracing::debug!(tool = %self.binary, locator, "fetching metadata");

        let output = Command::new(&self.binary)
            .args(["-J", "--no-warnings"])
            .arg(locator)
            .output()
            .map_err(|e| MediaError::execution_failed(&self.binary, e.to_string()))?;

        if !output.status.success() {
            return Err(MediaError::command_failed(
                &self.binary,
                output.status.code().unwrap_or(-1),
                failure_message(&output),
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| MediaError::ParseFailed {
            tool: self.binary.clone(),
            source: e,
        })
    }

    fn download_audio(&self, locator: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
        let template = dest_dir.join("%(id)s.%(ext)s");
        tracing::debug!(tool = %self.binary, locator, "downloading audio");

        let output = Command::new(&self.binary)
            .args(["-f", "bestaudio/best", "-x", "--audio-format", "opus"])
            .arg("--restrict-filenames")
            .arg("-o")
            .arg(&template)
            .arg(locator)
            .output()
            .map_err(|e| MediaError::execution_failed(&self.binary, e.to_string()))?;

        if !output.status.success() {
            return Err(MediaError::command_failed(
                &self.binary,
                output.status.code().unwrap_or(-1),
                failure_message(&output),
            ));
        }

        find_downloaded_audio(dest_dir).ok_or_else(|| MediaError::OutputMissing {
            tool: self.binary.clone(),
            path: dest_dir.to_path_buf(),
        })
    }
}

/// Pick the audio file yt-dlp produced: the newest file in the directory
/// that is not a bookkeeping file. yt-dlp chooses the final container
/// extension itself, so the exact name is not known up front.
fn find_downloaded_audio(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if BOOKKEEPING_EXTENSIONS.contains(&ext) {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(time) => time,
            Err(_) => continue,
        };
        match &newest {
            Some((best, _)) if *best >= modified => {}
            _ => newest = Some((modified, path)),
        }
    }

    newest.map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, OpenOptions};
    use std::io::Write;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(b"x").unwrap();
        path
    }

    #[test]
    fn scan_skips_bookkeeping_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "info.json");
        touch(dir.path(), "abc123.txt");
        touch(dir.path(), "identify.done");
        touch(dir.path(), "job.log");
        let audio = touch(dir.path(), "abc123.opus");

        assert_eq!(find_downloaded_audio(dir.path()), Some(audio));
    }

    #[test]
    fn scan_returns_none_without_candidates() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "info.json");
        touch(dir.path(), "job.log");

        assert_eq!(find_downloaded_audio(dir.path()), None);
    }

    #[test]
    fn scan_prefers_the_newest_file() {
        let dir = tempdir().unwrap();
        let stale = touch(dir.path(), "old_id.opus");
        let fresh = touch(dir.path(), "abc123.opus");

        let file = OpenOptions::new().write(true).open(&stale).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();

        assert_eq!(find_downloaded_audio(dir.path()), Some(fresh));
    }
}
