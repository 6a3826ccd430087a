//! Per-job checkpoint store.
//!
//! One directory per job key holds every step's artifact files plus a
//! zero-content `<step>.done` marker per completed step. The marker is only
//! written after the artifact bytes have reached disk, so marker presence
//! always implies artifact validity. A process killed between the two
//! writes re-executes that step on resume, which is the safe direction.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Errors from checkpoint store operations.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// File I/O error with operation context.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A persisted artifact could not be parsed.
    #[error("Failed to parse artifact '{name}': {message}")]
    Parse { name: String, message: String },

    /// Marker present but the artifact it promises is gone.
    ///
    /// This is a consistency violation, not a normal miss: the operator has
    /// to remove the stale marker deliberately before the step will re-run.
    #[error(
        "Step '{step}' is marked complete but its artifact is missing: {} \
         (remove the stale marker '{}' and re-run)",
        path.display(),
        marker.display()
    )]
    MissingArtifact {
        step: String,
        marker: PathBuf,
        path: PathBuf,
    },
}

impl CheckpointError {
    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a parse error for a named artifact.
    pub fn parse(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for checkpoint operations.
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Durable per-job state directory.
///
/// The state root is injected rather than ambient, so tests can point the
/// whole engine at a temporary directory.
pub struct CheckpointStore {
    job_key: String,
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open (creating if needed) the state directory for a job key.
    pub fn open(state_root: &Path, job_key: &str) -> CheckpointResult<Self> {
        let dir = state_root.join(job_key);
        fs::create_dir_all(&dir)
            .map_err(|e| CheckpointError::io(format!("creating {}", dir.display()), e))?;

        Ok(Self {
            job_key: job_key.to_string(),
            dir,
        })
    }

    /// The job key this store belongs to.
    pub fn job_key(&self) -> &str {
        &self.job_key
    }

    /// The job's state directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic path for an artifact inside the job directory.
    ///
    /// Used by steps that hand a filesystem path to an external tool.
    pub fn path_for(&self, artifact_name: &str) -> PathBuf {
        self.dir.join(artifact_name)
    }

    fn marker_path(&self, step: &str) -> PathBuf {
        self.dir.join(format!("{}.done", step.to_lowercase()))
    }

    /// Whether a step's completion marker exists.
    pub fn is_complete(&self, step: &str) -> bool {
        self.marker_path(step).exists()
    }

    /// Write a step's completion marker. Idempotent.
    ///
    /// Callers must have persisted the step's artifacts first; the marker is
    /// the commit point for resume decisions.
    pub fn mark_complete(&self, step: &str) -> CheckpointResult<()> {
        let marker = self.marker_path(step);
        let file = File::create(&marker)
            .map_err(|e| CheckpointError::io(format!("creating {}", marker.display()), e))?;
        file.sync_all()
            .map_err(|e| CheckpointError::io(format!("syncing {}", marker.display()), e))?;

        tracing::debug!("Marked step '{}' complete: {}", step, marker.display());
        Ok(())
    }

    /// Remove a step's marker if present.
    pub fn clear_marker(&self, step: &str) -> CheckpointResult<()> {
        let marker = self.marker_path(step);
        if marker.exists() {
            fs::remove_file(&marker)
                .map_err(|e| CheckpointError::io(format!("removing {}", marker.display()), e))?;
            tracing::debug!("Cleared marker for step '{}'", step);
        }
        Ok(())
    }

    /// Remove every listed step's marker (used by fresh runs).
    pub fn clear_all_markers(&self, steps: &[&str]) -> CheckpointResult<()> {
        for step in steps {
            self.clear_marker(step)?;
        }
        Ok(())
    }

    /// Marker presence per step, in the order given.
    pub fn status(&self, steps: &[&str]) -> Vec<(String, bool)> {
        steps
            .iter()
            .map(|s| (s.to_string(), self.is_complete(s)))
            .collect()
    }

    /// Resolve a file that must exist because `step`'s marker is present.
    ///
    /// A miss here means the marker is lying about the artifact; the error
    /// names both files so the operator can repair state deliberately.
    pub fn require_file(&self, step: &str, path: &Path) -> CheckpointResult<()> {
        if !path.exists() {
            return Err(CheckpointError::MissingArtifact {
                step: step.to_string(),
                marker: self.marker_path(step),
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Resolve an in-directory artifact that `step`'s marker promises.
    pub fn require_artifact(&self, step: &str, artifact_name: &str) -> CheckpointResult<PathBuf> {
        let path = self.path_for(artifact_name);
        self.require_file(step, &path)?;
        Ok(path)
    }

    /// Durably write a text artifact.
    ///
    /// Writes to a temp file, fsyncs, then renames into place. The fsync
    /// happens before any caller can reach `mark_complete`, which is the
    /// ordering the resume logic relies on.
    pub fn save_text(&self, artifact_name: &str, content: &str) -> CheckpointResult<PathBuf> {
        let path = self.path_for(artifact_name);
        self.atomic_write(&path, content.as_bytes())
            .map_err(|e| CheckpointError::io(format!("writing {}", path.display()), e))?;

        tracing::debug!("Saved artifact {}", path.display());
        Ok(path)
    }

    /// Read a text artifact.
    pub fn load_text(&self, artifact_name: &str) -> CheckpointResult<String> {
        let path = self.path_for(artifact_name);
        fs::read_to_string(&path)
            .map_err(|e| CheckpointError::io(format!("reading {}", path.display()), e))
    }

    /// Durably write a JSON artifact.
    pub fn save_json(&self, artifact_name: &str, value: &Value) -> CheckpointResult<PathBuf> {
        let path = self.path_for(artifact_name);
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| CheckpointError::parse(artifact_name, e.to_string()))?;
        self.atomic_write(&path, content.as_bytes())
            .map_err(|e| CheckpointError::io(format!("writing {}", path.display()), e))?;

        tracing::debug!("Saved artifact {}", path.display());
        Ok(path)
    }

    /// Read a JSON artifact.
    pub fn load_json(&self, artifact_name: &str) -> CheckpointResult<Value> {
        let content = self.load_text(artifact_name)?;
        serde_json::from_str(&content)
            .map_err(|e| CheckpointError::parse(artifact_name, e.to_string()))
    }

    /// Write bytes to a temp file in the same directory, fsync, then rename.
    fn atomic_write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let temp_path = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => path.with_extension(format!("{}.tmp", ext)),
            None => path.with_extension("tmp"),
        };

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, CheckpointStore) {
        let root = tempdir().unwrap();
        let store = CheckpointStore::open(root.path(), "abc123").unwrap();
        (root, store)
    }

    #[test]
    fn open_creates_job_directory() {
        let root = tempdir().unwrap();
        let store = CheckpointStore::open(root.path(), "deadbeef").unwrap();
        assert!(store.dir().is_dir());
        assert_eq!(store.dir(), root.path().join("deadbeef"));
        assert_eq!(store.job_key(), "deadbeef");
    }

    #[test]
    fn open_is_idempotent() {
        let root = tempdir().unwrap();
        CheckpointStore::open(root.path(), "k").unwrap();
        CheckpointStore::open(root.path(), "k").unwrap();
    }

    #[test]
    fn markers_round_trip() {
        let (_root, store) = store();
        assert!(!store.is_complete("Identify"));

        store.mark_complete("Identify").unwrap();
        assert!(store.is_complete("Identify"));
        // Marker files are lowercase regardless of the display name
        assert!(store.path_for("identify.done").exists());

        // Idempotent
        store.mark_complete("Identify").unwrap();
        assert!(store.is_complete("Identify"));
    }

    #[test]
    fn clear_marker_removes_and_tolerates_absence() {
        let (_root, store) = store();
        store.clear_marker("Acquire").unwrap();

        store.mark_complete("Acquire").unwrap();
        store.clear_marker("Acquire").unwrap();
        assert!(!store.is_complete("Acquire"));
    }

    #[test]
    fn save_and_load_text() {
        let (_root, store) = store();
        let path = store.save_text("note.txt", "hello world").unwrap();
        assert_eq!(path, store.path_for("note.txt"));
        assert_eq!(store.load_text("note.txt").unwrap(), "hello world");
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let (_root, store) = store();
        store.save_text("note.txt", "hello").unwrap();
        assert!(!store.path_for("note.txt.tmp").exists());
        assert!(!store.path_for("note.tmp").exists());
    }

    #[test]
    fn save_and_load_json() {
        let (_root, store) = store();
        let value = serde_json::json!({"title": "Talk", "id": "xyz"});
        store.save_json("info.json", &value).unwrap();

        let loaded = store.load_json("info.json").unwrap();
        assert_eq!(loaded.get("title").and_then(|v| v.as_str()), Some("Talk"));
    }

    #[test]
    fn load_json_rejects_garbage() {
        let (_root, store) = store();
        fs::write(store.path_for("info.json"), "not json").unwrap();
        assert!(matches!(
            store.load_json("info.json"),
            Err(CheckpointError::Parse { .. })
        ));
    }

    #[test]
    fn require_artifact_passes_when_present() {
        let (_root, store) = store();
        store.save_text("info.json", "{}").unwrap();
        store.require_artifact("Identify", "info.json").unwrap();
    }

    #[test]
    fn require_artifact_reports_consistency_violation() {
        let (_root, store) = store();
        store.mark_complete("Identify").unwrap();

        let err = store
            .require_artifact("Identify", "info.json")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("info.json"));
        assert!(msg.contains("identify.done"));
        assert!(msg.contains("remove the stale marker"));
    }

    #[test]
    fn status_reports_in_given_order() {
        let (_root, store) = store();
        store.mark_complete("Acquire").unwrap();

        let status = store.status(&["Identify", "Acquire", "Transcribe"]);
        assert_eq!(
            status,
            vec![
                ("Identify".to_string(), false),
                ("Acquire".to_string(), true),
                ("Transcribe".to_string(), false),
            ]
        );
    }
}
