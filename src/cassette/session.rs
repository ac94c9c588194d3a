//! Recording session that owns the cassette recorder for one run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::format::TASKS_PORT;
use super::recorder::CassetteRecorder;

/// A recording in progress.
///
/// Interactions are written to `<root>/<timestamp>/tasks.cassette.yaml`
/// when the session is finished.
pub struct RecordingSession {
    /// Recorder shared with the recording task client.
    pub tasks: Arc<Mutex<CassetteRecorder>>,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Start a session under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamped directory already exists or
    /// cannot be created.
    pub fn new(root: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = root.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let path = output_dir.join(format!("{TASKS_PORT}.cassette.yaml"));
        let name = format!("{timestamp}-{TASKS_PORT}");
        let recorder = CassetteRecorder::new(path, name, commit_hash());
        Ok(Self { tasks: Arc::new(Mutex::new(recorder)), output_dir })
    }

    /// Directory the cassette is written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the cassette and return the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a recording client still holds the recorder or
    /// the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.tasks)
            .map_err(|_| "Recording task client still holds the recorder".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))?;
        Ok(self.output_dir)
    }
}

/// Current git commit, or `"unknown"` outside a repository.
fn commit_hash() -> String {
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string());

    hash.unwrap_or_else(|| {
        tracing::warn!("could not determine git commit, recording as 'unknown'");
        "unknown".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Cassette;
    use serde_json::json;

    #[test]
    fn session_writes_cassette_into_timestamped_directory() {
        let root = std::env::temp_dir().join("tasklist_session_test");
        let _ = std::fs::remove_dir_all(&root);

        let session = RecordingSession::new(&root).expect("session should start");
        assert!(session.output_dir().exists());
        session.tasks.lock().unwrap().record("tasks", "list", json!(null), json!({"Ok": []}));

        let dir = session.finish().expect("finish should succeed");
        assert!(dir.starts_with(&root));
        let cassette = Cassette::load(&dir.join("tasks.cassette.yaml")).unwrap();
        assert_eq!(cassette.interactions.len(), 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn commit_hash_is_never_empty() {
        assert!(!commit_hash().is_empty());
    }
}
