//! On-disk cassette layout.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Port name under which task client calls are recorded.
pub const TASKS_PORT: &str = "tasks";

/// One recorded call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the recording (assigned by the recorder).
    pub seq: u64,
    /// Port name, e.g. `"tasks"`.
    pub port: String,
    /// Method invoked on the port, e.g. `"list"`.
    pub method: String,
    /// Arguments of the call.
    pub input: serde_json::Value,
    /// Result of the call, `{"Ok": ..}` or `{"Err": ..}`.
    pub output: serde_json::Value,
}

/// A named, ordered sequence of interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Source revision at recording time, or `"unknown"`.
    pub commit: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Reads and parses a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid cassette.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }
}
