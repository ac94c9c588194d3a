//! Service context bundling the port trait objects for one run.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::HttpTaskApi;
use crate::adapters::recording::RecordingTaskApi;
use crate::adapters::replaying::ReplayingTaskApi;
use crate::cassette::format::Cassette;
use crate::cassette::session::RecordingSession;
use crate::ports::task_api::TaskApi;
use crate::settings::Settings;

/// Bundles the external boundaries used by commands.
///
/// Constructors wire up different adapter implementations (live,
/// replaying, recording).
pub struct ServiceContext {
    /// Client for the remote task service.
    pub api: Box<dyn TaskApi>,
}

impl ServiceContext {
    /// A context talking to the configured service over HTTP.
    #[must_use]
    pub fn live(settings: &Settings) -> Self {
        Self { api: Box::new(HttpTaskApi::new(&settings.base_url, settings.contract)) }
    }

    /// A context serving every call from the cassette at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        let interactions = cassette.interactions.len();
        tracing::debug!(cassette = %path.display(), interactions, "replaying");
        Ok(Self { api: Box::new(ReplayingTaskApi::from_cassette(&cassette)) })
    }

    /// A live context whose calls are recorded into a new session under `root`.
    ///
    /// Drop the context before finishing the session so the recorder is
    /// released.
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory cannot be created.
    pub fn recording_at(
        settings: &Settings,
        root: &Path,
    ) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(root)?;
        tracing::info!(dir = %session.output_dir().display(), "recording task client calls");
        let live = HttpTaskApi::new(&settings.base_url, settings.contract);
        let api = RecordingTaskApi::new(Box::new(live), Arc::clone(&session.tasks));
        Ok((Self { api: Box::new(api) }, session))
    }

    /// Picks replaying, recording or live adapters from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if a cassette cannot be loaded or a recording
    /// session cannot be started.
    pub fn from_settings(settings: &Settings) -> Result<(Self, Option<RecordingSession>), String> {
        if let Some(path) = &settings.replay {
            return Ok((Self::replaying(path)?, None));
        }
        if let Some(root) = &settings.record_dir {
            let (ctx, session) = Self::recording_at(settings, root)?;
            return Ok((ctx, Some(session)));
        }
        Ok((Self::live(settings), None))
    }
}
