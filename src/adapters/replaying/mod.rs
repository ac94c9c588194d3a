//! Replaying adapters that serve recorded interactions.

pub mod task_api;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::ApiError;

pub use task_api::ReplayingTaskApi;

/// Pull the recorded output of the next `port`/`method` call.
///
/// # Panics
///
/// Panics when the cassette is exhausted for this pair.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut guard = replayer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.next_interaction(port, method).output
}

/// Rebuild a recorded `Result` from its `{"Ok": ..}` / `{"Err": ..}` form.
///
/// # Panics
///
/// Panics on a malformed recording; a cassette that does not match the
/// code replaying it is a test setup bug.
pub(crate) fn replay_result<T: DeserializeOwned>(output: serde_json::Value) -> Result<T, ApiError> {
    if let Some(ok) = output.get("Ok") {
        return Ok(serde_json::from_value(ok.clone())
            .unwrap_or_else(|e| panic!("Cassette Ok value does not match the expected type: {e}")));
    }
    if let Some(err) = output.get("Err") {
        return Err(serde_json::from_value(err.clone())
            .unwrap_or_else(|e| panic!("Cassette Err value is not an ApiError: {e}")));
    }
    panic!("Cassette output must be {{\"Ok\": ..}} or {{\"Err\": ..}}, got {output}");
}
