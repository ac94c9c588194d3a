//! Recording adapters that capture interactions to cassettes.

pub mod task_api;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

pub use task_api::RecordingTaskApi;

/// Record a `Result<T, E>` interaction.
///
/// Mirror of `replaying::replay_result`. `Ok(v)` is written as `{"Ok": v}`
/// and `Err(e)` as `{"Err": e}`, both through serde so replay can rebuild
/// the exact value.
pub(crate) fn record_result<I, T, E>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    I: Serialize,
    T: Serialize,
    E: Serialize,
{
    let input_json = match serde_json::to_value(input) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(port, method, error = %e, "skipping recording: input not serializable");
            return;
        }
    };
    let output_json = match result {
        Ok(v) => serde_json::to_value(v).map(|inner| serde_json::json!({ "Ok": inner })),
        Err(e) => serde_json::to_value(e).map(|inner| serde_json::json!({ "Err": inner })),
    };
    let output_json = match output_json {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(port, method, error = %e, "skipping recording: output not serializable");
            return;
        }
    };

    match recorder.lock() {
        Ok(mut guard) => guard.record(port, method, input_json, output_json),
        Err(e) => tracing::warn!(port, method, error = %e, "recorder lock poisoned"),
    }
}
