//! Replaying adapter for the `TaskApi` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::format::{Cassette, TASKS_PORT};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::task_api::{ApiFuture, TaskApi};
use crate::task::{DeleteAck, Task, TaskDraft, TaskId, TaskPatch};

/// Serves recorded task client results from a cassette.
///
/// Arguments are not compared against the recording; each method simply
/// returns its next recorded result.
pub struct ReplayingTaskApi {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTaskApi {
    /// Create a replaying client backed by `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    /// Create a replaying client for a loaded cassette.
    #[must_use]
    pub fn from_cassette(cassette: &Cassette) -> Self {
        Self::new(CassetteReplayer::new(cassette))
    }
}

impl TaskApi for ReplayingTaskApi {
    fn list(&self) -> ApiFuture<'_, Vec<Task>> {
        let output = next_output(&self.replayer, TASKS_PORT, "list");
        Box::pin(async move { replay_result(output) })
    }

    fn create(&self, _draft: &TaskDraft) -> ApiFuture<'_, Task> {
        let output = next_output(&self.replayer, TASKS_PORT, "create");
        Box::pin(async move { replay_result(output) })
    }

    fn update(&self, _id: TaskId, _patch: &TaskPatch) -> ApiFuture<'_, Task> {
        let output = next_output(&self.replayer, TASKS_PORT, "update");
        Box::pin(async move { replay_result(output) })
    }

    fn delete(&self, _id: TaskId) -> ApiFuture<'_, DeleteAck> {
        let output = next_output(&self.replayer, TASKS_PORT, "delete");
        Box::pin(async move { replay_result(output) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Interaction;
    use crate::error::ApiError;
    use chrono::Utc;
    use serde_json::json;

    fn replaying(interactions: Vec<(&str, serde_json::Value)>) -> ReplayingTaskApi {
        let interactions = interactions
            .into_iter()
            .enumerate()
            .map(|(seq, (method, output))| Interaction {
                seq: seq as u64,
                port: "tasks".into(),
                method: method.into(),
                input: json!(null),
                output,
            })
            .collect();
        ReplayingTaskApi::from_cassette(&Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        })
    }

    #[tokio::test]
    async fn replays_successes_and_typed_failures() {
        let api = replaying(vec![
            ("list", json!({"Err": {"kind": "http_status", "code": 500}})),
            ("list", json!({"Ok": [{"id": 1, "title": "a", "completed": false, "userId": 1}]})),
            ("delete", json!({"Ok": "Confirmed"})),
        ]);

        assert_eq!(api.list().await.unwrap_err(), ApiError::HttpStatus { code: 500 });
        let tasks = api.list().await.unwrap();
        assert_eq!(tasks[0].id, TaskId(1));
        assert_eq!(api.delete(TaskId(1)).await.unwrap(), DeleteAck::Confirmed);
    }

    #[tokio::test]
    #[should_panic(expected = "Cassette exhausted")]
    async fn unrecorded_call_panics() {
        let api = replaying(vec![]);
        let _ = api.update(TaskId(1), &TaskPatch::completed(true)).await;
    }
}
