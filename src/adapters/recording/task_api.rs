//! Recording adapter for the `TaskApi` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::format::TASKS_PORT;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::task_api::{ApiFuture, TaskApi};
use crate::task::{DeleteAck, Task, TaskDraft, TaskId, TaskPatch};

/// Records task client calls while delegating to an inner client.
pub struct RecordingTaskApi {
    inner: Box<dyn TaskApi>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTaskApi {
    /// Wraps `inner`, appending every call to `recorder`.
    pub fn new(inner: Box<dyn TaskApi>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct UpdateInput<'a> {
    id: TaskId,
    patch: &'a TaskPatch,
}

#[derive(Serialize)]
struct DeleteInput {
    id: TaskId,
}

impl TaskApi for RecordingTaskApi {
    fn list(&self) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let result = self.inner.list().await;
            record_result(&self.recorder, TASKS_PORT, "list", &(), &result);
            result
        })
    }

    fn create(&self, draft: &TaskDraft) -> ApiFuture<'_, Task> {
        let draft = draft.clone();
        Box::pin(async move {
            let result = self.inner.create(&draft).await;
            record_result(&self.recorder, TASKS_PORT, "create", &draft, &result);
            result
        })
    }

    fn update(&self, id: TaskId, patch: &TaskPatch) -> ApiFuture<'_, Task> {
        let patch = patch.clone();
        Box::pin(async move {
            let result = self.inner.update(id, &patch).await;
            let input = UpdateInput { id, patch: &patch };
            record_result(&self.recorder, TASKS_PORT, "update", &input, &result);
            result
        })
    }

    fn delete(&self, id: TaskId) -> ApiFuture<'_, DeleteAck> {
        Box::pin(async move {
            let result = self.inner.delete(id).await;
            record_result(&self.recorder, TASKS_PORT, "delete", &DeleteInput { id }, &result);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::HttpTaskApi;
    use crate::cassette::format::Cassette;
    use crate::settings::ApiContract;
    use serde_json::json;

    #[tokio::test]
    async fn records_failed_list_interaction() {
        let dir = std::env::temp_dir().join("tasklist_rec_tasks_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tasks.cassette.yaml");

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "test", "abc")));

        // Scope the adapter so it's dropped before we try to unwrap
        {
            let unreachable = HttpTaskApi::new("http://127.0.0.1:9", ApiContract::Typicode);
            let api = RecordingTaskApi::new(Box::new(unreachable), Arc::clone(&recorder));
            // Fails to connect, but the failure is still recorded
            let _ = api.list().await;
        }

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        recorder.finish().unwrap();

        let cassette = Cassette::load(&path).unwrap();
        assert_eq!(cassette.interactions.len(), 1);
        assert_eq!(cassette.interactions[0].port, "tasks");
        assert_eq!(cassette.interactions[0].method, "list");
        assert_eq!(cassette.interactions[0].output["Err"]["kind"], json!("transport"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
