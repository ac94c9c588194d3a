//! Live adapter for the `TaskApi` port over HTTP.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::ports::task_api::{ApiFuture, TaskApi};
use crate::settings::ApiContract;
use crate::task::{DeleteAck, Task, TaskDraft, TaskId, TaskPatch};

/// Task client that calls a REST todo service.
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
    contract: ApiContract,
}

impl HttpTaskApi {
    /// Creates a client for the service at `base_url` speaking `contract`.
    pub fn new(base_url: impl Into<String>, contract: ApiContract) -> Self {
        Self { client: Client::new(), base_url: base_url.into(), contract }
    }

    fn endpoint(&self, route: Route) -> String {
        let path = match (route, self.contract) {
            (Route::List, _) | (Route::Create, ApiContract::Typicode) => "/todos".to_string(),
            (Route::Create, ApiContract::Dummyjson) => "/todos/add".to_string(),
            (Route::Item(id), _) => format!("/todos/{id}"),
        };
        format!("{}{path}", self.base_url)
    }

    fn update_method(&self) -> Method {
        match self.contract {
            ApiContract::Typicode => Method::PATCH,
            ApiContract::Dummyjson => Method::PUT,
        }
    }

    fn draft_body(&self, draft: &TaskDraft) -> serde_json::Value {
        let body = DraftBody {
            title: (self.contract == ApiContract::Typicode).then_some(draft.title.as_str()),
            todo: (self.contract == ApiContract::Dummyjson).then_some(draft.title.as_str()),
            completed: draft.completed,
            user_id: draft.owner_id,
        };
        serde_json::to_value(body).unwrap_or_default()
    }

    fn patch_body(&self, patch: &TaskPatch) -> serde_json::Value {
        let title = patch.title.as_deref();
        let body = PatchBody {
            title: title.filter(|_| self.contract == ApiContract::Typicode),
            todo: title.filter(|_| self.contract == ApiContract::Dummyjson),
            completed: patch.completed,
        };
        serde_json::to_value(body).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
enum Route {
    List,
    Create,
    Item(TaskId),
}

/// Create body. Exactly one of `title`/`todo` is set, per contract.
#[derive(Serialize)]
struct DraftBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    todo: Option<&'a str>,
    completed: bool,
    #[serde(rename = "userId")]
    user_id: i64,
}

#[derive(Serialize)]
struct PatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    todo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

/// List response of the `dummyjson` contract.
#[derive(Deserialize)]
struct WrappedList {
    todos: Vec<Task>,
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(|e| {
        tracing::warn!(error = %e, "task service unreachable");
        ApiError::Transport { message: e.to_string() }
    })?;
    let status = response.status();
    if !status.is_success() {
        let code = status.as_u16();
        tracing::warn!(status = code, url = %response.url(), "task service rejected request");
        return Err(ApiError::HttpStatus { code: status.as_u16() });
    }
    Ok(response)
}

async fn read_body(response: Response) -> Result<String, ApiError> {
    response.text().await.map_err(|e| ApiError::Transport { message: e.to_string() })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode { message: e.to_string() })
}

/// Decodes a list response in the shape used by `contract`.
pub(crate) fn decode_list(contract: ApiContract, body: &str) -> Result<Vec<Task>, ApiError> {
    match contract {
        ApiContract::Typicode => decode(body),
        ApiContract::Dummyjson => decode::<WrappedList>(body).map(|list| list.todos),
    }
}

/// Interprets a delete response body. Anything that is not a task is a plain confirmation.
pub(crate) fn decode_delete(body: &str) -> DeleteAck {
    serde_json::from_str::<Task>(body).map_or(DeleteAck::Confirmed, DeleteAck::Echoed)
}

impl TaskApi for HttpTaskApi {
    fn list(&self) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let url = self.endpoint(Route::List);
            tracing::debug!(%url, "listing tasks");
            let response = send(self.client.get(&url)).await?;
            let body = read_body(response).await?;
            decode_list(self.contract, &body)
        })
    }

    fn create(&self, draft: &TaskDraft) -> ApiFuture<'_, Task> {
        let body = self.draft_body(draft);
        Box::pin(async move {
            let url = self.endpoint(Route::Create);
            tracing::debug!(%url, "creating task");
            let response = send(self.client.post(&url).json(&body)).await?;
            decode(&read_body(response).await?)
        })
    }

    fn update(&self, id: TaskId, patch: &TaskPatch) -> ApiFuture<'_, Task> {
        let body = self.patch_body(patch);
        Box::pin(async move {
            let url = self.endpoint(Route::Item(id));
            tracing::debug!(%url, %id, "updating task");
            let request = self.client.request(self.update_method(), &url).json(&body);
            let response = send(request).await?;
            decode(&read_body(response).await?)
        })
    }

    fn delete(&self, id: TaskId) -> ApiFuture<'_, DeleteAck> {
        Box::pin(async move {
            let url = self.endpoint(Route::Item(id));
            tracing::debug!(%url, %id, "deleting task");
            let response = send(self.client.delete(&url)).await?;
            Ok(decode_delete(&read_body(response).await?))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typicode() -> HttpTaskApi {
        HttpTaskApi::new("https://jsonplaceholder.typicode.com", ApiContract::Typicode)
    }

    fn dummyjson() -> HttpTaskApi {
        HttpTaskApi::new("https://dummyjson.com", ApiContract::Dummyjson)
    }

    #[test]
    fn routes_follow_contract() {
        let create = typicode().endpoint(Route::Create);
        assert_eq!(create, "https://jsonplaceholder.typicode.com/todos");
        assert_eq!(dummyjson().endpoint(Route::Create), "https://dummyjson.com/todos/add");
        assert_eq!(dummyjson().endpoint(Route::Item(TaskId(5))), "https://dummyjson.com/todos/5");
        assert_eq!(typicode().update_method(), Method::PATCH);
        assert_eq!(dummyjson().update_method(), Method::PUT);
    }

    #[test]
    fn draft_body_uses_contract_field_names() {
        let draft = TaskDraft::new("Buy milk", 1);
        assert_eq!(
            typicode().draft_body(&draft),
            json!({"title": "Buy milk", "completed": false, "userId": 1})
        );
        assert_eq!(
            dummyjson().draft_body(&draft),
            json!({"todo": "Buy milk", "completed": false, "userId": 1})
        );
    }

    #[test]
    fn patch_body_omits_absent_fields() {
        assert_eq!(typicode().patch_body(&TaskPatch::completed(true)), json!({"completed": true}));
        let rename = TaskPatch { title: Some("x".into()), completed: None };
        assert_eq!(dummyjson().patch_body(&rename), json!({"todo": "x"}));
    }

    #[test]
    fn wrapped_list_is_unwrapped() {
        let body = r#"{
            "todos": [{"id": 1, "todo": "a", "completed": false, "userId": 3}],
            "total": 1, "skip": 0, "limit": 30
        }"#;
        let tasks = decode_list(ApiContract::Dummyjson, body).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "a");
        assert_eq!(tasks[0].owner_id, 3);
    }

    #[test]
    fn wrong_list_shape_is_a_decode_error() {
        let err = decode_list(ApiContract::Typicode, r#"{"todos":[]}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn delete_body_may_echo_or_confirm() {
        assert_eq!(decode_delete("{}"), DeleteAck::Confirmed);
        assert_eq!(decode_delete(""), DeleteAck::Confirmed);
        let body = r#"{"id": 5, "todo": "a", "completed": true, "userId": 1, "isDeleted": true}"#;
        let echoed = decode_delete(body);
        assert!(matches!(echoed, DeleteAck::Echoed(task) if task.id == TaskId(5)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let api = HttpTaskApi::new("http://127.0.0.1:9", ApiContract::Typicode);
        let err = api.list().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }), "got {err:?}");
    }
}
