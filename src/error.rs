//! Errors surfaced by the task client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single task client call.
///
/// Errors are serializable so recorded sessions can replay the exact
/// failure a live service produced.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    /// The request never reached the service or no response came back.
    #[error("request failed: {message}")]
    Transport {
        /// Description from the HTTP client.
        message: String,
    },
    /// A response arrived with a non-success status.
    #[error("Response status: {code}")]
    HttpStatus {
        /// The HTTP status code.
        code: u16,
    },
    /// A success response whose body could not be understood.
    #[error("malformed response body: {message}")]
    Decode {
        /// Description of the parse failure.
        message: String,
    },
}

impl ApiError {
    /// The status code, when the service answered with one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { code } => Some(*code),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_error_displays_code() {
        assert_eq!(ApiError::HttpStatus { code: 500 }.to_string(), "Response status: 500");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let value = serde_json::to_value(ApiError::HttpStatus { code: 404 }).unwrap();
        assert_eq!(value, json!({"kind": "http_status", "code": 404}));
        let back: ApiError = serde_json::from_value(value).unwrap();
        assert_eq!(back.status(), Some(404));
    }
}
