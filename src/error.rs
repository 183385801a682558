use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::status;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RestError {
    /// Client-side failure; the message is surfaced verbatim with a 400.
    #[error("{0}")]
    BadRequest(String),

    #[error("Path `{0}` already exist.")]
    PathExists(String),

    #[error(
        "handler #{index} (priority {priority}) did not signal completion within {timeout_ms}ms"
    )]
    MissingCompletion {
        index: usize,
        priority: i32,
        timeout_ms: u64,
    },

    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("Field `{field}` is declared twice on `{entity}`")]
    DuplicateField { entity: String, field: String },

    #[error("Fields `{first}` and `{second}` on `{entity}` normalize to the same key")]
    AmbiguousField {
        entity: String,
        first: String,
        second: String,
    },

    #[error("Alias `{external}` points to undeclared field `{field}`")]
    UnknownAliasTarget { external: String, field: String },

    #[error("Entity type name must not be empty")]
    EmptyTypeName,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Internal(String),
}

impl RestError {
    /// Shorthand for the client error kind.
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest(message.into())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, RestError::BadRequest(_))
    }

    /// HTTP status a dispatch abort with this error responds with.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            status::BAD_REQUEST
        } else {
            status::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::InvalidConfig(err.to_string())
    }
}
