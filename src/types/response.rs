//! Transport-neutral response written by handlers.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Status codes the dispatcher and CRUD handlers produce.
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const NO_CONTENT: u16 = 204;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// Body of every aborted dispatch: `{"error": message}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn into_json(self) -> Value {
        json!(self)
    }
}

/// The response under construction. A response nobody wrote to is
/// "unhandled" and lets the host router fall through.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RestResponse {
    status: Option<u16>,
    body: Option<Value>,
}

impl RestResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, code: u16) -> &mut Self {
        self.status = Some(code);
        self
    }

    pub fn write_json(&mut self, body: Value) -> &mut Self {
        self.body = Some(body);
        self
    }

    /// Status and body in one go.
    pub fn respond(&mut self, code: u16, body: Value) -> &mut Self {
        self.set_status(code).write_json(body)
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn is_handled(&self) -> bool {
        self.status.is_some() || self.body.is_some()
    }
}
