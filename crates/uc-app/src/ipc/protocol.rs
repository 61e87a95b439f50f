//! IPC request/response envelopes (spec.md §4.F).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub command: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

impl Response {
    pub fn ok(data: impl Serialize) -> Self {
        Self {
            status: Status::Ok,
            message: None,
            data: Some(serde_json::to_value(data).unwrap_or(Value::Null)),
        }
    }

    pub fn ok_empty() -> Self {
        Self { status: Status::Ok, message: None, data: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: Status::Error, message: Some(message.into()), data: None }
    }
}

impl From<uc_core::ports::errors::CoreError> for Response {
    fn from(err: uc_core::ports::errors::CoreError) -> Self {
        Response::error(err.to_string())
    }
}
