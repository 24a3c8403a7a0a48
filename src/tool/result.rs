// ABOUTME: Defines the ToolResult envelope returned for every call and the
// ABOUTME: ToolOutput a handler returns on its success path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ErrorCode, ToolStatus};

/// Uniform response produced exactly once per tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// True iff `status` is `success`.
    pub ok: bool,

    /// Identifier of the trace recorded for this call.
    pub trace_id: String,

    pub status: ToolStatus,

    pub code: ErrorCode,

    /// Human-readable message; never empty.
    pub message: String,

    /// Structured payload; an empty object when nothing was supplied.
    pub data: Value,
}

impl ToolResult {
    /// Build a result, filling in defaults.
    ///
    /// A missing code falls back to the status default, a missing message to
    /// the code default, and missing data to an empty object.
    pub fn build(
        trace_id: impl Into<String>,
        status: ToolStatus,
        code: Option<ErrorCode>,
        message: Option<String>,
        data: Option<Value>,
    ) -> Self {
        let code = code.unwrap_or_else(|| status.default_code());
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| code.default_message().to_string());
        Self {
            ok: status.is_success(),
            trace_id: trace_id.into(),
            status,
            code,
            message,
            data: data.unwrap_or_else(|| Value::Object(Map::new())),
        }
    }

    /// Whether a transport should flag this response as an error.
    pub fn is_error(&self) -> bool {
        !self.ok
    }

    /// Render the envelope as the textual payload of a transport response.
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                r#"{{"ok":false,"traceId":"{}","status":"fatal_error","code":"UNKNOWN_ERROR","message":"failed to serialize result: {}","data":{{}}}}"#,
                self.trace_id, e
            )
        })
    }
}

/// Partial result a handler returns when it completes without failing.
///
/// Every field is optional; an empty output becomes `success` / `OK`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub status: Option<ToolStatus>,
    pub code: Option<ErrorCode>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl ToolOutput {
    /// Create an empty (successful) output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an output carrying the given payload.
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Set the declared status.
    pub fn status(mut self, status: ToolStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the declared code.
    pub fn code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add a field to the payload object, creating it if needed.
    ///
    /// Values that fail to serialize are skipped; a non-object payload is
    /// replaced by an object.
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            match self.data.as_mut() {
                Some(Value::Object(map)) => {
                    map.insert(key.into(), v);
                }
                _ => {
                    let mut map = Map::new();
                    map.insert(key.into(), v);
                    self.data = Some(Value::Object(map));
                }
            }
        }
        self
    }
}
