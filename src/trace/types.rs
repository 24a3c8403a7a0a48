// ABOUTME: Trace data types - the ordered step log and final outcome of a call.
// ABOUTME: Serialized as the per-call trace file.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tool::{ErrorCode, ToolStatus};

/// One entry in a trace. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    pub timestamp: DateTime<Utc>,

    /// What was attempted, e.g. `resolve.try` or `navigate.done`.
    pub action: String,

    /// What it was attempted on (a selector label, a URL, a tool name).
    pub target: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl TraceStep {
    pub fn new(
        action: impl Into<String>,
        target: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.into(),
            target: target.into(),
            note: note.into(),
        }
    }
}

/// The full log of a single tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    pub trace_id: String,
    pub tool_name: String,
    pub started_at: DateTime<Utc>,

    /// `None` until the trace is completed.
    pub finished_at: Option<DateTime<Utc>>,

    pub status: Option<ToolStatus>,
    pub code: Option<ErrorCode>,
    pub message: Option<String>,
    pub steps: Vec<TraceStep>,

    /// Where the trace was persisted, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl TraceRecord {
    pub fn is_completed(&self) -> bool {
        self.finished_at.is_some()
    }
}
