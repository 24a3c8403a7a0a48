// ABOUTME: TraceRecorder - the single-writer, append-only step log of one call.
// ABOUTME: Completing it freezes the record and persists it as JSON.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, warn};

use super::{TraceRecord, TraceStep};
use crate::error::TraceError;
use crate::tool::{ErrorCode, ToolStatus};

/// Records the steps of one tool call.
///
/// Lifecycle is `open -> recording -> completed`. Steps recorded after
/// completion are dropped; a second `complete` leaves the record untouched.
#[derive(Debug)]
pub struct TraceRecorder {
    record: TraceRecord,
    root: Option<PathBuf>,
    completed: bool,
}

impl TraceRecorder {
    /// Open a recorder and record the synthetic `start` step.
    ///
    /// With `root` set, `complete` writes `<root>/<trace_id>.json`.
    pub fn open(
        trace_id: impl Into<String>,
        tool_name: impl Into<String>,
        root: Option<PathBuf>,
    ) -> Self {
        let tool_name = tool_name.into();
        let start = TraceStep::new("start", tool_name.clone(), "");
        Self {
            record: TraceRecord {
                trace_id: trace_id.into(),
                tool_name,
                started_at: start.timestamp,
                finished_at: None,
                status: None,
                code: None,
                message: None,
                steps: vec![start],
                file: None,
            },
            root,
            completed: false,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.record.trace_id
    }

    pub fn tool_name(&self) -> &str {
        &self.record.tool_name
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.record.steps
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Append a step.
    pub fn record(
        &mut self,
        action: impl Into<String>,
        target: impl Into<String>,
        note: impl Into<String>,
    ) {
        let step = TraceStep::new(action, target, note);
        if self.completed {
            warn!(
                trace_id = %self.record.trace_id,
                action = %step.action,
                "Dropping step recorded after trace completion"
            );
            return;
        }
        debug!(
            trace_id = %self.record.trace_id,
            action = %step.action,
            target = %step.target,
            "trace step"
        );
        self.record.steps.push(step);
    }

    /// Finalize the record with the call's outcome, persist it, and return it.
    ///
    /// The record is frozen even if writing the file fails. Completing an
    /// already completed trace returns the frozen record untouched.
    pub async fn complete(
        &mut self,
        status: ToolStatus,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<&TraceRecord, TraceError> {
        if self.completed {
            return Ok(&self.record);
        }
        self.completed = true;
        self.record.finished_at = Some(Utc::now());
        self.record.status = Some(status);
        self.record.code = Some(code);
        self.record.message = Some(message.into());

        let Some(root) = self.root.as_ref() else {
            return Ok(&self.record);
        };
        let path = root.join(format!("{}.json", self.record.trace_id));
        self.record.file = Some(path.clone());

        let written = async {
            tokio::fs::create_dir_all(root).await?;
            let json = serde_json::to_vec_pretty(&self.record)?;
            tokio::fs::write(&path, json).await?;
            Ok::<_, TraceError>(())
        }
        .await;

        match written {
            Ok(()) => Ok(&self.record),
            Err(e) => {
                self.record.file = None;
                Err(e)
            }
        }
    }

    /// A copy of the record as it currently stands.
    pub fn snapshot(&self) -> TraceRecord {
        self.record.clone()
    }

    /// Consume the recorder, yielding its record.
    pub fn into_record(self) -> TraceRecord {
        self.record
    }
}
