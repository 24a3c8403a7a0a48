// ABOUTME: Engine - runs a tool call end to end and always returns one ToolResult.
// ABOUTME: Validates input, lends out the session, classifies failures, finalizes the trace.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Map, Value, json};
use tracing::{Instrument, info, info_span, warn};

use super::best_effort::panic_message;
use super::{
    DiagnosticsCapture, Failure, PageDiagnostics, ToolContext, best_effort, validate_input,
};
use crate::config::EngineConfig;
use crate::session::SessionHandle;
use crate::tool::{ErrorCode, Registry, Tool, ToolOutput, ToolResult, ToolStatus};
use crate::trace::{TraceRecorder, TraceStore};

/// Executes tools against a single session.
///
/// Calls that reach the handler are serialized on the session; validation
/// failures and unknown tools never touch it.
pub struct Engine {
    session: SessionHandle,
    registry: Registry,
    traces: TraceStore,
    diagnostics: Option<Arc<dyn DiagnosticsCapture>>,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine. Diagnostics go to `config.diagnostics_dir` if set.
    pub fn new(session: SessionHandle, config: EngineConfig) -> Self {
        let diagnostics = config
            .diagnostics_dir
            .clone()
            .map(|dir| Arc::new(PageDiagnostics::new(dir)) as Arc<dyn DiagnosticsCapture>);
        Self {
            session,
            registry: Registry::new(),
            traces: TraceStore::new(config.trace_capacity),
            diagnostics,
            config,
        }
    }

    /// Replace the diagnostics capture.
    pub fn with_diagnostics(mut self, capture: Arc<dyn DiagnosticsCapture>) -> Self {
        self.diagnostics = Some(capture);
        self
    }

    /// Use an existing registry (shared with whoever else holds a clone).
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a tool for [`Engine::call`].
    pub async fn register<T: Tool + 'static>(&self, tool: T) {
        self.registry.register(tool).await;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn traces(&self) -> &TraceStore {
        &self.traces
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute a registered tool by name.
    pub async fn call(&self, name: &str, params: Value) -> ToolResult {
        match self.registry.get(name).await {
            Some(tool) => self.execute(tool.as_ref(), params).await,
            None => {
                let mut trace = self.traces.create_trace(name, self.config.traces_dir.clone());
                trace.record("lookup.miss", name, "");
                let result = ToolResult::build(
                    trace.trace_id(),
                    ToolStatus::FatalError,
                    Some(ErrorCode::UnsupportedInput),
                    Some(format!("Unknown tool: {}", name)),
                    Some(json!({ "tool": name })),
                );
                let span = info_span!("tool", tool = %name, trace_id = %result.trace_id);
                self.finish(trace, result).instrument(span).await
            }
        }
    }

    /// Execute `tool` with raw, unvalidated input.
    pub async fn execute(&self, tool: &dyn Tool, params: Value) -> ToolResult {
        let mut trace = self
            .traces
            .create_trace(tool.name(), self.config.traces_dir.clone());
        let span = info_span!("tool", tool = %tool.name(), trace_id = %trace.trace_id());
        async move {
            let result = self.run(tool, params, &mut trace).await;
            self.finish(trace, result).await
        }
        .instrument(span)
        .await
    }

    async fn run(&self, tool: &dyn Tool, params: Value, trace: &mut TraceRecorder) -> ToolResult {
        if let Err(e) = validate_input(&tool.schema(), &params) {
            trace.record("validate.fail", tool.name(), e.to_string());
            return failure_result(trace.trace_id(), Failure::Validation(e.to_string()));
        }
        trace.record("validate.ok", tool.name(), "");

        let session = self.session.acquire().await;
        let outcome = {
            let mut ctx = ToolContext {
                trace: &mut *trace,
                session: &session,
                config: &self.config,
            };
            AssertUnwindSafe(tool.execute(params, &mut ctx))
                .catch_unwind()
                .await
        };

        let failure = match outcome {
            Ok(Ok(output)) => return success_result(trace.trace_id(), output),
            Ok(Err(err)) => Failure::classify(err),
            Err(panic) => {
                Failure::Unexpected(format!("handler panicked: {}", panic_message(&*panic)))
            }
        };

        let capture = match (&failure, &self.diagnostics) {
            (Failure::Tool(err), Some(capture)) if err.code().triggers_diagnostics() => {
                Some(capture.clone())
            }
            _ => None,
        };
        let mut result = failure_result(trace.trace_id(), failure);
        if let Some(capture) = capture {
            let captured =
                best_effort("diagnostics", capture.capture(&session, trace.trace_id())).await;
            if let Some(diagnostics) = captured {
                let note = serde_json::to_string(&diagnostics).unwrap_or_default();
                trace.record("diagnostics", tool.name(), note);
                if let Value::Object(data) = &mut result.data {
                    diagnostics.merge_into(data);
                }
            }
        }
        result
    }

    async fn finish(&self, mut trace: TraceRecorder, result: ToolResult) -> ToolResult {
        let tool_name = trace.tool_name().to_string();
        trace.record("end", tool_name, format!("{}:{}", result.status, result.code));

        if let Err(e) = trace
            .complete(result.status, result.code, result.message.clone())
            .await
        {
            warn!("Failed to persist trace {}: {}", result.trace_id, e);
        }
        self.traces.save(trace.into_record()).await;

        if result.ok {
            info!(code = %result.code, "Tool call succeeded");
        } else {
            info!(status = %result.status, code = %result.code, "Tool call failed: {}", result.message);
        }
        result
    }
}

fn success_result(trace_id: &str, output: ToolOutput) -> ToolResult {
    ToolResult::build(
        trace_id,
        output.status.unwrap_or(ToolStatus::Success),
        output.code,
        output.message,
        output.data,
    )
}

fn failure_result(trace_id: &str, failure: Failure) -> ToolResult {
    match failure {
        Failure::Validation(cause) => ToolResult::build(
            trace_id,
            ToolStatus::FatalError,
            Some(ErrorCode::ValidationError),
            None,
            Some(json!({ "cause": cause })),
        ),
        Failure::Tool(err) => {
            let data: Map<String, Value> = err.data().clone();
            ToolResult::build(
                trace_id,
                err.severity().status(),
                Some(err.code()),
                Some(err.message().to_string()),
                Some(Value::Object(data)),
            )
        }
        Failure::Unexpected(cause) => ToolResult::build(
            trace_id,
            ToolStatus::FatalError,
            Some(ErrorCode::UnknownError),
            None,
            Some(json!({ "cause": cause })),
        ),
    }
}
