// ABOUTME: Tests for Engine - envelope defaults, validation, failure mapping,
// ABOUTME: diagnostics, trace finalization, and session serialization.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;

use super::*;
use crate::config::EngineConfig;
use crate::error::ToolError;
use crate::idempotency::IdempotencyStore;
use crate::session::{Session, SessionHandle};
use crate::surface::{ScriptedPage, SelectorCandidate};
use crate::tool::{ErrorCode, Tool, ToolOutput, ToolStatus};

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    DeclareRetryable,
    Captcha,
    MissingButton,
    Anyhow,
    Panic,
    TypedParse,
    Slow,
}

struct ScenarioTool {
    name: &'static str,
    behavior: Behavior,
    schema: Value,
    calls: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl ScenarioTool {
    fn new(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            schema: json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "count": {"type": "integer"}
                }
            }),
            calls: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }
}

#[derive(Deserialize)]
struct TitleParams {
    title: String,
}

#[async_trait]
impl Tool for ScenarioTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Scenario tool for engine tests"
    }

    fn schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(
        &self,
        params: Value,
        ctx: &mut ToolContext<'_>,
    ) -> Result<ToolOutput, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(ToolOutput::new().field("echo", params)),
            Behavior::DeclareRetryable => Ok(ToolOutput::new().status(ToolStatus::RetryableError)),
            Behavior::Captcha => Err(ToolError::needs_human(ErrorCode::CaptchaRequired)
                .with_data("site", "example")
                .into()),
            Behavior::MissingButton => {
                ctx.click(&[SelectorCandidate::role("button", "Publish")])
                    .await?;
                Ok(ToolOutput::new())
            }
            Behavior::Anyhow => Err(anyhow::anyhow!("database unreachable")),
            Behavior::Panic => panic!("handler exploded"),
            Behavior::TypedParse => {
                let parsed: TitleParams = serde_json::from_value(params)?;
                Ok(ToolOutput::new().field("title", parsed.title))
            }
            Behavior::Slow => {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_active.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                self.active.fetch_sub(1, Ordering::SeqCst);
                Ok(ToolOutput::new())
            }
        }
    }
}

#[derive(Clone, Copy)]
enum CaptureMode {
    Paths,
    Fail,
    Panic,
}

struct CountingCapture {
    mode: CaptureMode,
    calls: Arc<AtomicUsize>,
}

impl CountingCapture {
    fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl DiagnosticsCapture for CountingCapture {
    async fn capture(&self, _session: &Session, trace_id: &str) -> anyhow::Result<Diagnostics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            CaptureMode::Paths => Ok(Diagnostics {
                screenshot_path: Some(format!("/diag/{}.png", trace_id).into()),
                html_path: Some(format!("/diag/{}.html", trace_id).into()),
            }),
            CaptureMode::Fail => Err(anyhow::anyhow!("browser crashed")),
            CaptureMode::Panic => panic!("capture exploded"),
        }
    }
}

fn engine(dir: &TempDir) -> Engine {
    let session = Session::new(
        Arc::new(ScriptedPage::new()),
        IdempotencyStore::open(dir.path().join("idempotency.json")),
    );
    Engine::new(
        SessionHandle::new(session),
        EngineConfig::default().with_traces_dir(dir.path().join("traces")),
    )
}

#[tokio::test]
async fn test_success_defaults() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("echo", Behavior::Succeed);

    let result = engine.execute(&tool, json!({"title": "A"})).await;

    assert!(result.ok);
    assert_eq!(result.status, ToolStatus::Success);
    assert_eq!(result.code, ErrorCode::Ok);
    assert_eq!(result.message, "Operation completed successfully");
    assert_eq!(result.data, json!({"echo": {"title": "A"}}));
    assert!(!result.trace_id.is_empty());
}

#[tokio::test]
async fn test_declared_status_takes_its_default_code() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("flaky", Behavior::DeclareRetryable);

    let result = engine.execute(&tool, json!({})).await;

    assert!(!result.ok);
    assert_eq!(result.status, ToolStatus::RetryableError);
    assert_eq!(result.code, ErrorCode::TemporaryFailure);
}

#[tokio::test]
async fn test_unknown_field_is_rejected_before_handler() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("echo", Behavior::Succeed);

    let result = engine
        .execute(&tool, json!({"title": "A", "tags": ["x"]}))
        .await;

    assert!(!result.ok);
    assert_eq!(result.status, ToolStatus::FatalError);
    assert_eq!(result.code, ErrorCode::ValidationError);
    assert!(result.data["cause"].is_string());
    assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_required_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("create", Behavior::Succeed).with_schema(json!({
        "type": "object",
        "properties": {"title": {"type": "string"}},
        "required": ["title"]
    }));

    let result = engine.execute(&tool, json!({})).await;

    assert_eq!(result.code, ErrorCode::ValidationError);
    assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
    let trace = engine.traces().get(&result.trace_id).await.unwrap();
    assert!(trace.steps.iter().any(|s| s.action == "validate.fail"));
}

#[tokio::test]
async fn test_validation_failure_does_not_wait_for_session() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("echo", Behavior::Succeed);
    let _held = engine.session().try_acquire().unwrap();

    let result = engine.execute(&tool, json!({"title": 7})).await;

    assert_eq!(result.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_handler_parse_error_is_validation_error() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("typed", Behavior::TypedParse);

    let result = engine.execute(&tool, json!({"count": 1})).await;

    assert_eq!(result.status, ToolStatus::FatalError);
    assert_eq!(result.code, ErrorCode::ValidationError);
    assert!(result.data["cause"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_unexpected_error_is_unknown_error() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("broken", Behavior::Anyhow);

    let result = engine.execute(&tool, json!({})).await;

    assert_eq!(result.status, ToolStatus::FatalError);
    assert_eq!(result.code, ErrorCode::UnknownError);
    assert_eq!(result.message, "An unexpected error occurred");
    assert_eq!(result.data["cause"], "database unreachable");
}

#[tokio::test]
async fn test_panic_is_unknown_error() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("panics", Behavior::Panic);

    let result = engine.execute(&tool, json!({})).await;

    assert_eq!(result.code, ErrorCode::UnknownError);
    assert!(result.data["cause"].as_str().unwrap().contains("handler exploded"));
    // The session is released after a panic.
    assert!(engine.session().try_acquire().is_some());
}

#[tokio::test]
async fn test_captcha_needs_user_without_diagnostics() {
    let dir = TempDir::new().unwrap();
    let capture = Arc::new(CountingCapture::new(CaptureMode::Paths));
    let engine = engine(&dir).with_diagnostics(capture.clone());
    let tool = ScenarioTool::new("captcha", Behavior::Captcha);

    let result = engine.execute(&tool, json!({})).await;

    assert_eq!(result.status, ToolStatus::NeedUserAction);
    assert_eq!(result.code, ErrorCode::CaptchaRequired);
    assert_eq!(result.data, json!({"site": "example"}));
    assert_eq!(capture.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_selector_changed_merges_diagnostics() {
    let dir = TempDir::new().unwrap();
    let capture = Arc::new(CountingCapture::new(CaptureMode::Paths));
    let engine = engine(&dir).with_diagnostics(capture.clone());
    let tool = ScenarioTool::new("publish", Behavior::MissingButton);

    let result = engine.execute(&tool, json!({})).await;

    assert_eq!(result.status, ToolStatus::FatalError);
    assert_eq!(result.code, ErrorCode::SelectorChanged);
    assert_eq!(capture.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        result.data["screenshotPath"],
        format!("/diag/{}.png", result.trace_id)
    );
    assert_eq!(result.data["htmlPath"], format!("/diag/{}.html", result.trace_id));
    assert_eq!(result.data["tried"], json!(["role=button[name=\"Publish\"]"]));
}

#[tokio::test]
async fn test_failing_diagnostics_are_swallowed() {
    for mode in [CaptureMode::Fail, CaptureMode::Panic] {
        let dir = TempDir::new().unwrap();
        let capture = Arc::new(CountingCapture::new(mode));
        let engine = engine(&dir).with_diagnostics(capture.clone());
        let tool = ScenarioTool::new("publish", Behavior::MissingButton);

        let result = engine.execute(&tool, json!({})).await;

        assert_eq!(result.code, ErrorCode::SelectorChanged);
        assert_eq!(capture.calls.load(Ordering::SeqCst), 1);
        assert!(result.data.get("screenshotPath").is_none());
    }
}

#[tokio::test]
async fn test_every_call_writes_a_finished_trace() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let ok = ScenarioTool::new("echo", Behavior::Succeed);
    let broken = ScenarioTool::new("broken", Behavior::Anyhow);

    let results = vec![
        engine.execute(&ok, json!({})).await,
        engine.execute(&broken, json!({})).await,
        engine.execute(&ok, json!({"nope": true})).await,
    ];

    for result in results {
        let path = dir
            .path()
            .join("traces")
            .join(format!("{}.json", result.trace_id));
        let trace: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert!(trace["finishedAt"].is_string());
        assert_eq!(trace["status"], result.status.as_str());
        assert_eq!(trace["code"], result.code.as_str());
        let last = trace["steps"].as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["action"], "end");
        assert_eq!(
            last["note"],
            format!("{}:{}", result.status.as_str(), result.code.as_str())
        );
    }
}

#[tokio::test]
async fn test_call_unknown_tool() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    let result = engine.call("does_not_exist", json!({})).await;

    assert_eq!(result.status, ToolStatus::FatalError);
    assert_eq!(result.code, ErrorCode::UnsupportedInput);
    assert_eq!(result.data["tool"], "does_not_exist");
    let trace = engine.traces().get(&result.trace_id).await.unwrap();
    assert!(trace.is_completed());
}

#[tokio::test]
async fn test_call_registered_tool_and_latest_trace() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    engine
        .register(ScenarioTool::new("echo", Behavior::Succeed))
        .await;

    let first = engine.call("echo", json!({"title": "one"})).await;
    let second = engine.call("echo", json!({"title": "two"})).await;

    assert!(first.ok && second.ok);
    let latest = engine.traces().latest().await.unwrap();
    assert_eq!(latest.trace_id, second.trace_id);
    assert_eq!(latest.tool_name, "echo");
    assert_eq!(engine.traces().len().await, 2);
}

#[tokio::test]
async fn test_calls_on_one_session_do_not_overlap() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let tool = ScenarioTool::new("slow", Behavior::Slow);

    let (a, b, c) = tokio::join!(
        engine.execute(&tool, json!({})),
        engine.execute(&tool, json!({})),
        engine.execute(&tool, json!({})),
    );

    assert!(a.ok && b.ok && c.ok);
    assert_eq!(tool.calls.load(Ordering::SeqCst), 3);
    assert_eq!(tool.max_active.load(Ordering::SeqCst), 1);
}
