// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use surefoot::prelude::*;` to get started quickly.

pub use crate::config::EngineConfig;
pub use crate::engine::{
    Diagnostics, DiagnosticsCapture, Engine, PageDiagnostics, ToolContext, best_effort,
};
pub use crate::error::{
    DriverError, IdempotencyError, Severity, SurefootError, ToolError, TraceError, ValidationError,
};
pub use crate::idempotency::{IdempotencyStore, IdempotentOutcome, fingerprint};
pub use crate::session::{Session, SessionHandle};
pub use crate::surface::{
    Cookie, ElementHandle, NavigateOptions, Page, Resolved, ScriptedElement, ScriptedPage,
    SelectorCandidate, TextPattern,
};
pub use crate::tool::{
    ErrorCode, Registry, Tool, ToolDefinition, ToolOutput, ToolResult, ToolStatus,
};
pub use crate::trace::{TraceRecord, TraceRecorder, TraceStep, TraceStore};
