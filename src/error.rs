// ABOUTME: Defines all error types for surefoot using thiserror.
// ABOUTME: ToolError is the business failure; the rest are infrastructure errors.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tool::{ErrorCode, ToolStatus};

/// Top-level error type for the surefoot library.
#[derive(Debug, thiserror::Error)]
pub enum SurefootError {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("Idempotency error: {0}")]
    Idempotency(#[from] IdempotencyError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a caller should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A person has to act out-of-band before anything else is attempted.
    NeedsHuman,
    /// The same call may succeed if repeated.
    Retryable,
    /// Repeating the call will not help.
    Fatal,
}

impl Severity {
    /// The result status this severity maps to (1:1).
    pub fn status(&self) -> ToolStatus {
        match self {
            Severity::NeedsHuman => ToolStatus::NeedUserAction,
            Severity::Retryable => ToolStatus::RetryableError,
            Severity::Fatal => ToolStatus::FatalError,
        }
    }
}

/// A classified failure raised by business logic at the point of detection.
///
/// Immutable once built; the engine formats it but never re-classifies it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ToolError {
    severity: Severity,
    code: ErrorCode,
    message: String,
    data: Map<String, Value>,
}

impl ToolError {
    /// Create an error with the code's default message.
    pub fn new(severity: Severity, code: ErrorCode) -> Self {
        Self {
            severity,
            code,
            message: code.default_message().to_string(),
            data: Map::new(),
        }
    }

    /// Create an error that needs a person to intervene.
    pub fn needs_human(code: ErrorCode) -> Self {
        Self::new(Severity::NeedsHuman, code)
    }

    /// Create an error the caller may retry as-is.
    pub fn retryable(code: ErrorCode) -> Self {
        Self::new(Severity::Retryable, code)
    }

    /// Create an error that retrying will not fix.
    pub fn fatal(code: ErrorCode) -> Self {
        Self::new(Severity::Fatal, code)
    }

    /// Replace the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a structured field. Values that fail to serialize are skipped.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.into(), v);
        }
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// Errors reported by a page driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Element detached: {0}")]
    Detached(String),

    #[error("Driver failure: {0}")]
    Driver(String),
}

/// Errors from persisting traces.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the idempotency index.
#[derive(Debug, thiserror::Error)]
pub enum IdempotencyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Result for key '{0}' is not a JSON object")]
    NotAnObject(String),

    #[error("Result for key '{key}' uses reserved field '{field}'")]
    ReservedField { key: String, field: String },
}

/// Errors from input validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid tool schema: {0}")]
    Schema(String),

    #[error("{0}")]
    Rejected(String),
}
