// ABOUTME: Failure - the single place handler errors are classified.
// ABOUTME: Typed ToolErrors pass through; parse errors and the rest are downgraded.

use crate::error::{SurefootError, ToolError, ValidationError};

/// A handler failure after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// The input could not be parsed or validated.
    Validation(String),

    /// A failure the handler classified itself.
    Tool(ToolError),

    /// Anything else, including panics.
    Unexpected(String),
}

impl Failure {
    /// Classify an error returned by a handler.
    pub fn classify(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ToolError>() {
            Ok(tool) => return Failure::Tool(tool),
            Err(err) => err,
        };
        let err = match err.downcast::<SurefootError>() {
            Ok(SurefootError::Tool(tool)) => return Failure::Tool(tool),
            Ok(SurefootError::Validation(v)) => return Failure::Validation(v.to_string()),
            Ok(other) => return Failure::Unexpected(other.to_string()),
            Err(err) => err,
        };
        if let Some(v) = err.downcast_ref::<ValidationError>() {
            return Failure::Validation(v.to_string());
        }
        if let Some(e) = err.downcast_ref::<serde_json::Error>() {
            return Failure::Validation(e.to_string());
        }
        Failure::Unexpected(format!("{:#}", err))
    }
}
