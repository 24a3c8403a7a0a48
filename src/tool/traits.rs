// ABOUTME: Defines the Tool trait - a named, schema-validated operation.
// ABOUTME: Handlers receive validated input plus a per-call context.

use async_trait::async_trait;

use super::ToolOutput;
use crate::engine::ToolContext;

/// A named operation the engine can execute.
///
/// `execute` only ever sees input that already passed `schema()`. Failures
/// should be raised as [`crate::ToolError`] wrapped in `anyhow::Error`; any
/// other error is reported as `UNKNOWN_ERROR`, except `serde_json` errors,
/// which are reported as `VALIDATION_ERROR`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for callers.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with validated parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &mut ToolContext<'_>,
    ) -> Result<ToolOutput, anyhow::Error>;
}
