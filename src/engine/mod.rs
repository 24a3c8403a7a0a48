// ABOUTME: Engine module - the execution pipeline around every tool call.
// ABOUTME: Validation, the per-call context, failure classification, diagnostics.

mod best_effort;
mod context;
mod diagnostics;
mod executor;
mod failure;
mod validate;

pub use best_effort::best_effort;
pub use context::ToolContext;
pub use diagnostics::{Diagnostics, DiagnosticsCapture, PageDiagnostics};
pub use executor::Engine;
pub use failure::Failure;
pub use validate::validate_input;

#[cfg(test)]
mod executor_test;
