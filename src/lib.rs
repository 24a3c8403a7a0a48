// ABOUTME: Root module for surefoot - resilient tool execution over flaky web surfaces.
// ABOUTME: Re-exports the error types; everything else lives in submodules.

pub mod config;
pub mod engine;
pub mod error;
pub mod idempotency;
pub mod prelude;
pub mod session;
pub mod surface;
pub mod tool;
pub mod trace;

pub use error::{SurefootError, ToolError};
