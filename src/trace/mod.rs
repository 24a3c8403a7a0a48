// ABOUTME: Trace module - per-call step recording and the recent-trace index.
// ABOUTME: Traces are persisted as one JSON file per call when a root is set.

mod recorder;
mod store;
mod types;

pub use recorder::*;
pub use store::*;
pub use types::*;
