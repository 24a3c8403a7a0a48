// ABOUTME: Engine configuration - trace storage, wait budgets, diagnostics.
// ABOUTME: Deserializable so hosts can load it from their own config source.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SurefootError;
use crate::surface::NavigateOptions;
use crate::trace::DEFAULT_TRACE_CAPACITY;

/// Configuration for an [`crate::engine::Engine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory for per-call trace files. `None` keeps traces in memory only.
    pub traces_dir: Option<PathBuf>,

    /// Number of recent traces kept in memory.
    pub trace_capacity: usize,

    /// How long the resolver waits for each candidate.
    pub resolve_timeout_ms: u64,

    /// Per-attempt navigation timeout.
    pub navigation_timeout_ms: u64,

    /// Total navigation attempts, including the first.
    pub navigation_attempts: u32,

    /// Directory for failure screenshots and page dumps.
    pub diagnostics_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            traces_dir: None,
            trace_capacity: DEFAULT_TRACE_CAPACITY,
            resolve_timeout_ms: 5_000,
            navigation_timeout_ms: 30_000,
            navigation_attempts: 2,
            diagnostics_dir: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SurefootError> {
        serde_json::from_str(json).map_err(|e| SurefootError::Config(e.to_string()))
    }

    /// Persist traces under `dir`.
    #[must_use]
    pub fn with_traces_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.traces_dir = Some(dir.into());
        self
    }

    /// Set the in-memory trace capacity.
    #[must_use]
    pub fn with_trace_capacity(mut self, capacity: usize) -> Self {
        self.trace_capacity = capacity;
        self
    }

    /// Set the per-candidate resolve timeout.
    #[must_use]
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout_ms = millis(timeout);
        self
    }

    /// Set navigation retry behaviour.
    #[must_use]
    pub fn with_navigation(mut self, attempts: u32, timeout: Duration) -> Self {
        self.navigation_attempts = attempts;
        self.navigation_timeout_ms = millis(timeout);
        self
    }

    /// Write failure diagnostics under `dir`.
    #[must_use]
    pub fn with_diagnostics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diagnostics_dir = Some(dir.into());
        self
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn navigate_options(&self) -> NavigateOptions {
        NavigateOptions {
            attempts: self.navigation_attempts,
            timeout: Duration::from_millis(self.navigation_timeout_ms),
        }
    }
}

/// Whole milliseconds in `timeout`, saturating at `u64::MAX`.
fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}
