// ABOUTME: Navigation with a fixed number of immediate retries.
// ABOUTME: Exhausting the attempts yields a retryable NAVIGATION_TIMEOUT.

use std::time::Duration;

use tracing::{info, warn};

use super::Page;
use crate::error::ToolError;
use crate::tool::ErrorCode;
use crate::trace::TraceRecorder;

/// Retry settings for [`navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Total attempts, including the first (minimum 1).
    pub attempts: u32,

    /// Per-attempt load timeout.
    pub timeout: Duration,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            attempts: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Navigate to `url`, retrying immediately on failure.
///
/// There is no delay between attempts; the bound is the attempt count.
pub async fn navigate(
    page: &dyn Page,
    trace: &mut TraceRecorder,
    url: &str,
    options: NavigateOptions,
) -> Result<(), ToolError> {
    let attempts = options.attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        trace.record("navigate.try", url, format!("attempt {attempt}/{attempts}"));
        match page.goto(url, options.timeout).await {
            Ok(()) => {
                trace.record("navigate.done", url, "");
                info!("Navigated to {} on attempt {}", url, attempt);
                return Ok(());
            }
            Err(e) => {
                warn!("Navigation to {} failed (attempt {}): {}", url, attempt, e);
                last_error = e.to_string();
                trace.record("navigate.fail", url, &last_error);
            }
        }
    }

    Err(ToolError::retryable(ErrorCode::NavigationTimeout)
        .with_data("url", url)
        .with_data("attempts", attempts)
        .with_data("cause", last_error))
}
