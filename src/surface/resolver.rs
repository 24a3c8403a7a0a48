// ABOUTME: Target resolver - ordered, first-match-wins fallback over candidates.
// ABOUTME: Also provides click and fill primitives composed on top of it.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{ElementHandle, Page, SelectorCandidate};
use crate::error::ToolError;
use crate::tool::ErrorCode;
use crate::trace::TraceRecorder;

/// The element a resolution settled on.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub element: ElementHandle,

    /// Label of the candidate that matched.
    pub label: String,

    /// Position of that candidate in the caller's list.
    pub index: usize,
}

/// Find the first candidate that becomes visible.
///
/// Candidates are tried strictly in the given order, each for at most
/// `timeout`; later candidates are never evaluated once one matches. Fails
/// with a fatal `SELECTOR_CHANGED` when every candidate misses.
pub async fn resolve(
    page: &dyn Page,
    trace: &mut TraceRecorder,
    candidates: &[SelectorCandidate],
    timeout: Duration,
) -> Result<Resolved, ToolError> {
    let mut tried = Vec::with_capacity(candidates.len());

    for (index, candidate) in candidates.iter().enumerate() {
        let label = candidate.label_text();
        trace.record("resolve.try", &label, candidate.strategy().name());
        debug!("Trying candidate {}: {}", index, label);

        match page.wait_visible(candidate, timeout).await {
            Ok(element) => {
                trace.record("resolve.match", &label, "");
                info!("Resolved element using {}", label);
                return Ok(Resolved {
                    element,
                    label,
                    index,
                });
            }
            Err(e) => {
                trace.record("resolve.miss", &label, e.to_string());
                debug!("Candidate {} not matched: {}", label, e);
                tried.push(label);
            }
        }
    }

    warn!("All {} candidates exhausted", tried.len());
    Err(ToolError::fatal(ErrorCode::SelectorChanged).with_data("tried", tried))
}

/// Resolve a target and click it.
pub async fn click(
    page: &dyn Page,
    trace: &mut TraceRecorder,
    candidates: &[SelectorCandidate],
    timeout: Duration,
) -> Result<Resolved, ToolError> {
    let resolved = resolve(page, trace, candidates, timeout).await?;
    page.click(&resolved.element)
        .await
        .map_err(|e| detached(&resolved, "click", e))?;
    trace.record("click.done", &resolved.label, "");
    Ok(resolved)
}

/// Resolve a target and replace its value with `text`.
pub async fn fill(
    page: &dyn Page,
    trace: &mut TraceRecorder,
    candidates: &[SelectorCandidate],
    text: &str,
    timeout: Duration,
) -> Result<Resolved, ToolError> {
    let resolved = resolve(page, trace, candidates, timeout).await?;
    page.fill(&resolved.element, text)
        .await
        .map_err(|e| detached(&resolved, "fill", e))?;
    trace.record(
        "fill.done",
        &resolved.label,
        format!("{} chars", text.chars().count()),
    );
    Ok(resolved)
}

fn detached(resolved: &Resolved, action: &str, err: crate::error::DriverError) -> ToolError {
    warn!("{} on {} failed after resolve: {}", action, resolved.label, err);
    ToolError::fatal(ErrorCode::SelectorChanged)
        .with_message(format!("{action} failed on {}: {err}", resolved.label))
        .with_data("target", &resolved.label)
}
