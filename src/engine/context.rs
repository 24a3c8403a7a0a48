// ABOUTME: ToolContext - what a handler sees besides its input.
// ABOUTME: Bundles the call's trace, the acquired session, and engine config.

use crate::config::EngineConfig;
use crate::error::ToolError;
use crate::session::Session;
use crate::surface::{self, Page, Resolved, SelectorCandidate};
use crate::trace::TraceRecorder;

/// Per-call context handed to [`crate::tool::Tool::execute`].
///
/// Fields are public so a handler can borrow the trace mutably while
/// reading the session.
pub struct ToolContext<'a> {
    /// This call's trace; owned by the engine for the duration of the call.
    pub trace: &'a mut TraceRecorder,

    /// The session, held exclusively by this call.
    pub session: &'a Session,

    pub config: &'a EngineConfig,
}

impl ToolContext<'_> {
    pub fn trace_id(&self) -> &str {
        self.trace.trace_id()
    }

    pub fn page(&self) -> &dyn Page {
        self.session.page()
    }

    /// Resolve the first visible candidate using the configured timeout.
    pub async fn resolve(
        &mut self,
        candidates: &[SelectorCandidate],
    ) -> Result<Resolved, ToolError> {
        surface::resolve(
            self.session.page(),
            self.trace,
            candidates,
            self.config.resolve_timeout(),
        )
        .await
    }

    /// Resolve and click using the configured timeout.
    pub async fn click(&mut self, candidates: &[SelectorCandidate]) -> Result<Resolved, ToolError> {
        surface::click(
            self.session.page(),
            self.trace,
            candidates,
            self.config.resolve_timeout(),
        )
        .await
    }

    /// Resolve and fill using the configured timeout.
    pub async fn fill(
        &mut self,
        candidates: &[SelectorCandidate],
        text: &str,
    ) -> Result<Resolved, ToolError> {
        surface::fill(
            self.session.page(),
            self.trace,
            candidates,
            text,
            self.config.resolve_timeout(),
        )
        .await
    }

    /// Navigate with the configured retry policy.
    pub async fn navigate(&mut self, url: &str) -> Result<(), ToolError> {
        surface::navigate(
            self.session.page(),
            self.trace,
            url,
            self.config.navigate_options(),
        )
        .await
    }
}
