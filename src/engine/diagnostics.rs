// ABOUTME: Failure diagnostics - a screenshot and page dump taken when the
// ABOUTME: page no longer looks the way a tool expects.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::best_effort;
use crate::session::Session;

/// Paths of the artifacts a capture produced. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_path: Option<PathBuf>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.screenshot_path.is_none() && self.html_path.is_none()
    }

    /// Add `screenshotPath` / `htmlPath` to a result payload.
    pub fn merge_into(&self, data: &mut Map<String, Value>) {
        if let Some(path) = &self.screenshot_path {
            data.insert(
                "screenshotPath".to_string(),
                Value::String(path.display().to_string()),
            );
        }
        if let Some(path) = &self.html_path {
            data.insert(
                "htmlPath".to_string(),
                Value::String(path.display().to_string()),
            );
        }
    }
}

/// Captures the state of the session after a structural failure.
#[async_trait]
pub trait DiagnosticsCapture: Send + Sync {
    async fn capture(&self, session: &Session, trace_id: &str) -> anyhow::Result<Diagnostics>;
}

/// Writes `<dir>/<traceId>.png` and `<dir>/<traceId>.html` from the page.
#[derive(Debug, Clone)]
pub struct PageDiagnostics {
    dir: PathBuf,
}

impl PageDiagnostics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl DiagnosticsCapture for PageDiagnostics {
    async fn capture(&self, session: &Session, trace_id: &str) -> anyhow::Result<Diagnostics> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let page = session.page();

        let screenshot_path = self.dir.join(format!("{}.png", trace_id));
        let screenshot_path = best_effort("screenshot", async move {
            let bytes = page.screenshot().await?;
            tokio::fs::write(&screenshot_path, bytes).await?;
            Ok::<_, anyhow::Error>(screenshot_path)
        })
        .await;

        let html_path = self.dir.join(format!("{}.html", trace_id));
        let html_path = best_effort("page dump", async move {
            let html = page.content().await?;
            tokio::fs::write(&html_path, html).await?;
            Ok::<_, anyhow::Error>(html_path)
        })
        .await;

        debug!(
            trace_id,
            screenshot = screenshot_path.is_some(),
            html = html_path.is_some(),
            "Captured diagnostics"
        );
        Ok(Diagnostics {
            screenshot_path,
            html_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idempotency::IdempotencyStore;
    use crate::surface::ScriptedPage;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session(page: ScriptedPage, dir: &TempDir) -> Session {
        Session::new(
            Arc::new(page),
            IdempotencyStore::open(dir.path().join("idempotency.json")),
        )
    }

    #[tokio::test]
    async fn test_page_diagnostics_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let session = session(ScriptedPage::new().with_html("<p>hi</p>"), &dir);
        let capture = PageDiagnostics::new(dir.path().join("diag"));

        let diagnostics = capture.capture(&session, "t-1").await.unwrap();

        let html = diagnostics.html_path.clone().unwrap();
        assert_eq!(html, dir.path().join("diag").join("t-1.html"));
        assert_eq!(std::fs::read_to_string(html).unwrap(), "<p>hi</p>");
        assert!(diagnostics.screenshot_path.unwrap().exists());
    }

    #[tokio::test]
    async fn test_failed_captures_yield_empty_diagnostics() {
        let dir = TempDir::new().unwrap();
        let session = session(ScriptedPage::new().with_failing_captures(), &dir);
        let capture = PageDiagnostics::new(dir.path());

        let diagnostics = capture.capture(&session, "t-2").await.unwrap();

        assert!(diagnostics.is_empty());
        assert!(!dir.path().join("t-2.png").exists());
    }

    #[test]
    fn test_merge_into() {
        let diagnostics = Diagnostics {
            screenshot_path: Some(PathBuf::from("/d/t.png")),
            html_path: None,
        };
        let mut data = Map::new();
        diagnostics.merge_into(&mut data);
        assert_eq!(data["screenshotPath"], "/d/t.png");
        assert!(!data.contains_key("htmlPath"));
    }
}
