// ABOUTME: Defines the Page trait - the seam to the external automation driver.
// ABOUTME: The engine never drives a browser itself; it only talks to a Page.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SelectorCandidate;
use crate::error::DriverError;

/// Driver-assigned reference to a located element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A browser cookie as stored in a session's cookie file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            http_only: false,
            secure: false,
        }
    }
}

/// One logical browsing context driven by an automation backend.
///
/// Implementations dispatch on [`SelectorCandidate::strategy`] to the
/// matching lookup. A page is not safe for interleaved use by several
/// calls; the engine hands it to one call at a time through the session.
#[async_trait]
pub trait Page: Send + Sync {
    /// Wait until an element matching `candidate` is visible.
    ///
    /// Returns `DriverError::Timeout` if nothing appears within `timeout`.
    async fn wait_visible(
        &self,
        candidate: &SelectorCandidate,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Replace the element's value with `text`.
    async fn fill(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    /// Navigate and wait for the page to load.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    /// PNG screenshot of the viewport.
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;

    /// Serialized DOM of the current page.
    async fn content(&self) -> Result<String, DriverError>;

    async fn cookies(&self) -> Result<Vec<Cookie>, DriverError>;

    async fn set_cookies(&self, cookies: &[Cookie]) -> Result<(), DriverError>;
}
