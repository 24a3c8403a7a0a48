// ABOUTME: ScriptedPage - an in-memory Page with a fixed element set.
// ABOUTME: Useful for tests and dry runs; records every probe and action.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Cookie, ElementHandle, Page, SelectorCandidate, TextPattern};
use crate::error::DriverError;

/// An element on a [`ScriptedPage`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptedElement {
    pub id: String,
    pub role: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub css: Vec<String>,
    pub placeholder: Option<String>,
    pub label: Option<String>,
    pub visible: bool,
}

impl ScriptedElement {
    /// A visible element with no attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: true,
            ..Self::default()
        }
    }

    pub fn role(mut self, role: impl Into<String>, name: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self.name = Some(name.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn css(mut self, query: impl Into<String>) -> Self {
        self.css.push(query.into());
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.label = Some(text.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn matches(&self, candidate: &SelectorCandidate) -> bool {
        fn field(value: &Option<String>, pattern: &TextPattern) -> bool {
            value.as_deref().is_some_and(|v| pattern.matches(v))
        }

        match candidate {
            SelectorCandidate::Role { role, name } => {
                self.role.as_deref() == Some(role.as_str())
                    && name.as_ref().is_none_or(|p| field(&self.name, p))
            }
            SelectorCandidate::Text(p) => field(&self.text, p),
            SelectorCandidate::Css(q) => self.css.iter().any(|c| c == q),
            SelectorCandidate::Placeholder(p) => field(&self.placeholder, p),
            SelectorCandidate::Label(p) => field(&self.label, p),
        }
    }
}

/// An action performed against a [`ScriptedPage`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedAction {
    Click(String),
    Fill(String, String),
    Goto(String),
}

#[derive(Default)]
struct ScriptedState {
    elements: Vec<ScriptedElement>,
    probes: Vec<String>,
    actions: Vec<ScriptedAction>,
    failing_gotos: u32,
    failing_captures: bool,
    html: String,
    cookies: Vec<Cookie>,
}

/// A deterministic page that never touches a network.
///
/// `wait_visible` answers immediately: a visible matching element or a
/// timeout. Navigation can be told to fail a number of times first.
#[derive(Default)]
pub struct ScriptedPage {
    state: Mutex<ScriptedState>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element.
    pub fn with_element(mut self, element: ScriptedElement) -> Self {
        self.state.get_mut().elements.push(element);
        self
    }

    /// Serve `html` from `content()`.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.state.get_mut().html = html.into();
        self
    }

    /// Fail the next `count` navigations with a timeout.
    pub fn with_failing_gotos(mut self, count: u32) -> Self {
        self.state.get_mut().failing_gotos = count;
        self
    }

    /// Make `screenshot()` and `content()` fail.
    pub fn with_failing_captures(mut self) -> Self {
        self.state.get_mut().failing_captures = true;
        self
    }

    /// Labels of every candidate probed, in order.
    pub async fn probes(&self) -> Vec<String> {
        self.state.lock().await.probes.clone()
    }

    /// Every click, fill, and navigation attempt, in order.
    pub async fn actions(&self) -> Vec<ScriptedAction> {
        self.state.lock().await.actions.clone()
    }

    /// Number of navigation attempts made so far.
    pub async fn goto_count(&self) -> usize {
        self.state
            .lock()
            .await
            .actions
            .iter()
            .filter(|a| matches!(a, ScriptedAction::Goto(_)))
            .count()
    }

    /// Show or hide an element by id.
    pub async fn set_visible(&self, id: &str, visible: bool) {
        let mut state = self.state.lock().await;
        for element in state.elements.iter_mut().filter(|e| e.id == id) {
            element.visible = visible;
        }
    }

    async fn element(&self, handle: &ElementHandle) -> Result<(), DriverError> {
        let state = self.state.lock().await;
        if state
            .elements
            .iter()
            .any(|e| e.id == handle.id() && e.visible)
        {
            Ok(())
        } else {
            Err(DriverError::Detached(handle.id().to_string()))
        }
    }
}

#[async_trait]
impl Page for ScriptedPage {
    async fn wait_visible(
        &self,
        candidate: &SelectorCandidate,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        let mut state = self.state.lock().await;
        state.probes.push(candidate.label_text());
        state
            .elements
            .iter()
            .find(|e| e.visible && e.matches(candidate))
            .map(|e| ElementHandle::new(e.id.clone()))
            .ok_or(DriverError::Timeout(timeout))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.element(element).await?;
        self.state
            .lock()
            .await
            .actions
            .push(ScriptedAction::Click(element.id().to_string()));
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.element(element).await?;
        self.state
            .lock()
            .await
            .actions
            .push(ScriptedAction::Fill(element.id().to_string(), text.to_string()));
        Ok(())
    }

    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        let mut state = self.state.lock().await;
        state.actions.push(ScriptedAction::Goto(url.to_string()));
        if state.failing_gotos > 0 {
            state.failing_gotos -= 1;
            return Err(DriverError::Timeout(timeout));
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        let state = self.state.lock().await;
        if state.failing_captures {
            return Err(DriverError::Driver("screenshot unavailable".into()));
        }
        Ok(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
    }

    async fn content(&self) -> Result<String, DriverError> {
        let state = self.state.lock().await;
        if state.failing_captures {
            return Err(DriverError::Driver("content unavailable".into()));
        }
        Ok(state.html.clone())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, DriverError> {
        Ok(self.state.lock().await.cookies.clone())
    }

    async fn set_cookies(&self, cookies: &[Cookie]) -> Result<(), DriverError> {
        let mut state = self.state.lock().await;
        for cookie in cookies {
            state.cookies.retain(|c| c.name != cookie.name);
            state.cookies.push(cookie.clone());
        }
        Ok(())
    }
}
