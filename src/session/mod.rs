// ABOUTME: Session - the one browsing context plus the state shared across calls.
// ABOUTME: SessionHandle hands the session to a single call at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::engine::best_effort;
use crate::error::SurefootError;
use crate::idempotency::IdempotencyStore;
use crate::surface::{Cookie, Page};

/// Everything a tool call may touch beyond its own input.
///
/// The page is a single logical browsing context; it must not be driven by
/// two calls at once, which is why the engine only lends a session out
/// through [`SessionHandle::acquire`].
pub struct Session {
    page: Arc<dyn Page>,
    idempotency: Arc<IdempotencyStore>,
    cookie_file: Option<PathBuf>,
}

impl Session {
    /// Create a session over `page`, using `idempotency` for create-style tools.
    pub fn new(page: Arc<dyn Page>, idempotency: IdempotencyStore) -> Self {
        Self {
            page,
            idempotency: Arc::new(idempotency),
            cookie_file: None,
        }
    }

    /// Persist and restore cookies through `path`.
    pub fn with_cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    pub fn idempotency(&self) -> &IdempotencyStore {
        &self.idempotency
    }

    pub fn cookie_file(&self) -> Option<&Path> {
        self.cookie_file.as_deref()
    }

    /// Load saved cookies into the page.
    ///
    /// Best-effort: returns the number restored, or `None` when there is no
    /// cookie file or anything goes wrong.
    pub async fn restore_cookies(&self) -> Option<usize> {
        let path = self.cookie_file.as_ref()?;
        let restored = best_effort("restore cookies", async {
            let contents = tokio::fs::read_to_string(path).await?;
            let cookies: Vec<Cookie> = serde_json::from_str(&contents)?;
            self.page.set_cookies(&cookies).await?;
            Ok::<_, SurefootError>(cookies.len())
        })
        .await;
        if let Some(count) = restored {
            info!("Restored {} cookies from {}", count, path.display());
        }
        restored
    }

    /// Write the page's current cookies to the cookie file.
    pub async fn persist_cookies(&self) -> Result<usize, SurefootError> {
        let path = self
            .cookie_file
            .as_ref()
            .ok_or_else(|| SurefootError::Config("no cookie file configured".into()))?;
        let cookies = self.page.cookies().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_vec_pretty(&cookies)?).await?;
        info!("Saved {} cookies to {}", cookies.len(), path.display());
        Ok(cookies.len())
    }
}

/// Shared, single-owner access to a [`Session`].
///
/// Holding the guard returned by `acquire` is what makes a call the sole
/// user of the page; dropping it releases the session. Not re-entrant: a
/// call that already holds the guard must not acquire again.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Wait until no other call holds the session, then take it.
    pub async fn acquire(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().await
    }

    /// Take the session only if it is free right now.
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, Session>> {
        self.inner.try_lock().ok()
    }
}
