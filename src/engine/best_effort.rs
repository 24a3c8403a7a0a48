// ABOUTME: Runs a sub-operation whose failure must never reach the caller.
// ABOUTME: Errors and panics are logged and turned into None.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::warn;

/// Await `fut`, returning its value or `None` if it failed or panicked.
pub async fn best_effort<T, E, F>(label: &str, fut: F) -> Option<T>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!("{} failed (ignored): {}", label, e);
            None
        }
        Err(panic) => {
            warn!("{} panicked (ignored): {}", label, panic_message(&*panic));
            None
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
