// ABOUTME: Idempotency module - fingerprints and the durable result index.
// ABOUTME: Makes create-style operations safe to repeat.

mod fingerprint;
mod store;

pub use fingerprint::*;
pub use store::*;
