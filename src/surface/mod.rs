// ABOUTME: Surface module - the driver seam and fault-tolerant UI primitives.
// ABOUTME: Candidates, fallback resolution, click/fill, and retried navigation.

mod candidate;
mod navigate;
mod page;
mod resolver;
mod scripted;

pub use candidate::*;
pub use navigate::*;
pub use page::*;
pub use resolver::*;
pub use scripted::*;
