// ABOUTME: Tool module - the tool contract, outcome taxonomy, and envelope.
// ABOUTME: Everything a caller needs to interpret a tool call's result.

mod code;
mod registry;
mod result;
mod status;
mod traits;

pub use code::*;
pub use registry::*;
pub use result::*;
pub use status::*;
pub use traits::*;
