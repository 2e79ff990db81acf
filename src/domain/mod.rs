//! Cost and usage domain, independent of the HTTP layer.

pub mod cost;
pub mod metric;
pub mod system;
