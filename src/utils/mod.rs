//! Small cross-cutting utility modules.

pub mod cancel;
pub mod schema;
pub mod streaming;
