//! Utility modules shared across pipeline stages.

pub mod mime;
pub mod path;
