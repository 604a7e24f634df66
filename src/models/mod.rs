//! Data models for the gallery backend.
//!
//! Photo resources serialize snake_case to match the wire format the front
//! end already consumes; request bodies are camelCase as the browser sends them.

mod photo;

pub use photo::*;
