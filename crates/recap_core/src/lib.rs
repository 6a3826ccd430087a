//! Recap Core - Backend logic for the Recap pipeline
//!
//! This crate contains all business logic with zero CLI dependencies.
//! It turns a remote media URL into a delivered summary through five
//! checkpointed steps (Identify, Acquire, Transcribe, Summarize, Deliver)
//! and can resume an interrupted run without repeating completed work.

pub mod checkpoint;
pub mod config;
pub mod logging;
pub mod media;
pub mod notify;
pub mod orchestrator;
pub mod render;
pub mod summarize;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
