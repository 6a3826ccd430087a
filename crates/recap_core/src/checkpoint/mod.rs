//! Durable checkpoint state for resumable jobs.
//!
//! This module provides:
//! - Stable job identity derivation from the input locator
//! - A per-job state directory holding artifact files and completion markers
//! - Atomic artifact writes ordered before marker creation
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use recap_core::checkpoint::{job_identity, CheckpointStore};
//!
//! let key = job_identity("https://example.com/watch?v=abc");
//! let store = CheckpointStore::open(Path::new("/tmp/recap"), &key).unwrap();
//!
//! if !store.is_complete("Identify") {
//!     store.save_text("info.json", "{}").unwrap();
//!     store.mark_complete("Identify").unwrap();
//! }
//! ```

mod identity;
mod store;

pub use identity::job_identity;
pub use store::{CheckpointError, CheckpointResult, CheckpointStore};
