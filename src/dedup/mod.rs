//! Deduplication module.
//!
//! Provides the persistent log that makes list downloads resumable.

pub mod log;

pub use log::DedupLog;
