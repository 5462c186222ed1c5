//! Share page access.
//!
//! This module provides:
//! - Share reference extraction from share URLs
//! - HTTP client for share pages, the legacy resolve endpoint and direct transfers
//! - Response types for the legacy endpoint

pub mod client;
pub mod share;
pub mod types;

pub use client::PageFetcher;
pub use share::{extract_id, origin, ShareReference};
pub use types::FallbackResponse;
