//! Configuration module for share-dl.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Run mode selection (single item or list)
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{BatchConfig, Config, HttpConfig, OptionsConfig, RetryConfig, ToolsConfig};
pub use modes::{RunMode, ToolKind};
pub use validation::validate_config;
