//! Filesystem module.
//!
//! Provides:
//! - Output path resolution for single and list downloads
//! - Filename generation and sanitizing
//! - URL list reading

pub mod naming;
pub mod paths;

pub use naming::{output_file_name, sanitize_filename, sanitize_prefix};
pub use paths::{
    batch_output_path, ensure_parent_dir, read_url_list, single_output_path, working_dir,
};
