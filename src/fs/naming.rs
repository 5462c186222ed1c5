//! Output filename generation.

use crate::error::{Error, Result};
use crate::page::ShareReference;

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name.chars().map(replace_reserved).collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Make a user supplied prefix safe to prepend to a filename.
///
/// Separators are replaced rather than rejected.
pub fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c => replace_reserved(c),
        })
        .collect::<String>()
        .replace("..", "_")
}

/// Build `<prefix><id>.<container>` for a share.
pub fn output_file_name(
    prefix: Option<&str>,
    id: &ShareReference,
    container: &str,
) -> Result<String> {
    let prefix = prefix.map(sanitize_prefix).unwrap_or_default();
    let container = container.trim_start_matches('.');
    sanitize_filename(&format!("{}{}.{}", prefix, id, container))
}

fn replace_reserved(c: char) -> char {
    match c {
        ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
        c if c.is_control() => '_',
        c => c,
    }
}
