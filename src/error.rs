//! Error types for the share-dl application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Input errors
    #[error("Invalid share URL: {0}")]
    InvalidShareUrl(String),

    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // Page errors
    #[error("Failed to fetch page: {0}")]
    Fetch(String),

    #[error("No media URL found for {0}")]
    ExtractionFailed(String),

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    // External tool errors
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("No media tool found. Please install yt-dlp or ffmpeg and ensure it's in your PATH.")]
    ToolUnavailable,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error came from validating user input or configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_)
        )
    }

    /// Suggestions shown to the user when a single download ends in this error.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            Error::Fetch(_) => &[
                "Check your network connection and that the share page opens in a browser.",
                "The site may be rate limiting you; wait a few minutes and try again.",
            ],
            Error::ExtractionFailed(_) => &[
                "Make sure the video is public and the share link is complete.",
                "The page layout may have changed; try again with --debug for details.",
            ],
            Error::Download(_) | Error::Tool { .. } => &[
                "Update yt-dlp and ffmpeg to their latest versions.",
                "Retry later; the media server may be temporarily unavailable.",
            ],
            Error::ToolUnavailable => &[
                "Install yt-dlp (https://github.com/yt-dlp/yt-dlp) or ffmpeg.",
                "Make sure the binary directory is listed in PATH.",
            ],
            Error::InvalidShareUrl(_) => &["Pass the full share URL, e.g. https://host/share/abc123."],
            _ => &[],
        }
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const FETCH_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const TOOL_UNAVAILABLE: i32 = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        assert!(Error::MissingConfig("url".into()).is_config());
        assert!(Error::ConfigValidation {
            field: "timeout".into(),
            message: "negative".into()
        }
        .is_config());
        assert!(!Error::ToolUnavailable.is_config());
    }

    #[test]
    fn test_remediation_hints() {
        assert!(!Error::ToolUnavailable.remediation().is_empty());
        assert!(!Error::ExtractionFailed("abc".into()).remediation().is_empty());
        assert!(Error::Config("x".into()).remediation().is_empty());
    }
}
