//! Response types for the legacy resolve endpoint.

use serde::Deserialize;

/// Body returned by the legacy resolve endpoint: `{"url": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackResponse {
    #[serde(default)]
    pub url: Option<String>,
}

impl FallbackResponse {
    /// The media URL, if present and absolute HTTP(S).
    pub fn media_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| u.starts_with("https://") || u.starts_with("http://"))
    }
}
