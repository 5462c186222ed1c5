//! Extraction result types.

use std::fmt;

use mime_guess::mime;
use url::Url;

/// Extraction strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// JSON state blob assigned to a page global.
    EmbeddedState,
    /// Absolute HTTPS links ending in a media extension.
    DirectLink,
    /// A `"videoUrl"` field anywhere in the page.
    VideoUrlField,
    /// A `"downloadUrl"` field anywhere in the page.
    DownloadUrlField,
    /// Any field whose key mentions "video" with an HTTPS value.
    VideoKeyField,
    /// The legacy resolve endpoint, used after page extraction fails.
    FallbackEndpoint,
}

impl Strategy {
    /// Strategies applied to page HTML, highest priority first.
    pub const PAGE_ORDER: [Strategy; 5] = [
        Strategy::EmbeddedState,
        Strategy::DirectLink,
        Strategy::VideoUrlField,
        Strategy::DownloadUrlField,
        Strategy::VideoKeyField,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::EmbeddedState => "embedded-state",
            Strategy::DirectLink => "direct-link",
            Strategy::VideoUrlField => "videoUrl-field",
            Strategy::DownloadUrlField => "downloadUrl-field",
            Strategy::VideoKeyField => "video-key-field",
            Strategy::FallbackEndpoint => "fallback-endpoint",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format class of a stream found in embedded state. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StreamClass {
    M3u8,
    Dash,
    Progressive,
}

/// How a resolved URL has to be downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// A playable file that can be transferred as-is.
    File,
    /// A manifest or unknown resource that needs an external tool.
    Stream,
}

/// A media URL together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub strategy: Strategy,
}

impl ResolvedUrl {
    pub fn new(url: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            url: url.into(),
            strategy,
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        media_kind(&self.url)
    }
}

/// Outcome of a single strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Found(ResolvedUrl),
    NotFound,
    /// The strategy matched something it could not parse.
    Malformed(String),
}

/// Outcome of the whole extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Found(ResolvedUrl),
    NotFound,
}

impl ExtractionResult {
    pub fn found(self) -> Option<ResolvedUrl> {
        match self {
            ExtractionResult::Found(resolved) => Some(resolved),
            ExtractionResult::NotFound => None,
        }
    }
}

/// Whether `value` is an absolute HTTP(S) URL.
pub fn is_http_url(value: &str) -> bool {
    (value.starts_with("https://") || value.starts_with("http://")) && value.len() > "https://".len()
}

/// Lowercased extension of the URL path, ignoring query and fragment.
pub fn url_extension(value: &str) -> Option<String> {
    let path = match Url::parse(value) {
        Ok(url) => url.path().to_string(),
        Err(_) => value.split(['?', '#']).next().unwrap_or("").to_string(),
    };
    let name = path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Classify a media URL by its path extension.
pub fn media_kind(value: &str) -> MediaKind {
    match url_extension(value).as_deref() {
        Some("m3u8") | Some("mpd") | None => MediaKind::Stream,
        Some(ext) => {
            let is_media = mime_guess::from_ext(ext)
                .first()
                .map(|m| m.type_() == mime::VIDEO || m.type_() == mime::AUDIO)
                .unwrap_or(false);
            if is_media {
                MediaKind::File
            } else {
                MediaKind::Stream
            }
        }
    }
}

/// Undo `/` and `\/` escaping of forward slashes.
pub fn normalize_slashes(value: &str) -> String {
    value
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("\\/", "/")
}
