//! Media URL extraction from share pages.
//!
//! Strategies are tried in a fixed priority order and the first hit wins:
//! - Embedded state blob (M3U8 preferred over DASH)
//! - Longest direct HTTPS media link
//! - `"videoUrl"`, then `"downloadUrl"`, then any `"...video..."` field
//!
//! Extraction is a pure function of the page text. A strategy that cannot
//! parse what it matched reports [`StrategyOutcome::Malformed`] and the next
//! strategy runs.

pub mod direct;
pub mod embedded;
pub mod inline;
pub mod strategy;

pub use strategy::{
    media_kind, ExtractionResult, MediaKind, ResolvedUrl, Strategy, StrategyOutcome, StreamClass,
};

/// Run one page strategy.
pub fn run_strategy(strategy: Strategy, html: &str) -> StrategyOutcome {
    match strategy {
        Strategy::EmbeddedState => embedded::extract(html),
        Strategy::DirectLink => direct::extract(html),
        Strategy::VideoUrlField => inline::video_url_field(html),
        Strategy::DownloadUrlField => inline::download_url_field(html),
        Strategy::VideoKeyField => inline::video_key_field(html),
        Strategy::FallbackEndpoint => StrategyOutcome::NotFound,
    }
}

/// Find the media URL in a share page.
pub fn extract(html: &str) -> ExtractionResult {
    for strategy in Strategy::PAGE_ORDER {
        match run_strategy(strategy, html) {
            StrategyOutcome::Found(resolved) => {
                tracing::debug!("Media URL found by {}: {}", strategy, resolved.url);
                return ExtractionResult::Found(resolved);
            }
            StrategyOutcome::Malformed(reason) => {
                tracing::debug!("Strategy {} skipped: {}", strategy, reason);
            }
            StrategyOutcome::NotFound => {
                tracing::trace!("Strategy {} found nothing", strategy);
            }
        }
    }

    ExtractionResult::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_state_beats_direct_links() {
        let html = r#"
            <script>window.__INITIAL_STATE__ = {"video":{"streams":[
                {"format":"DASH","url":"https://cdn.example.com/abc/manifest.mpd"},
                {"format":"M3U8","url":"https://cdn.example.com/abc/index.m3u8"}
            ]}};</script>
            <a href="https://cdn.example.com/some/much/longer/path/to/a/progressive/file.mp4">x</a>
        "#;
        let resolved = extract(html).found().unwrap();
        assert_eq!(resolved.url, "https://cdn.example.com/abc/index.m3u8");
        assert_eq!(resolved.strategy, Strategy::EmbeddedState);
    }

    #[test]
    fn test_direct_links_without_state() {
        let html = r#"
            <video src="https://cdn.example.com/v/low.mp4"></video>
            <video src="https://cdn.example.com/v/abc123/high/original.mp4"></video>
        "#;
        let resolved = extract(html).found().unwrap();
        assert_eq!(resolved.url, "https://cdn.example.com/v/abc123/high/original.mp4");
        assert_eq!(resolved.strategy, Strategy::DirectLink);
    }

    #[test]
    fn test_malformed_state_falls_through() {
        let html = r#"
            <script>window.__INITIAL_STATE__ = {video: broken};</script>
            <script>var data = {"videoUrl":"https:\/\/cdn.example.com\/play\/abc"};</script>
        "#;
        let resolved = extract(html).found().unwrap();
        assert_eq!(resolved.url, "https://cdn.example.com/play/abc");
        assert_eq!(resolved.strategy, Strategy::VideoUrlField);
    }

    #[test]
    fn test_video_url_beats_download_url() {
        let html = r#"{"downloadUrl":"https://dl.example.com/a","videoUrl":"https://cdn.example.com/b"}"#;
        let resolved = extract(html).found().unwrap();
        assert_eq!(resolved.url, "https://cdn.example.com/b");
    }

    #[test]
    fn test_video_key_is_last_resort() {
        let html = r#"{"previewVideo":"https://cdn.example.com/prev"}"#;
        let resolved = extract(html).found().unwrap();
        assert_eq!(resolved.url, "https://cdn.example.com/prev");
        assert_eq!(resolved.strategy, Strategy::VideoKeyField);
    }

    #[test]
    fn test_nothing_found() {
        let html = "<html><body><p>This video is private.</p></body></html>";
        assert_eq!(extract(html), ExtractionResult::NotFound);
        assert_eq!(extract(""), ExtractionResult::NotFound);
    }
}
