//! Direct media link strategy.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::strategy::{ResolvedUrl, Strategy, StrategyOutcome};

static MEDIA_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https://[^\s"'<>\\&]+\.(?:m3u8|mp4|m4v|webm|mov|mpd)\b"#).unwrap()
});

/// Pick the longest absolute HTTPS media link in the raw page text.
///
/// Longer links tend to carry the full path and signature of the best rendition.
/// Ties go to the link that appears first.
///
/// A link ends at its media extension, so any query string is dropped.
/// Signed CDN links lose their token here.
pub fn extract(html: &str) -> StrategyOutcome {
    let mut best: Option<&str> = None;

    for link in MEDIA_LINK.find_iter(html).map(|m| m.as_str()) {
        if best.map_or(true, |b| link.len() > b.len()) {
            best = Some(link);
        }
    }

    match best {
        Some(url) => StrategyOutcome::Found(ResolvedUrl::new(url, Strategy::DirectLink)),
        None => StrategyOutcome::NotFound,
    }
}
