//! Embedded state blob strategy.
//!
//! Share pages serialize their application state into a script, e.g.
//! `window.__INITIAL_STATE__ = {...};`. The object literal is cut out,
//! parsed as JSON, and searched for video records.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::extract::strategy::{
    is_http_url, media_kind, normalize_slashes, url_extension, MediaKind, ResolvedUrl, Strategy,
    StrategyOutcome, StreamClass,
};

static STATE_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:window\.)?(?:__INITIAL_STATE__|__PRELOADED_STATE__|__INITIAL_DATA__)\s*=\s*\{")
        .unwrap()
});

static UNDEFINED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([:\[,]\s*)undefined\b").unwrap());

/// Keys holding the URL of a stream record.
const URL_KEYS: &[&str] = &["url", "src", "playUrl", "play_url", "mainUrl", "main_url"];

/// Keys describing the format of a stream record.
const FORMAT_KEYS: &[&str] = &[
    "format",
    "formatType",
    "format_type",
    "type",
    "protocol",
    "mimeType",
    "mime_type",
];

#[derive(Debug)]
struct StreamCandidate {
    class: StreamClass,
    url: String,
}

/// Run the embedded state strategy against page HTML.
pub fn extract(html: &str) -> StrategyOutcome {
    let Some(found) = STATE_ASSIGNMENT.find(html) else {
        return StrategyOutcome::NotFound;
    };

    // The match ends just after the opening brace
    let start = found.end() - 1;
    let Some(literal) = object_literal(&html[start..]) else {
        return StrategyOutcome::Malformed("unterminated state object".to_string());
    };

    let json = UNDEFINED_VALUE.replace_all(literal, "${1}null");
    let state: Value = match serde_json::from_str(&json) {
        Ok(state) => state,
        Err(e) => return StrategyOutcome::Malformed(format!("state is not valid JSON: {}", e)),
    };

    let mut candidates = Vec::new();
    collect_streams(&state, false, &mut candidates);
    tracing::debug!("Embedded state holds {} stream candidates", candidates.len());

    // First candidate of the best class in document order wins
    match candidates.into_iter().min_by_key(|c| c.class) {
        Some(best) => StrategyOutcome::Found(ResolvedUrl::new(best.url, Strategy::EmbeddedState)),
        None => StrategyOutcome::NotFound,
    }
}

/// Slice the balanced `{...}` at the start of `text`, honouring string literals.
fn object_literal(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }

        match b {
            b'"' | b'\'' => quote = Some(b),
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

fn collect_streams(value: &Value, in_video: bool, out: &mut Vec<StreamCandidate>) {
    match value {
        Value::Object(map) => {
            if in_video {
                if let Some(candidate) = stream_record(map) {
                    out.push(candidate);
                }
            }

            for (key, child) in map {
                let key_lower = key.to_ascii_lowercase();
                let child_in_video = in_video || key_lower.contains("video");

                if child_in_video {
                    if let (Value::String(url), Some(class)) = (child, class_from_key(&key_lower)) {
                        let url = normalize_slashes(url);
                        if is_http_url(&url) {
                            out.push(StreamCandidate { class, url });
                        }
                    }
                }

                collect_streams(child, child_in_video, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_streams(item, in_video, out);
            }
        }
        _ => {}
    }
}

/// Interpret an object as a stream record: a URL plus an optional format.
fn stream_record(map: &Map<String, Value>) -> Option<StreamCandidate> {
    let url = URL_KEYS
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .map(normalize_slashes)
        .find(|url| is_http_url(url))?;

    let declared = FORMAT_KEYS
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find_map(class_from_format);

    let class = declared.or_else(|| class_from_url(&url))?;
    Some(StreamCandidate { class, url })
}

fn class_from_format(format: &str) -> Option<StreamClass> {
    let upper = format.to_ascii_uppercase();
    if upper.contains("M3U8") || upper.contains("HLS") || upper.contains("MPEGURL") {
        Some(StreamClass::M3u8)
    } else if upper.contains("DASH") || upper.contains("MPD") {
        Some(StreamClass::Dash)
    } else {
        None
    }
}

fn class_from_key(key_lower: &str) -> Option<StreamClass> {
    if key_lower.contains("m3u8") || key_lower.contains("hls") {
        Some(StreamClass::M3u8)
    } else if key_lower.contains("dash") || key_lower.contains("mpd") {
        Some(StreamClass::Dash)
    } else {
        None
    }
}

fn class_from_url(url: &str) -> Option<StreamClass> {
    match url_extension(url).as_deref() {
        Some("m3u8") => Some(StreamClass::M3u8),
        Some("mpd") => Some(StreamClass::Dash),
        _ if media_kind(url) == MediaKind::File => Some(StreamClass::Progressive),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(state: &str) -> String {
        format!(
            "<html><head><script>window.__INITIAL_STATE__ = {};</script></head><body></body></html>",
            state
        )
    }

    fn found_url(outcome: StrategyOutcome) -> String {
        match outcome {
            StrategyOutcome::Found(resolved) => resolved.url,
            other => panic!("expected a URL, got {:?}", other),
        }
    }

    #[test]
    fn test_prefers_m3u8_over_dash() {
        let html = page(
            r#"{"video":{"id":"abc","streams":[
                {"format":"DASH","url":"https://cdn.example.com/abc/manifest.mpd"},
                {"format":"M3U8","url":"https://cdn.example.com/abc/index.m3u8"}
            ]}}"#,
        );
        assert_eq!(
            found_url(extract(&html)),
            "https://cdn.example.com/abc/index.m3u8"
        );
    }

    #[test]
    fn test_prefers_m3u8_key_over_dash_key() {
        let html = page(
            r#"{"videoDetail":{"dashUrl":"https://cdn.example.com/a.mpd","hlsUrl":"https://cdn.example.com/a.m3u8"}}"#,
        );
        assert_eq!(found_url(extract(&html)), "https://cdn.example.com/a.m3u8");
    }

    #[test]
    fn test_same_class_keeps_document_order() {
        let html = page(
            r#"{"video":{"hd":{"url":"https://cdn.example.com/hd.m3u8"},"auto":{"url":"https://cdn.example.com/auto.m3u8"}}}"#,
        );
        assert_eq!(found_url(extract(&html)), "https://cdn.example.com/hd.m3u8");
    }

    #[test]
    fn test_falls_back_to_dash() {
        let html = page(
            r#"{"videoInfo":{"playList":[{"type":"dash","playUrl":"https://cdn.example.com/a.mpd"}]}}"#,
        );
        assert_eq!(found_url(extract(&html)), "https://cdn.example.com/a.mpd");
    }

    #[test]
    fn test_progressive_file_in_video_record() {
        let html = page(
            r#"{"video":{"cover":{"url":"https://cdn.example.com/a.jpg"},"src":"https://cdn.example.com/a.mp4"}}"#,
        );
        assert_eq!(found_url(extract(&html)), "https://cdn.example.com/a.mp4");
    }

    #[test]
    fn test_ignores_urls_outside_video_records() {
        let html = page(r#"{"user":{"avatar":{"url":"https://cdn.example.com/u.mp4"}}}"#);
        assert_eq!(extract(&html), StrategyOutcome::NotFound);
    }

    #[test]
    fn test_braces_inside_strings() {
        let html = page(
            r#"{"title":"a } tricky { title","video":{"format":"M3U8","url":"https://cdn.example.com/x.m3u8"}}"#,
        );
        assert_eq!(found_url(extract(&html)), "https://cdn.example.com/x.m3u8");
    }

    #[test]
    fn test_undefined_values_are_tolerated() {
        let html = page(
            r#"{"ad":undefined,"video":{"format":"M3U8","url":"https://cdn.example.com/x.m3u8","poster":undefined}}"#,
        );
        assert_eq!(found_url(extract(&html)), "https://cdn.example.com/x.m3u8");
    }

    #[test]
    fn test_malformed_json() {
        let html = page(r#"{"video": {format: M3U8}}"#);
        assert!(matches!(extract(&html), StrategyOutcome::Malformed(_)));
    }

    #[test]
    fn test_unterminated_object() {
        let html = "<script>window.__INITIAL_STATE__ = {\"video\": {</script>";
        assert!(matches!(extract(html), StrategyOutcome::Malformed(_)));
    }

    #[test]
    fn test_no_state() {
        assert_eq!(extract("<html></html>"), StrategyOutcome::NotFound);
    }
}
