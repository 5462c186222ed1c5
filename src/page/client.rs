//! HTTP client for share pages and media transfers.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::{header, redirect, Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::output::create_download_bar;
use crate::page::share::{origin, ShareReference};
use crate::page::types::FallbackResponse;

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Fetches share pages and performs direct media transfers.
///
/// Built once per run from [`HttpConfig`] and shared by every task.
pub struct PageFetcher {
    client: Client,
    transfer_client: Client,
    user_agent: String,
    fallback_endpoint: Option<String>,
}

impl PageFetcher {
    /// Create a new fetcher with the configured headers and timeout.
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header_value("accept", &http.accept)?);
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header_value("accept_language", &http.accept_language)?,
        );

        let timeout = std::time::Duration::from_secs(http.timeout_secs);

        let client = Client::builder()
            .user_agent(&http.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        // Media transfers treat any redirect as a failed attempt
        let transfer_client = Client::builder()
            .user_agent(&http.user_agent)
            .redirect(redirect::Policy::none())
            .connect_timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            transfer_client,
            user_agent: http.user_agent.clone(),
            fallback_endpoint: http.fallback_endpoint.clone(),
        })
    }

    /// User agent sent with every request; forwarded to external tools.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Whether a legacy resolve endpoint is configured.
    pub fn has_fallback(&self) -> bool {
        self.fallback_endpoint.is_some()
    }

    /// Make a GET request, failing on transport errors and non-2xx statuses.
    async fn get(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(Error::Fetch(format!("{}: HTTP {}", url, status)));
        }

        Ok(response)
    }

    /// Fetch the HTML of a share page.
    pub async fn fetch_page(&self, share_url: &str) -> Result<String> {
        let response = self.get(share_url).await?;
        let html = response
            .text()
            .await
            .map_err(|e| fetch_error(share_url, e))?;
        tracing::debug!("Share page length: {} bytes", html.len());
        Ok(html)
    }

    /// Resolve a media URL through the legacy endpoint.
    pub async fn fetch_fallback(&self, share_url: &str, id: &ShareReference) -> Result<String> {
        let template = self
            .fallback_endpoint
            .as_deref()
            .ok_or_else(|| Error::MissingConfig("http.fallback_endpoint".to_string()))?;
        let endpoint = fallback_url(template, share_url, id)?;

        let response = self.get(&endpoint).await?;
        let text = response
            .text()
            .await
            .map_err(|e| fetch_error(&endpoint, e))?;
        tracing::debug!("Fallback response: {}", text);

        let body: FallbackResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Fetch(format!(
                "Failed to parse fallback response: {} - Response: {}",
                e,
                excerpt(&text, 200)
            ))
        })?;

        body.media_url()
            .map(str::to_string)
            .ok_or_else(|| Error::ExtractionFailed(format!("{} (fallback endpoint)", id)))
    }

    /// Stream a media file to `output_path`, replacing any previous content.
    pub async fn transfer(
        &self,
        url: &str,
        output_path: &Path,
        show_progress: bool,
    ) -> Result<PathBuf> {
        let response = self
            .transfer_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Download(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(format!(
                "Failed to download file: HTTP {}",
                status
            )));
        }

        let content_length = response.content_length();
        let progress = if show_progress && content_length.is_some_and(|l| l > PROGRESS_THRESHOLD)
        {
            Some(create_download_bar(content_length.unwrap_or(0)))
        } else {
            None
        };

        let mut file = File::create(output_path).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(downloaded);
            }
        }

        file.flush().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if downloaded == 0 {
            return Err(Error::Download(format!("Empty response body from {}", url)));
        }

        Ok(output_path.to_path_buf())
    }
}

/// First `max_chars` characters of a response body, for error messages.
fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Expand the legacy endpoint template for one share.
pub fn fallback_url(template: &str, share_url: &str, id: &ShareReference) -> Result<String> {
    let mut url = template.replace("{id}", id.as_str());
    if url.contains("{origin}") {
        url = url.replace("{origin}", &origin(share_url)?);
    }
    Ok(url)
}

fn header_value(field: &str, value: &str) -> Result<header::HeaderValue> {
    value.parse().map_err(|_| Error::ConfigValidation {
        field: format!("http.{}", field),
        message: format!("Invalid header value: '{}'", value),
    })
}

fn fetch_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Fetch(format!("{}: request timed out", url))
    } else {
        Error::Fetch(format!("{}: {}", url, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::share::extract_id;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer) -> PageFetcher {
        let http = HttpConfig {
            fallback_endpoint: Some(format!("{}/legacy/{{id}}", server.uri())),
            ..HttpConfig::default()
        };
        PageFetcher::new(&http).unwrap()
    }

    #[test]
    fn test_fallback_url_template() {
        let id = extract_id("https://example.com/share/abc123?t=5").unwrap();
        let url = fallback_url(
            "{origin}/api/share/info/{id}",
            "https://example.com/share/abc123?t=5",
            &id,
        )
        .unwrap();
        assert_eq!(url, "https://example.com/api/share/info/abc123");
    }

    #[tokio::test]
    async fn test_fetch_page_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/share/abc123"))
            .and(header_exists("user-agent"))
            .and(header_exists("accept-language"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let html = fetcher
            .fetch_page(&format!("{}/share/abc123", server.uri()))
            .await
            .unwrap();
        assert_eq!(html, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let err = fetcher
            .fetch_page(&format!("{}/share/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_fetch_error() {
        let server = MockServer::start().await;
        let share_url = format!("{}/share/abc123", server.uri());
        let fetcher = fetcher_for(&server);
        drop(server);

        let err = fetcher.fetch_page(&share_url).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert_eq!(err.remediation().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/legacy/abc123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"url":"https://cdn.example.com/abc123.mp4"}"#),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let share_url = format!("{}/share/abc123", server.uri());
        let id = extract_id(&share_url).unwrap();
        let url = fetcher.fetch_fallback(&share_url, &id).await.unwrap();
        assert_eq!(url, "https://cdn.example.com/abc123.mp4");
    }

    #[tokio::test]
    async fn test_fetch_fallback_without_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/legacy/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"url":null}"#))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let share_url = format!("{}/share/abc123", server.uri());
        let id = extract_id(&share_url).unwrap();
        let err = fetcher.fetch_fallback(&share_url, &id).await.unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_fetch_fallback_non_json_with_multibyte_text() {
        let server = MockServer::start().await;
        let body = format!("{}é and more", "x".repeat(199));
        Mock::given(method("GET"))
            .and(path("/legacy/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let share_url = format!("{}/share/abc123", server.uri());
        let id = extract_id(&share_url).unwrap();
        let err = fetcher.fetch_fallback(&share_url, &id).await.unwrap_err();

        match err {
            Error::Fetch(message) => {
                assert!(message.contains(&format!("{}é", "x".repeat(199))));
                assert!(!message.contains("and more"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("abc", 200), "abc");
        assert_eq!(excerpt("héllo", 2), "hé");
        assert_eq!(excerpt("", 5), "");
    }

    #[tokio::test]
    async fn test_transfer_overwrites_previous_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/v.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("v.mp4");
        std::fs::write(&output, b"stale partial content from an earlier attempt").unwrap();

        let fetcher = fetcher_for(&server);
        fetcher
            .transfer(&format!("{}/media/v.mp4", server.uri()), &output, false)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_transfer_redirect_is_download_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "https://elsewhere/v.mp4"),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_for(&server);
        let err = fetcher
            .transfer(
                &format!("{}/media/v.mp4", server.uri()),
                &dir.path().join("v.mp4"),
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Download(_)));
    }
}
