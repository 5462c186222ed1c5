//! Share URL handling.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// Identifier of one shared video: the last path segment of its share URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShareReference(String);

impl ShareReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the share reference from a share URL.
///
/// `https://example.com/share/abc123?t=5` yields `abc123`. Query strings,
/// fragments and trailing slashes are ignored.
pub fn extract_id(share_url: &str) -> Result<ShareReference> {
    let input = share_url.trim();

    let id = match Url::parse(input) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(_) => {
            // Bare path or id without a scheme
            let path = input.split(['?', '#']).next().unwrap_or("");
            path.split('/')
                .filter(|s| !s.is_empty())
                .last()
                .map(str::to_string)
        }
    };

    match id {
        Some(id) if !id.trim().is_empty() => Ok(ShareReference(id)),
        _ => Err(Error::InvalidShareUrl(format!(
            "no share id in '{}'",
            share_url
        ))),
    }
}

/// Scheme and host of a share URL, e.g. `https://example.com`.
pub fn origin(share_url: &str) -> Result<String> {
    let url = Url::parse(share_url.trim())?;
    match url.origin() {
        origin @ url::Origin::Tuple(..) => Ok(origin.ascii_serialization()),
        url::Origin::Opaque(_) => Err(Error::InvalidShareUrl(share_url.to_string())),
    }
}
