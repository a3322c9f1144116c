use anyhow::{anyhow, Result};
use url::Url;

use super::config::WebDAVConfig;

/// Centralized URL and path management for WebDAV operations
///
/// Listing hrefs come back as absolute paths ("/dav/books/a.epub") while the
/// rest of the crate addresses entries by absolute URL. Everything that turns
/// one into the other goes through here so the two never get concatenated twice.
#[derive(Debug, Clone)]
pub struct WebDAVUrlManager {
    config: WebDAVConfig,
}

impl WebDAVUrlManager {
    pub fn new(config: WebDAVConfig) -> Self {
        Self { config }
    }

    /// Get the base WebDAV URL for the configured server
    /// Returns something like: "https://nas.example.com/remote.php/dav/files/username"
    pub fn base_url(&self) -> String {
        self.config.webdav_url()
    }

    /// Convert a WebDAV href (from XML response) to an absolute URL
    ///
    /// Hrefs may be absolute paths or references relative to the listed
    /// collection, so they are resolved against `collection_url`.
    ///
    /// Input:  "/remote.php/dav/files/username/books/a.epub" or "a.epub"
    /// Output: "https://nas.example.com/remote.php/dav/files/username/books/a.epub"
    pub fn href_to_url(&self, collection_url: &str, href: &str) -> Result<String> {
        if is_absolute_url(href) {
            return Ok(href.to_string());
        }

        let base = Url::parse(&format!("{}/", collection_url.trim_end_matches('/')))
            .map_err(|e| anyhow!("Invalid collection URL '{}': {}", collection_url, e))?;
        let url = base
            .join(href)
            .map_err(|e| anyhow!("Cannot resolve href '{}': {}", href, e))?;
        Ok(url.to_string())
    }

    /// Convert relative path to full URL for WebDAV requests
    ///
    /// Input:  "/books/a.epub"
    /// Output: "https://nas.example.com/remote.php/dav/files/username/books/a.epub"
    pub fn relative_path_to_url(&self, relative_path: &str) -> String {
        let base_url = self.base_url();
        let clean_path = relative_path.trim_start_matches('/');

        if clean_path.is_empty() {
            base_url
        } else {
            let normalized_base = base_url.trim_end_matches('/');
            format!("{}/{}", normalized_base, clean_path)
        }
    }

    /// Accepts either an absolute URL or a path relative to the WebDAV root
    pub fn resolve(&self, path_or_url: &str) -> String {
        if is_absolute_url(path_or_url) {
            path_or_url.to_string()
        } else {
            self.relative_path_to_url(path_or_url)
        }
    }
}

fn is_absolute_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Appends one path segment to a collection URL, percent-encoding the segment
pub fn join_segment(collection_url: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        collection_url.trim_end_matches('/'),
        urlencoding::encode(segment.trim_matches('/'))
    )
}

/// Decoded URL path without trailing slash, used to compare collection URLs
pub fn normalized_path(url_or_href: &str) -> String {
    let path = match Url::parse(url_or_href) {
        Ok(url) => url.path().to_string(),
        Err(_) => url_or_href.to_string(),
    };
    let decoded = urlencoding::decode(&path)
        .map(|p| p.into_owned())
        .unwrap_or(path);
    let trimmed = decoded.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }
}

/// True when both URLs point at the same collection, ignoring encoding and trailing slashes
pub fn same_resource(a: &str, b: &str) -> bool {
    normalized_path(a) == normalized_path(b)
}
