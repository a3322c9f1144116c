use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Origin tags stored in `Book::origin`
pub mod book_origin {
    /// Book imported from local storage
    pub const LOCAL_TAG: &str = "loc_book";
    /// Prefix for books whose authoritative copy lives on WebDAV
    pub const WEBDAV_TAG: &str = "webDav::";
}

/// Local shelf record for a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    #[serde(default)]
    pub author: String,
    /// Where the book content lives locally: a path, a `file://` URL or a content reference
    pub book_url: String,
    pub origin: String,
    /// File name used for the remote copy
    pub origin_name: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Creates a record for a book imported from local storage
    pub fn local(name: impl Into<String>, book_url: impl Into<String>, origin_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: String::new(),
            book_url: book_url.into(),
            origin: book_origin::LOCAL_TAG.to_string(),
            origin_name: origin_name.into(),
            updated_at: None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.origin == book_origin::LOCAL_TAG
    }

    /// Remote URL when the origin points at WebDAV
    pub fn webdav_url(&self) -> Option<&str> {
        self.origin.strip_prefix(book_origin::WEBDAV_TAG)
    }

    pub fn set_webdav_origin(&mut self, remote_url: &str) {
        self.origin = format!("{}{}", book_origin::WEBDAV_TAG, remote_url);
        self.updated_at = Some(Utc::now());
    }

    /// Resolves `book_url` into something the uploader can read
    pub fn source(&self) -> Option<BookSource> {
        BookSource::resolve(&self.book_url)
    }
}

/// Resolved local content source of a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookSource {
    /// Plain filesystem path
    Path(PathBuf),
    /// Indirect reference that must be read through storage (e.g. `content://`)
    ContentUri(String),
}

impl BookSource {
    pub fn resolve(book_url: &str) -> Option<Self> {
        let trimmed = book_url.trim();
        if trimmed.is_empty() {
            return None;
        }

        match Url::parse(trimmed) {
            Ok(url) if url.scheme() == "file" => url.to_file_path().ok().map(BookSource::Path),
            // Single-letter schemes are Windows drive letters, not URLs
            Ok(url) if url.scheme().len() == 1 => Some(BookSource::Path(PathBuf::from(trimmed))),
            Ok(_) => Some(BookSource::ContentUri(trimmed.to_string())),
            Err(url::ParseError::RelativeUrlWithoutBase) => Some(BookSource::Path(PathBuf::from(trimmed))),
            Err(_) => None,
        }
    }

    pub fn is_content_uri(&self) -> bool {
        matches!(self, BookSource::ContentUri(_))
    }
}

/// Credentials presented to the WebDAV server
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
