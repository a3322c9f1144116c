use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::{Body, Method, StatusCode};
use std::io;
use std::path::Path;
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, info};

use crate::models::{Credential, RemoteEntry};
use crate::webdav_xml_parser::parse_propfind_response;
use super::config::{RetryConfig, WebDAVConfig};
use super::connection::{error_status, WebDAVConnection};
use super::url_management::{same_resource, WebDAVUrlManager};

/// Byte stream of a remote file. Dropping it releases the underlying connection.
pub type BookStream = Box<dyn AsyncRead + Send + Unpin>;

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
    <D:propfind xmlns:D="DAV:">
        <D:prop>
            <D:displayname/>
            <D:getcontentlength/>
            <D:getlastmodified/>
            <D:getetag/>
            <D:resourcetype/>
        </D:prop>
    </D:propfind>"#;

/// Authenticated WebDAV operations used by remote book managers.
///
/// Every method takes the credential explicitly; implementations never look
/// credentials up on their own.
#[async_trait]
pub trait WebDavTransport: Send + Sync {
    /// Lists the direct children of a collection, excluding the collection itself
    async fn list_entries(&self, url: &str, credential: &Credential) -> Result<Vec<RemoteEntry>>;

    /// Opens a streamed read of a remote file
    async fn read_stream(&self, url: &str, credential: &Credential) -> Result<BookStream>;

    /// Uploads an in-memory body
    async fn write_bytes(&self, url: &str, data: Vec<u8>, content_type: &str, credential: &Credential) -> Result<()>;

    /// Uploads a local file, streaming it from disk
    async fn write_path(&self, url: &str, local_path: &Path, credential: &Credential) -> Result<()>;

    /// Creates a collection; succeeds when it already exists
    async fn make_directory(&self, url: &str, credential: &Credential) -> Result<()>;

    /// Deletes a file or collection
    async fn delete(&self, url: &str, credential: &Credential) -> Result<()>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpWebDavTransport {
    connection: WebDAVConnection,
    url_manager: WebDAVUrlManager,
}

impl HttpWebDavTransport {
    /// Creates a transport with the default retry policy
    pub fn new(config: WebDAVConfig) -> Result<Self> {
        Self::new_with_retry(config, RetryConfig::default())
    }

    pub fn new_with_retry(config: WebDAVConfig, retry_config: RetryConfig) -> Result<Self> {
        let url_manager = WebDAVUrlManager::new(config.clone());
        let connection = WebDAVConnection::new(config, retry_config)?;
        Ok(Self { connection, url_manager })
    }

    pub fn url_manager(&self) -> &WebDAVUrlManager {
        &self.url_manager
    }
}

#[async_trait]
impl WebDavTransport for HttpWebDavTransport {
    async fn list_entries(&self, url: &str, credential: &Credential) -> Result<Vec<RemoteEntry>> {
        debug!("📂 Listing collection: {}", url);

        let response = self.connection
            .authenticated_request(
                Method::from_bytes(b"PROPFIND")?,
                url,
                credential,
                Some(Bytes::from_static(PROPFIND_BODY.as_bytes())),
                Some(vec![
                    ("Depth", "1"),
                    ("Content-Type", "application/xml"),
                ]),
            )
            .await?;

        let body = response.text().await?;
        let parsed = parse_propfind_response(&body)
            .with_context(|| format!("Invalid PROPFIND response for {}", url))?;

        let mut entries = Vec::with_capacity(parsed.len());
        for mut entry in parsed {
            entry.path = self.url_manager.href_to_url(url, &entry.path)?;

            // Skip the collection itself
            if same_resource(&entry.path, url) {
                continue;
            }
            entries.push(entry);
        }

        debug!("Found {} entries in {}", entries.len(), url);
        Ok(entries)
    }

    async fn read_stream(&self, url: &str, credential: &Credential) -> Result<BookStream> {
        debug!("⬇️ Opening download stream: {}", url);

        let response = self.connection
            .authenticated_request(Method::GET, url, credential, None, None)
            .await?;

        let stream = Box::pin(response.bytes_stream().map_err(io::Error::other));
        Ok(Box::new(StreamReader::new(stream)))
    }

    async fn write_bytes(&self, url: &str, data: Vec<u8>, content_type: &str, credential: &Credential) -> Result<()> {
        let size = data.len();
        self.connection
            .authenticated_request(
                Method::PUT,
                url,
                credential,
                Some(Bytes::from(data)),
                Some(vec![("Content-Type", content_type)]),
            )
            .await?;

        info!("⬆️ Uploaded {} bytes to {}", size, url);
        Ok(())
    }

    async fn write_path(&self, url: &str, local_path: &Path, credential: &Credential) -> Result<()> {
        let file = tokio::fs::File::open(local_path)
            .await
            .with_context(|| format!("Failed to open {}", local_path.display()))?;
        let size = file.metadata().await?.len();
        let content_length = size.to_string();

        self.connection
            .streaming_request(
                Method::PUT,
                url,
                credential,
                Body::wrap_stream(ReaderStream::new(file)),
                vec![
                    ("Content-Type", "application/octet-stream"),
                    ("Content-Length", content_length.as_str()),
                ],
            )
            .await?;

        info!("⬆️ Uploaded {} ({} bytes) to {}", local_path.display(), size, url);
        Ok(())
    }

    async fn make_directory(&self, url: &str, credential: &Credential) -> Result<()> {
        let result = self.connection
            .authenticated_request(Method::from_bytes(b"MKCOL")?, url, credential, None, None)
            .await;

        match result {
            Ok(_) => {
                info!("📁 Created collection {}", url);
                Ok(())
            }
            // RFC 4918: MKCOL on an existing resource answers 405
            Err(e) if error_status(&e) == Some(StatusCode::METHOD_NOT_ALLOWED) => {
                debug!("Collection already exists: {}", url);
                Ok(())
            }
            Err(e) => Err(e.context(format!("Failed to create collection {}", url))),
        }
    }

    async fn delete(&self, url: &str, credential: &Credential) -> Result<()> {
        self.connection
            .authenticated_request(Method::DELETE, url, credential, None, None)
            .await?;

        info!("🗑️ Deleted {}", url);
        Ok(())
    }
}
