use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::AuthorizationProvider;
use crate::connectivity::Connectivity;
use crate::errors::RemoteBookError;
use crate::models::{Book, BookSource, Credential, RemoteBook};
use crate::services::webdav::{join_segment, WebDavTransport};
use crate::storage::{BookStorage, LocalShelf};
use super::classifier::classify;
use super::pattern::BookNamePattern;
use super::{RemoteBookManager, RemoteBookResult};

/// Folder under the WebDAV root that holds the remote shelf
pub const DEFAULT_REMOTE_BOOK_FOLDER: &str = "books";

/// Content type used for in-memory uploads regardless of book format
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Remote bookshelf backed by a WebDAV server
pub struct RemoteBookWebDav {
    root_book_url: String,
    transport: Arc<dyn WebDavTransport>,
    authorization: Arc<dyn AuthorizationProvider>,
    shelf: Arc<dyn LocalShelf>,
    storage: Arc<dyn BookStorage>,
    connectivity: Arc<dyn Connectivity>,
    pattern: BookNamePattern,
}

impl RemoteBookWebDav {
    /// Builds the manager. No I/O happens here; call `init_remote_context`
    /// during startup to prepare the remote folder.
    pub fn new(
        webdav_root: &str,
        remote_book_folder: &str,
        transport: Arc<dyn WebDavTransport>,
        authorization: Arc<dyn AuthorizationProvider>,
        shelf: Arc<dyn LocalShelf>,
        storage: Arc<dyn BookStorage>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let root_book_url = format!(
            "{}/{}",
            webdav_root.trim_end_matches('/'),
            remote_book_folder.trim_matches('/')
        );

        Self {
            root_book_url,
            transport,
            authorization,
            shelf,
            storage,
            connectivity,
            pattern: BookNamePattern::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: BookNamePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn root_book_url(&self) -> &str {
        &self.root_book_url
    }

    /// Destination URL for a book uploaded under `origin_name`
    pub fn upload_url(&self, origin_name: &str) -> String {
        join_segment(&self.root_book_url, origin_name)
    }

    fn require_authorization(&self) -> RemoteBookResult<Credential> {
        self.authorization
            .current_credential()
            .ok_or(RemoteBookError::NotConfigured)
    }
}

#[async_trait]
impl RemoteBookManager for RemoteBookWebDav {
    async fn init_remote_context(&self) -> RemoteBookResult<()> {
        let Some(credential) = self.authorization.current_credential() else {
            debug!("WebDAV not configured, skipping remote book folder setup");
            return Ok(());
        };

        self.transport
            .make_directory(&self.root_book_url, &credential)
            .await
            .map_err(|e| RemoteBookError::transport("create folder", e))?;

        info!("📚 Remote book folder ready: {}", self.root_book_url);
        Ok(())
    }

    async fn get_remote_book_list(&self, path: &str) -> RemoteBookResult<Vec<RemoteBook>> {
        let credential = self.require_authorization()?;

        let entries = self.transport
            .list_entries(path, &credential)
            .await
            .map_err(|e| RemoteBookError::transport("list", e))?;
        let entry_count = entries.len();

        let books = classify(entries, self.shelf.as_ref(), &self.pattern)
            .await
            .map_err(|e| RemoteBookError::local_storage("check", e))?;

        debug!("Listed {}: {} entries, {} shown", path, entry_count, books.len());
        Ok(books)
    }

    async fn get_remote_book(&self, remote_book: &RemoteBook) -> RemoteBookResult<PathBuf> {
        let credential = self.require_authorization()?;

        let stream = self.transport
            .read_stream(&remote_book.path, &credential)
            .await
            .map_err(|e| RemoteBookError::transport("download", e))?;

        // The stream moves into the save call and is dropped there on every path
        let saved = self.storage
            .save_stream(stream, remote_book.filename())
            .await
            .map_err(|e| RemoteBookError::local_storage("save", e))?;

        info!("📥 Downloaded {} to {:?}", remote_book.name, saved);
        Ok(saved)
    }

    async fn upload(&self, book: &mut Book) -> RemoteBookResult<()> {
        if !self.connectivity.is_network_available().await {
            warn!("Network unavailable, cannot upload '{}'", book.name);
            return Err(RemoteBookError::NetworkUnavailable);
        }

        let put_url = self.upload_url(&book.origin_name);
        let credential = self.require_authorization()?;
        let source = book.source().ok_or_else(|| RemoteBookError::InvalidBookSource {
            book_url: book.book_url.clone(),
        })?;

        match source {
            BookSource::ContentUri(uri) => {
                let data = self.storage
                    .read_content(&uri)
                    .await
                    .map_err(|e| RemoteBookError::local_storage("read", e))?;
                self.transport
                    .write_bytes(&put_url, data, OCTET_STREAM, &credential)
                    .await
                    .map_err(|e| RemoteBookError::transport("upload", e))?;
            }
            BookSource::Path(path) => {
                self.transport
                    .write_path(&put_url, &path, &credential)
                    .await
                    .map_err(|e| RemoteBookError::transport("upload", e))?;
            }
        }

        book.set_webdav_origin(&put_url);
        self.storage
            .persist(book)
            .await
            .map_err(|e| RemoteBookError::local_storage("save record", e))?;

        info!("📤 Uploaded '{}' to {}", book.name, put_url);
        Ok(())
    }

    async fn delete(&self, remote_book_url: &str) -> RemoteBookResult<()> {
        let credential = self.require_authorization()?;

        self.transport
            .delete(remote_book_url, &credential)
            .await
            .map_err(|e| RemoteBookError::transport("delete", e))?;

        info!("🗑️ Deleted remote entry {}", remote_book_url);
        Ok(())
    }
}
