//! Remote bookshelf: the manager contract and its WebDAV implementation

use async_trait::async_trait;
use std::path::PathBuf;

use crate::errors::RemoteBookError;
use crate::models::{Book, RemoteBook};

pub mod classifier;
pub mod pattern;
pub mod webdav;


pub use classifier::{classify, extension_of};
pub use pattern::{BookNamePattern, DEFAULT_BOOK_FILE_PATTERN};
pub use webdav::{RemoteBookWebDav, DEFAULT_REMOTE_BOOK_FOLDER, OCTET_STREAM};

pub type RemoteBookResult<T> = Result<T, RemoteBookError>;

/// Contract the application uses to talk to a remote bookshelf, whatever the
/// storage protocol behind it.
#[async_trait]
pub trait RemoteBookManager: Send + Sync {
    /// Prepares the remote side (e.g. creates the book folder). Safe to call
    /// repeatedly; a missing credential is not an error.
    async fn init_remote_context(&self) -> RemoteBookResult<()>;

    /// Lists folders and recognized books under `path`
    async fn get_remote_book_list(&self, path: &str) -> RemoteBookResult<Vec<RemoteBook>>;

    /// Downloads a remote book to the local shelf and returns the saved file
    async fn get_remote_book(&self, remote_book: &RemoteBook) -> RemoteBookResult<PathBuf>;

    /// Uploads a local book and records the remote copy as its origin
    async fn upload(&self, book: &mut Book) -> RemoteBookResult<()>;

    /// Deletes a remote entry
    async fn delete(&self, remote_book_url: &str) -> RemoteBookResult<()>;
}
