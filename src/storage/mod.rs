//! Local book storage abstraction
//!
//! Remote book managers only see these traits; `LocalBookStore` is the
//! filesystem implementation used by the binary and integration tests.

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

use crate::models::Book;
use crate::services::webdav::BookStream;

pub mod local;

pub use local::LocalBookStore;

/// Answers whether a book is already on the local shelf
#[async_trait]
pub trait LocalShelf: Send + Sync {
    async fn is_on_shelf(&self, display_name: &str) -> Result<bool>;
}

/// Local persistence used when moving books between the shelf and the remote
#[async_trait]
pub trait BookStorage: Send + Sync {
    /// Drains `stream` into a shelf file named `filename` and returns its path.
    /// The stream is consumed and dropped whether or not the save succeeds.
    async fn save_stream(&self, stream: BookStream, filename: &str) -> Result<PathBuf>;

    /// Stores the book record
    async fn persist(&self, book: &Book) -> Result<()>;

    /// Reads the full content behind an indirect content reference
    async fn read_content(&self, uri: &str) -> Result<Vec<u8>>;
}
