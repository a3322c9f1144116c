//! Local filesystem storage backend implementation

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::{BookStorage, LocalShelf};
use crate::models::Book;
use crate::services::webdav::BookStream;

const RECORDS_DIR: &str = ".records";

/// Filesystem-backed shelf: book files live directly in `book_dir`, records
/// as JSON under `book_dir/.records`, and `content://authority/path`
/// references resolve below `content_root`.
#[derive(Debug, Clone)]
pub struct LocalBookStore {
    book_dir: PathBuf,
    content_root: PathBuf,
}

impl LocalBookStore {
    pub fn new(book_dir: impl Into<PathBuf>, content_root: impl Into<PathBuf>) -> Self {
        Self {
            book_dir: book_dir.into(),
            content_root: content_root.into(),
        }
    }

    pub fn book_dir(&self) -> &Path {
        &self.book_dir
    }

    pub fn records_dir(&self) -> PathBuf {
        self.book_dir.join(RECORDS_DIR)
    }

    /// Ensure the shelf directories exist
    pub async fn initialize(&self) -> Result<()> {
        for dir in [self.book_dir.clone(), self.records_dir()] {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create directory {:?}", dir))?;
            debug!("Ensured directory exists: {:?}", dir);
        }
        Ok(())
    }

    /// Path a book with this display name occupies on the shelf
    pub fn book_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.book_dir.join(safe_file_name(filename)?))
    }

    /// Loads a previously persisted record
    pub async fn load_record(&self, origin_name: &str) -> Result<Option<Book>> {
        let path = self.record_path(origin_name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn record_path(&self, origin_name: &str) -> Result<PathBuf> {
        let name = safe_file_name(origin_name)?;
        Ok(self.records_dir().join(format!("{}.json", name)))
    }

    fn content_path(&self, uri: &str) -> Result<PathBuf> {
        let url = Url::parse(uri).map_err(|e| anyhow!("Invalid content reference '{}': {}", uri, e))?;
        if url.scheme() != "content" {
            return Err(anyhow!("Unsupported content reference scheme '{}'", url.scheme()));
        }

        let mut path = self.content_root.clone();
        if let Some(authority) = url.host_str() {
            path.push(safe_file_name(authority)?);
        }

        for segment in url.path_segments().into_iter().flatten() {
            if segment.is_empty() {
                continue;
            }
            let decoded = urlencoding::decode(segment)?;
            path.push(safe_file_name(&decoded)?);
        }

        Ok(path)
    }
}

/// Rejects names that would escape the directory they are joined onto
fn safe_file_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(anyhow!("Invalid file name '{}'", name)),
    }
}

async fn write_atomically(target: &Path, data: &[u8]) -> Result<()> {
    let dir = target.parent().ok_or_else(|| anyhow!("No parent directory for {:?}", target))?;
    let temp = dir.join(format!(".{}.part", Uuid::new_v4()));
    fs::write(&temp, data).await?;
    if let Err(e) = fs::rename(&temp, target).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl LocalShelf for LocalBookStore {
    async fn is_on_shelf(&self, display_name: &str) -> Result<bool> {
        let (Ok(path), Ok(record)) = (self.book_path(display_name), self.record_path(display_name)) else {
            // Names that cannot live on the shelf are never on it
            return Ok(false);
        };
        // Uploaded books may live outside book_dir but always leave a record
        Ok(fs::try_exists(&path).await? || fs::try_exists(&record).await?)
    }
}

#[async_trait]
impl BookStorage for LocalBookStore {
    async fn save_stream(&self, mut stream: BookStream, filename: &str) -> Result<PathBuf> {
        let target = self.book_path(filename)?;
        fs::create_dir_all(&self.book_dir).await?;

        let temp = self.book_dir.join(format!(".{}.part", Uuid::new_v4()));
        let copied = async {
            let mut file = fs::File::create(&temp).await?;
            let bytes = tokio::io::copy(&mut stream, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<u64, std::io::Error>(bytes)
        }
        .await;

        match copied {
            Ok(bytes) => {
                fs::rename(&temp, &target).await?;
                info!("💾 Saved {} ({} bytes) to {:?}", filename, bytes, target);
                Ok(target)
            }
            Err(e) => {
                warn!("Failed to save {}: {}", filename, e);
                if let Err(cleanup) = fs::remove_file(&temp).await {
                    debug!("Could not remove partial file {:?}: {}", temp, cleanup);
                }
                Err(anyhow!("Failed to save {}: {}", filename, e))
            }
        }
    }

    async fn persist(&self, book: &Book) -> Result<()> {
        fs::create_dir_all(self.records_dir()).await?;
        let path = self.record_path(&book.origin_name)?;
        let data = serde_json::to_vec_pretty(book)?;
        write_atomically(&path, &data).await?;
        debug!("Persisted record for '{}' at {:?}", book.name, path);
        Ok(())
    }

    async fn read_content(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.content_path(uri)?;
        fs::read(&path)
            .await
            .with_context(|| format!("Failed to read content reference {}", uri))
    }
}
