use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One node in a remote directory listing, as reported by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntry {
    /// Leaf name including extension, percent-decoded
    pub display_name: String,
    /// Absolute URL of the node
    pub path: String,
    pub size: i64,
    pub is_directory: bool,
    pub last_modified: Option<DateTime<Utc>>,
}

/// What a listed remote node is from the shelf's point of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum BookKind {
    Folder,
    /// Extension substring taken from the display name
    Format(String),
}

impl BookKind {
    pub const FOLDER: &'static str = "folder";

    pub fn is_folder(&self) -> bool {
        matches!(self, BookKind::Folder)
    }

    pub fn as_str(&self) -> &str {
        match self {
            BookKind::Folder => Self::FOLDER,
            BookKind::Format(ext) => ext,
        }
    }
}

impl fmt::Display for BookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<BookKind> for String {
    fn from(kind: BookKind) -> Self {
        match kind {
            BookKind::Folder => BookKind::FOLDER.to_string(),
            BookKind::Format(ext) => ext,
        }
    }
}

impl From<String> for BookKind {
    fn from(value: String) -> Self {
        if value == BookKind::FOLDER {
            BookKind::Folder
        } else {
            BookKind::Format(value)
        }
    }
}

/// Normalized view of a remote node that is relevant to the shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBook {
    pub name: String,
    pub path: String,
    pub size: i64,
    pub kind: BookKind,
    pub last_modified: Option<DateTime<Utc>>,
    /// Always false for folders
    pub is_on_local_shelf: bool,
}

impl RemoteBook {
    pub fn folder(entry: &RemoteEntry) -> Self {
        Self {
            name: entry.display_name.clone(),
            path: entry.path.clone(),
            size: entry.size,
            kind: BookKind::Folder,
            last_modified: entry.last_modified,
            is_on_local_shelf: false,
        }
    }

    pub fn book(entry: &RemoteEntry, extension: String, is_on_local_shelf: bool) -> Self {
        Self {
            name: entry.display_name.clone(),
            path: entry.path.clone(),
            size: entry.size,
            kind: BookKind::Format(extension),
            last_modified: entry.last_modified,
            is_on_local_shelf,
        }
    }

    /// Name the book is saved under locally
    pub fn filename(&self) -> &str {
        &self.name
    }
}
