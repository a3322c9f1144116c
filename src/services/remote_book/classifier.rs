use anyhow::Result;

use crate::models::{RemoteBook, RemoteEntry};
use crate::storage::LocalShelf;
use super::pattern::BookNamePattern;

/// Substring after the last `.`, or the whole name when there is none
pub fn extension_of(display_name: &str) -> &str {
    match display_name.rfind('.') {
        Some(index) => &display_name[index + 1..],
        None => display_name,
    }
}

/// Turns a raw listing into shelf entries.
///
/// Directories become folders. Files are kept only when their name matches
/// `pattern`, and only those trigger a shelf lookup. Entries are processed one
/// at a time so the output keeps the listing order.
pub async fn classify(
    entries: Vec<RemoteEntry>,
    shelf: &dyn LocalShelf,
    pattern: &BookNamePattern,
) -> Result<Vec<RemoteBook>> {
    let mut books = Vec::with_capacity(entries.len());

    for entry in &entries {
        if entry.is_directory {
            books.push(RemoteBook::folder(entry));
            continue;
        }

        if !pattern.matches(&entry.display_name) {
            continue;
        }

        let extension = extension_of(&entry.display_name).to_string();
        let on_shelf = shelf.is_on_shelf(&entry.display_name).await?;
        books.push(RemoteBook::book(entry, extension, on_shelf));
    }

    Ok(books)
}
