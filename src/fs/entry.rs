//! Directory listing records as delivered by a query client

use serde::{Deserialize, Serialize};

/// Identifies the directory a snapshot was taken of
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryDescriptor {
    pub id: i64,
    pub name: String,
}

/// One child of a listed directory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryEntry {
    /// Identity of the entry within its snapshot
    pub id: i64,
    /// Display name (not full path)
    pub name: String,
    /// Extension without the leading dot, empty if none
    pub extension: String,
    /// Size in bytes; `None` when the backend did not report one
    pub size_in_bytes: Option<u64>,
    pub is_dir: bool,
    /// Path relative to the location root, used for navigation
    pub materialized_path: String,
    /// Whether a generated thumbnail exists in the client data directory
    pub has_local_thumbnail: bool,
    /// Partial content checksum naming the thumbnail file
    pub temp_checksum: Option<String>,
}

impl DirectoryEntry {
    /// Directory entry with the given id, name and path
    pub fn directory(id: i64, name: impl Into<String>, materialized_path: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_dir: true,
            materialized_path: materialized_path.into(),
            ..Self::default()
        }
    }

    /// Regular file entry; the extension is taken from the name
    pub fn file(id: i64, name: impl Into<String>, materialized_path: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let extension = extension_of(&name).to_string();
        Self {
            id,
            name,
            extension,
            size_in_bytes: Some(size),
            materialized_path: materialized_path.into(),
            ..Self::default()
        }
    }
}

/// One complete, immutable listing result
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySnapshot {
    pub directory: DirectoryDescriptor,
    pub contents: Vec<DirectoryEntry>,
}

impl DirectorySnapshot {
    pub fn new(directory: DirectoryDescriptor, contents: Vec<DirectoryEntry>) -> Self {
        Self { directory, contents }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Entry at a display index, if present
    pub fn entry_at(&self, index: usize) -> Option<&DirectoryEntry> {
        self.contents.get(index)
    }

    /// Count of directories
    pub fn dir_count(&self) -> usize {
        self.contents.iter().filter(|e| e.is_dir).count()
    }

    /// Count of files
    pub fn file_count(&self) -> usize {
        self.contents.iter().filter(|e| !e.is_dir).count()
    }
}

/// Extension of a file name, without the dot. Dotfiles have none.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => "",
        Some(pos) => &name[pos + 1..],
    }
}
