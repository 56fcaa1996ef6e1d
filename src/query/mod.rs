//! Directory query clients
//!
//! A query client turns `(location, path, limit)` into a complete directory
//! snapshot. The explorer never lists directories itself; it only consumes
//! snapshots. Clients may be backed by:
//! - The local filesystem (shipped with the binary)
//! - A remote indexing service (implemented by the host)

mod local;

pub use local::LocalQueryClient;

use std::path::PathBuf;

use thiserror::Error;

use crate::fs::DirectorySnapshot;

/// Error type for query operations
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Outside of location root: {0}")]
    OutsideRoot(String),
    #[error("{0}")]
    Other(String),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Parameters of a directory listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRequest {
    /// Location (indexed root) the path belongs to
    pub location_id: i64,
    /// Path relative to the location root ("/" is the root itself)
    pub path: String,
    /// Maximum number of entries to return
    pub limit: usize,
}

impl DirectoryRequest {
    /// Build a request. The limit is never zero: listings are always bounded
    /// and always able to return something.
    pub fn new(location_id: i64, path: impl Into<String>, limit: usize) -> Self {
        Self {
            location_id,
            path: path.into(),
            limit: limit.max(1),
        }
    }
}

/// Runtime state of the client, queried once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    /// Client data directory holding generated thumbnails
    pub data_path: Option<PathBuf>,
}

/// Trait for directory query backends
///
/// Queries must be side-effect free: issuing the same request twice yields
/// equivalent snapshots.
pub trait DirectoryQueryClient: Send {
    /// Display name for the status line
    fn name(&self) -> &str;

    /// List one directory, returning at most `request.limit` entries
    fn query_directory(&mut self, request: &DirectoryRequest) -> QueryResult<DirectorySnapshot>;

    /// Client runtime state (data directory)
    fn client_state(&self) -> ClientState;
}

/// Parent of a location-relative path, `None` at the root
pub fn parent_path(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) | None => Some("/".to_string()),
        Some(pos) => Some(trimmed[..pos].to_string()),
    }
}

/// Join a location-relative directory path and a child name
pub fn join_path(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    format!("{}/{}", base, name)
}
