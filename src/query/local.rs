//! Local filesystem query client

use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::fs::entry::extension_of;
use crate::fs::{DirectoryDescriptor, DirectoryEntry, DirectorySnapshot};
use super::{join_path, ClientState, DirectoryQueryClient, DirectoryRequest, QueryError, QueryResult};

/// Bytes hashed from the start of a file for its partial checksum
const CHECKSUM_SAMPLE: u64 = 8 * 1024;

/// Serves listings of a local directory tree rooted at `root`
#[derive(Debug)]
pub struct LocalQueryClient {
    name: String,
    root: PathBuf,
    data_path: Option<PathBuf>,
    hashed_files: usize,
}

impl LocalQueryClient {
    /// Create a client for the given location root
    pub fn new(root: PathBuf, data_path: Option<PathBuf>) -> Self {
        Self {
            name: format!("Local {}", root.display()),
            root,
            data_path,
            hashed_files: 0,
        }
    }

    /// Map a location-relative path onto the filesystem, rejecting `..`
    fn resolve(&self, path: &str) -> QueryResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(QueryError::OutsideRoot(path.to_string())),
            }
        }
        Ok(resolved)
    }

    fn thumbnail_exists(&self, location_id: i64, checksum: &str) -> bool {
        self.data_path.as_ref().is_some_and(|data| {
            data.join("thumbnails")
                .join(location_id.to_string())
                .join(format!("{}.webp", checksum))
                .is_file()
        })
    }

    /// Build the entry for a scanned child. Only regular files are opened
    /// for a checksum: opening a FIFO blocks until a writer appears.
    fn finish_entry(&mut self, location_id: i64, dir_path: &str, scanned: ScannedEntry) -> DirectoryEntry {
        let ScannedEntry { name, full_path, metadata } = scanned;
        let materialized_path = join_path(dir_path, &name);
        let id = path_id(&full_path);

        if metadata.is_dir() {
            return DirectoryEntry::directory(id, name, materialized_path);
        }

        let size = metadata.len();
        let temp_checksum = if metadata.is_file() {
            self.hashed_files += 1;
            match partial_checksum(&full_path, size) {
                Ok(checksum) => Some(checksum),
                Err(e) => {
                    debug!(error = %e, path = %full_path.display(), "no checksum");
                    None
                }
            }
        } else {
            None
        };
        let has_local_thumbnail = temp_checksum
            .as_deref()
            .is_some_and(|c| self.thumbnail_exists(location_id, c));

        DirectoryEntry {
            id,
            extension: extension_of(&name).to_string(),
            name,
            size_in_bytes: Some(size),
            is_dir: false,
            materialized_path,
            has_local_thumbnail,
            temp_checksum,
        }
    }

    /// Number of files opened for a checksum since the client was created
    pub fn hashed_files(&self) -> usize {
        self.hashed_files
    }
}

/// A directory child before any content is read
struct ScannedEntry {
    name: String,
    full_path: PathBuf,
    metadata: fs::Metadata,
}

impl ScannedEntry {
    fn read(entry: fs::DirEntry) -> std::io::Result<Self> {
        Ok(Self {
            metadata: entry.metadata()?,
            name: entry.file_name().to_string_lossy().into_owned(),
            full_path: entry.path(),
        })
    }
}

impl DirectoryQueryClient for LocalQueryClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_directory(&mut self, request: &DirectoryRequest) -> QueryResult<DirectorySnapshot> {
        let dir = self.resolve(&request.path)?;
        let metadata = fs::metadata(&dir).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => QueryError::NotFound(request.path.clone()),
            _ => QueryError::Io(e),
        })?;
        if !metadata.is_dir() {
            return Err(QueryError::NotADirectory(request.path.clone()));
        }

        let mut scanned = Vec::new();
        for entry in fs::read_dir(&dir)? {
            match entry.and_then(ScannedEntry::read) {
                Ok(e) => scanned.push(e),
                Err(e) => debug!(error = %e, dir = %dir.display(), "skipping unreadable entry"),
            }
        }

        // Directories first, then case-insensitive name order
        scanned.sort_by_cached_key(|e| (!e.metadata.is_dir(), e.name.to_lowercase()));
        scanned.truncate(request.limit);

        let contents: Vec<DirectoryEntry> = scanned
            .into_iter()
            .map(|e| self.finish_entry(request.location_id, &request.path, e))
            .collect();

        let name = dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.to_string_lossy().into_owned());

        Ok(DirectorySnapshot::new(
            DirectoryDescriptor { id: path_id(&dir), name },
            contents,
        ))
    }

    fn client_state(&self) -> ClientState {
        ClientState { data_path: self.data_path.clone() }
    }
}

/// Stable non-negative id derived from a path
fn path_id(path: &Path) -> i64 {
    let hash = blake3::hash(path.to_string_lossy().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    i64::from_le_bytes(bytes) & i64::MAX
}

/// Hash of the file size and its first bytes, hex encoded
fn partial_checksum(path: &Path, size: u64) -> std::io::Result<String> {
    let mut sample = Vec::with_capacity(CHECKSUM_SAMPLE as usize);
    fs::File::open(path)?
        .take(CHECKSUM_SAMPLE)
        .read_to_end(&mut sample)?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(&size.to_le_bytes());
    hasher.update(&sample);
    Ok(hasher.finalize().to_hex()[..16].to_string())
}
