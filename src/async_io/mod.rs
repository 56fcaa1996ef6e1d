//! Background directory queries.
//!
//! Listing a directory is the only operation that can stall the UI, so it runs
//! on a worker thread. Requests carry a generation number; the explorer drops
//! responses older than the latest request it issued.

pub mod manager;

pub use manager::QueryManager;

use crate::fs::DirectorySnapshot;
use crate::query::{DirectoryRequest, QueryResult};

/// A directory query tagged with the generation it was issued under
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub generation: u64,
    pub request: DirectoryRequest,
}

/// Completion of a `QueryRequest`
#[derive(Debug)]
pub struct QueryResponse {
    pub generation: u64,
    pub request: DirectoryRequest,
    pub result: QueryResult<DirectorySnapshot>,
}
