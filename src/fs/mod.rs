//! Directory listing data model

pub mod entry;

pub use entry::{DirectoryDescriptor, DirectoryEntry, DirectorySnapshot};
