//! Errors returned by kernel operations.
//!
//! Every error leaves the file tree in the state it had before the call.

use std::io;

use veltrix_types::{EntryId, EntryKind};

pub type Result<T, E = VfsError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    /// The name was empty after trimming.
    #[error("name must not be empty")]
    EmptyName,

    /// Another entry of the same kind already uses the name.
    #[error("a {kind} named '{name}' already exists")]
    NameExists { name: String, kind: EntryKind },

    #[error("no entry with id {0}")]
    NotFound(EntryId),

    /// The operation needs a file but the id names a folder.
    #[error("entry {0} is not a file")]
    NotAFile(EntryId),

    /// A rename would move a file between image and text payloads.
    #[error("cannot rename to '{name}': image and text files are not interchangeable")]
    PayloadMismatch { name: String },

    /// Import bytes could not be decoded for the suggested name.
    #[error("cannot import '{name}': {reason}")]
    Decode { name: String, reason: String },

    /// Persisting the mutation would exceed the configured ceiling.
    #[error("storage quota exceeded: {size} bytes > {limit} bytes")]
    QuotaExceeded { size: usize, limit: usize },

    #[error("storage error: {0}")]
    Storage(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The session was opened outside a tokio runtime.
    #[error("no async runtime available for preview scheduling")]
    NoRuntime,

    /// The playground is gated off.
    #[error("not authenticated")]
    Unauthenticated,
}

impl VfsError {
    /// Validation rejections are reported to the user as a notice; the rest
    /// are environmental failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            VfsError::EmptyName
                | VfsError::NameExists { .. }
                | VfsError::PayloadMismatch { .. }
                | VfsError::QuotaExceeded { .. }
        )
    }
}
