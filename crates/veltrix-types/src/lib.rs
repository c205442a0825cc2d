//! veltrix-types: pure data types shared by the kernel and its hosts.
//!
//! - **Entry**: one file or folder of the virtual file tree
//! - **Language**: closed set of file languages, derived from extensions
//! - **VfsState**: the whole tree plus the active selection, in the exact
//!   JSON shape that is persisted

mod entry;
mod language;
mod state;

pub use entry::{Entry, EntryId, EntryKind};
pub use language::Language;
pub use state::VfsState;

/// Errors produced while interpreting raw type tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// A language tag outside the persisted vocabulary.
    #[error("unknown language tag: {0}")]
    UnknownLanguage(String),

    /// An entry kind tag outside `file` / `folder`.
    #[error("unknown entry kind: {0}")]
    UnknownKind(String),
}
