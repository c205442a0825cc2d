//! veltrix-kernel (核): the core of the veltrix playground.
//!
//! This crate provides:
//!
//! - **Vfs**: the flat virtual file tree with per-kind name uniqueness and
//!   an always-valid active selection
//! - **StateStore**: write-through persistence of the whole tree to a
//!   key-value [`Slot`](store::Slot), falling back to seed data on corruption
//! - **Compositor**: merges markup, style and script files into one
//!   previewable document
//! - **Debouncer**: trailing-edge recompute of the preview after edits
//! - **Session**: the context object a host owns; every operation goes
//!   through it and emits change notifications for the presenters
//! - **Playground**: gates the session on an external "authenticated" signal
//!
//! # Data flow
//!
//! ```text
//! host action ──▶ Session ──▶ Vfs (validate + mutate)
//!                    │
//!                    ├──▶ StateStore (write-through, rollback on failure)
//!                    ├──▶ VfsEvent broadcast (tree view, tab strip)
//!                    └──▶ Debouncer ──(quiet interval)──▶ compose ──▶ Preview
//! ```

pub mod compose;
pub mod config;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod events;
pub mod gate;
pub mod ids;
pub mod import;
pub mod language;
pub mod presenter;
pub mod preview;
pub mod seed;
pub mod session;
pub mod store;
pub mod vfs;

pub use compose::{compose, ComposeInput, PLACEHOLDER_DOCUMENT};
pub use config::PlaygroundConfig;
pub use editor::{EditorMode, EditorSurface};
pub use error::{Result, VfsError};
pub use events::{Change, VfsEvent};
pub use gate::Playground;
pub use import::{decode_import, DecodedImport};
pub use presenter::{TabRow, TabStrip, TreeRow};
pub use preview::{Preview, PreviewDocument};
pub use session::{Confirm, Session};
pub use store::{FileSlot, MemorySlot, Slot, StateStore};
pub use vfs::Vfs;

pub use veltrix_types::{Entry, EntryId, EntryKind, Language, VfsState};
