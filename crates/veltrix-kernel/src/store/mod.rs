//! Persistent store adapter.
//!
//! The whole file tree is one JSON blob in a single key-value slot:
//!
//! - **Slot**: the durable key-value backend (`MemorySlot`, `FileSlot`)
//! - **StateStore**: loads the blob (falling back to seed data when it is
//!   missing or corrupt) and writes it through after every mutation,
//!   enforcing a size ceiling

mod file;
mod memory;
pub mod paths;

pub use file::FileSlot;
pub use memory::MemorySlot;

use std::collections::HashSet;
use std::io;
use std::sync::Arc;

use veltrix_types::{Entry, VfsState};

use crate::error::{Result, VfsError};
use crate::seed::seed_state;

/// A durable key-value slot holding text values.
///
/// Implementations use interior mutability so one slot can outlive the
/// sessions that borrow it.
pub trait Slot: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> io::Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Result of [`StateStore::load`].
#[derive(Debug)]
pub struct Loaded {
    pub state: VfsState,
    /// True if seed data replaced a missing or corrupt blob.
    pub seeded: bool,
}

/// Reads and writes the serialized [`VfsState`].
pub struct StateStore {
    slot: Arc<dyn Slot>,
    key: String,
    max_bytes: usize,
    /// Last blob successfully written or read, for rollback.
    last_persisted: Option<String>,
}

impl StateStore {
    pub fn new(slot: Arc<dyn Slot>, key: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            slot,
            key: key.into(),
            max_bytes,
            last_persisted: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted state.
    ///
    /// A missing, unparsable or shape-invalid blob is treated as absent:
    /// seed data is returned and written back. A repaired `activeId` is
    /// written back too. Only slot I/O failures are errors, so a broken
    /// disk never gets silently overwritten.
    pub fn load(&mut self) -> Result<Loaded> {
        let raw = self.slot.read(&self.key)?;

        let parsed = match raw.as_deref() {
            None => {
                tracing::info!(key = %self.key, "no persisted state, seeding");
                None
            }
            Some(raw) => match parse_state(raw) {
                Ok(parsed) => Some(parsed),
                Err(reason) => {
                    tracing::warn!(key = %self.key, %reason, "corrupt persisted state, seeding");
                    None
                }
            },
        };

        match parsed {
            Some((state, repaired)) => {
                let json = serde_json::to_string(&state)?;
                if repaired {
                    self.slot.write(&self.key, &json)?;
                }
                self.last_persisted = Some(json);
                Ok(Loaded {
                    state,
                    seeded: false,
                })
            }
            None => {
                let state = seed_state();
                self.save(&state)?;
                Ok(Loaded {
                    state,
                    seeded: true,
                })
            }
        }
    }

    /// Serialize and write through, rejecting blobs over the size ceiling.
    pub fn save(&mut self, state: &VfsState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        if json.len() > self.max_bytes {
            tracing::warn!(
                key = %self.key,
                size = json.len(),
                limit = self.max_bytes,
                "rejecting write over storage ceiling"
            );
            return Err(VfsError::QuotaExceeded {
                size: json.len(),
                limit: self.max_bytes,
            });
        }
        self.slot.write(&self.key, &json)?;
        self.last_persisted = Some(json);
        Ok(())
    }

    /// The most recently persisted state, used to roll back a mutation
    /// whose write-through failed.
    pub fn last_persisted(&self) -> Result<Option<VfsState>> {
        match &self.last_persisted {
            Some(json) => parse_state(json)
                .map(|(state, _)| Some(state))
                .map_err(|reason| io::Error::new(io::ErrorKind::InvalidData, reason).into()),
            None => Ok(None),
        }
    }

    /// Forget the persisted blob entirely.
    pub fn clear(&mut self) -> Result<()> {
        self.slot.remove(&self.key)?;
        self.last_persisted = None;
        Ok(())
    }
}

/// Parse and validate a blob, returning the state and whether it was
/// repaired. A dangling `activeId` is repaired; anything else that breaks
/// an invariant rejects the whole blob.
fn parse_state(raw: &str) -> std::result::Result<(VfsState, bool), String> {
    let mut state: VfsState = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    if let Some(bad) = state.files.iter().find(|e| !e.has_consistent_shape()) {
        return Err(format!("entry {} has an inconsistent shape", bad.id));
    }
    let mut ids = HashSet::new();
    if let Some(dup) = state.files.iter().find(|e| !ids.insert(&e.id)) {
        return Err(format!("duplicate id {}", dup.id));
    }
    if !state.names_are_unique() {
        return Err("duplicate names within a kind".to_string());
    }

    let repaired = !state.active_is_valid();
    if repaired {
        let fallback = state.first_file().map(|e: &Entry| e.id.clone());
        tracing::debug!(?fallback, "repairing dangling activeId");
        state.active_id = fallback;
    }
    Ok((state, repaired))
}
