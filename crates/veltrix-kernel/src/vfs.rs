//! The virtual file tree.
//!
//! A flat collection of entries plus the active-selection pointer. All
//! operations validate before they mutate, so a rejected call leaves the
//! tree exactly as it was. Two invariants hold after every call:
//!
//! - no two entries of the same kind share a name
//! - `active_id` is `None` or names a live file

use veltrix_types::{Entry, EntryId, EntryKind, Language, VfsState};

use crate::error::{Result, VfsError};
use crate::ids::{new_id, now_millis};
use crate::import::{DecodedImport, ImportPayload};
use crate::language::{classify, split_name};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vfs {
    state: VfsState,
}

impl Vfs {
    /// Wrap a loaded state. The caller guarantees it satisfies the invariants
    /// (the store validates blobs before handing them out).
    pub fn from_state(state: VfsState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &VfsState {
        &self.state
    }

    /// All entries in storage order.
    pub fn entries(&self) -> &[Entry] {
        &self.state.files
    }

    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.state.files.iter().filter(|e| e.is_file())
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.state.get(id)
    }

    pub fn find_by_name(&self, name: &str, kind: EntryKind) -> Option<&Entry> {
        self.state.find_by_name(name, kind)
    }

    pub fn active_id(&self) -> Option<&EntryId> {
        self.state.active_id.as_ref()
    }

    pub fn active(&self) -> Option<&Entry> {
        self.state.active()
    }

    /// Create a file or folder. New files become active; folders leave the
    /// selection alone.
    pub fn create(&mut self, name: &str, kind: EntryKind) -> Result<Entry> {
        let name = self.check_new_name(name, kind, None)?;
        let now = now_millis();
        let entry = match kind {
            EntryKind::Folder => Entry::folder(new_id(), name, now),
            EntryKind::File => blank_file(name, now),
        };
        if entry.is_file() {
            self.state.active_id = Some(entry.id.clone());
        }
        self.state.files.push(entry.clone());
        Ok(entry)
    }

    /// Remove an entry. Removing the active file selects the first remaining
    /// file, or nothing.
    pub fn delete(&mut self, id: &EntryId) -> Result<Entry> {
        let idx = self
            .state
            .files
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| VfsError::NotFound(id.clone()))?;
        let removed = self.state.files.remove(idx);
        if self.state.active_id.as_ref() == Some(id) {
            self.state.active_id = self.state.first_file().map(|e| e.id.clone());
        }
        Ok(removed)
    }

    /// Clone a file under `{base}-copy{ext}`, `{base}-copy1{ext}`, … and make
    /// the clone active. Folders cannot be duplicated (`Ok(None)`).
    pub fn duplicate(&mut self, id: &EntryId) -> Result<Option<Entry>> {
        let source = self.get(id).ok_or_else(|| VfsError::NotFound(id.clone()))?;
        if source.is_folder() {
            return Ok(None);
        }

        let (base, ext) = split_name(&source.name);
        let name = self.free_name(EntryKind::File, format!("{base}-copy{ext}"), |n| {
            format!("{base}-copy{n}{ext}")
        });

        let copy = Entry {
            id: new_id(),
            name,
            created_at: now_millis(),
            ..source.clone()
        };
        self.state.active_id = Some(copy.id.clone());
        self.state.files.push(copy.clone());
        Ok(Some(copy))
    }

    /// Rename an entry. Returns `false` when the trimmed name is unchanged.
    ///
    /// File languages are re-derived from the new name; a rename that would
    /// turn a text file into an image (or back) is rejected.
    pub fn rename(&mut self, id: &EntryId, new_name: &str) -> Result<bool> {
        let entry = self.get(id).ok_or_else(|| VfsError::NotFound(id.clone()))?;
        let trimmed = new_name.trim();
        if trimmed == entry.name {
            return Ok(false);
        }
        let kind = entry.kind;
        let old_language = entry.language;
        let name = self.check_new_name(trimmed, kind, Some(id))?;

        let language = match kind {
            EntryKind::Folder => None,
            EntryKind::File => {
                let language = classify(&name);
                let was_image = old_language.is_some_and(Language::is_image);
                if language.is_image() != was_image {
                    return Err(VfsError::PayloadMismatch { name });
                }
                Some(language)
            }
        };

        if let Some(entry) = self.state.get_mut(id) {
            entry.name = name;
            entry.language = language;
        }
        Ok(true)
    }

    /// Insert a decoded import, trying `{base}-1{ext}`, `{base}-2{ext}`, …
    /// against the entries present now. Never rejects; the result is active.
    pub fn insert_import(&mut self, decoded: DecodedImport) -> Entry {
        let (base, ext) = split_name(&decoded.name);
        let name = self.free_name(EntryKind::File, decoded.name.clone(), |n| {
            format!("{base}-{n}{ext}")
        });

        let now = now_millis();
        let entry = match decoded.payload {
            ImportPayload::DataUrl(url) => Entry::image_file(new_id(), name, Some(url), now),
            ImportPayload::Text(text) => Entry::text_file(new_id(), name, decoded.language, text, now),
        };
        self.state.active_id = Some(entry.id.clone());
        self.state.files.push(entry.clone());
        entry
    }

    /// Point the selection at a file.
    pub fn set_active(&mut self, id: &EntryId) -> Result<()> {
        let entry = self.get(id).ok_or_else(|| VfsError::NotFound(id.clone()))?;
        if !entry.is_file() {
            return Err(VfsError::NotAFile(id.clone()));
        }
        self.state.active_id = Some(id.clone());
        Ok(())
    }

    pub fn clear_active(&mut self) {
        self.state.active_id = None;
    }

    /// Replace a text file's content. Returns `false` if nothing changed or
    /// the file is an image.
    pub fn set_content(&mut self, id: &EntryId, text: &str) -> Result<bool> {
        let entry = self
            .state
            .get_mut(id)
            .ok_or_else(|| VfsError::NotFound(id.clone()))?;
        if entry.is_folder() {
            return Err(VfsError::NotAFile(id.clone()));
        }
        if entry.is_image() || entry.content.as_deref() == Some(text) {
            return Ok(false);
        }
        entry.content = Some(text.to_string());
        Ok(true)
    }

    /// Trim and check a prospective name against entries of `kind`,
    /// ignoring `except` (the entry being renamed).
    fn check_new_name(&self, name: &str, kind: EntryKind, except: Option<&EntryId>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VfsError::EmptyName);
        }
        let taken = self
            .state
            .files
            .iter()
            .any(|e| e.kind == kind && e.name == name && Some(&e.id) != except);
        if taken {
            return Err(VfsError::NameExists {
                name: name.to_string(),
                kind,
            });
        }
        Ok(name.to_string())
    }

    /// First free name among `first`, `nth(1)`, `nth(2)`, …
    fn free_name(&self, kind: EntryKind, first: String, nth: impl Fn(u64) -> String) -> String {
        let free = |candidate: &str| self.find_by_name(candidate, kind).is_none();
        if free(&first) {
            return first;
        }
        let mut n = 1;
        loop {
            let candidate = nth(n);
            if free(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// An empty file of the language its name implies.
fn blank_file(name: String, now: i64) -> Entry {
    match classify(&name) {
        Language::Image => Entry::image_file(new_id(), name, None, now),
        language => Entry::text_file(new_id(), name, language, "", now),
    }
}
