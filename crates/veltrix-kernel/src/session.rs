//! The session: the one context object a host owns.
//!
//! Everything that would otherwise be ambient state (the tree, the editor
//! buffer, the open tabs, the debounce timer, the context-menu target)
//! lives here. Every mutating operation follows the same steps:
//!
//! 1. validate (rejections change nothing and emit nothing)
//! 2. mutate the in-memory tree
//! 3. write the whole tree through to the slot, rolling back on failure
//! 4. broadcast `Changed`, then `RecomputeScheduled`, and re-arm the debouncer
//!
//! Operations that move the selection away from the file being edited
//! flush the editor buffer into the tree first. That flush is folded into
//! the operation's own notification; it is announced as `ContentEdited`
//! only when the operation itself commits nothing.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use veltrix_types::{Entry, EntryId, EntryKind, VfsState};

use crate::compose::ComposeInput;
use crate::config::PlaygroundConfig;
use crate::debounce::Debouncer;
use crate::editor::EditorSurface;
use crate::error::{Result, VfsError};
use crate::events::{Change, EventBus, VfsEvent};
use crate::import::{decode_import, DecodedImport};
use crate::presenter::{tree_rows, TabRow, TabStrip, TreeRow};
use crate::preview::{Preview, PreviewDocument};
use crate::store::{Slot, StateStore};
use crate::vfs::Vfs;

/// Yes/no confirmation for destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct Session {
    config: PlaygroundConfig,
    vfs: Vfs,
    store: StateStore,
    editor: EditorSurface,
    tabs: TabStrip,
    preview: Preview,
    debouncer: Debouncer,
    events: EventBus,
    context_menu: Option<EntryId>,
    /// Committed mutations so far.
    commits: u64,
}

impl Session {
    /// Load (or seed) the tree from `slot` and arm the initial compose.
    ///
    /// Must be called inside a tokio runtime; the debouncer spawns its
    /// timers there.
    pub fn open(config: PlaygroundConfig, slot: Arc<dyn Slot>) -> Result<Self> {
        let preview = Preview::new();
        let debouncer = Debouncer::on_current_runtime(config.debounce, preview.clone())?;
        let mut store = StateStore::new(slot, config.storage_key.clone(), config.max_state_bytes);
        let loaded = store.load()?;

        let mut session = Self {
            vfs: Vfs::from_state(loaded.state),
            store,
            editor: EditorSurface::new(),
            tabs: TabStrip::new(),
            preview,
            debouncer,
            events: EventBus::new(config.event_capacity),
            context_menu: None,
            commits: 0,
            config,
        };
        session.rebind_editor();

        tracing::info!(
            key = %session.store.key(),
            entries = session.vfs.entries().len(),
            seeded = loaded.seeded,
            "session opened"
        );
        session.events.changed(Change::Loaded {
            seeded: loaded.seeded,
        });
        let input = session.compose_input();
        session
            .debouncer
            .schedule_after(session.config.initial_compose_delay, input);
        Ok(session)
    }

    // ================================================================
    // Accessors
    // ================================================================

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    pub fn state(&self) -> &VfsState {
        self.vfs.state()
    }

    pub fn editor(&self) -> &EditorSurface {
        &self.editor
    }

    /// Mutable editor access for hosts that buffer keystrokes without
    /// writing them through (see [`Session::flush_editor_to_state`]).
    pub fn editor_mut(&mut self) -> &mut EditorSurface {
        &mut self.editor
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    pub fn tab_rows(&self) -> Vec<TabRow> {
        self.tabs.rows(&self.vfs)
    }

    pub fn tree_rows(&self) -> Vec<TreeRow> {
        tree_rows(&self.vfs)
    }

    pub fn preview(&self) -> PreviewDocument {
        self.preview.current()
    }

    pub fn subscribe_preview(&self) -> watch::Receiver<PreviewDocument> {
        self.preview.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<VfsEvent> {
        self.events.subscribe()
    }

    pub fn is_recompute_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    // ================================================================
    // File tree operations
    // ================================================================

    /// Create a file or folder. A new file becomes active and opens in a tab.
    pub fn create(&mut self, name: &str, kind: EntryKind) -> Result<Entry> {
        let create = |s: &mut Self| -> Result<Entry> {
            let entry = s.vfs.create(name, kind)?;
            s.persist()?;
            if entry.is_file() {
                s.rebind_editor();
            }
            tracing::debug!(id = %entry.id, name = %entry.name, %kind, "created");
            s.committed(Change::Created(entry.id.clone()));
            Ok(entry)
        };
        match kind {
            EntryKind::File => self.after_flush(create),
            EntryKind::Folder => create(self),
        }
    }

    /// Delete an entry after confirmation. Returns `Ok(None)` if declined.
    pub fn delete(&mut self, id: &EntryId, confirm: &mut impl Confirm) -> Result<Option<Entry>> {
        let entry = self.vfs.get(id).ok_or_else(|| VfsError::NotFound(id.clone()))?;
        let prompt = format!("Delete {} '{}'?", entry.kind, entry.name);
        if !confirm.confirm(&prompt) {
            tracing::debug!(%id, "delete declined");
            return Ok(None);
        }

        let was_active = self.vfs.active_id() == Some(id);
        let removed = self.vfs.delete(id)?;
        self.persist()?;
        self.tabs.close(id);
        if self.context_menu.as_ref() == Some(id) {
            self.context_menu = None;
        }
        if was_active {
            self.rebind_editor();
        }
        tracing::debug!(%id, name = %removed.name, "deleted");
        self.committed(Change::Deleted(id.clone()));
        Ok(Some(removed))
    }

    /// Duplicate a file; the copy becomes active. Folders are a no-op.
    pub fn duplicate(&mut self, id: &EntryId) -> Result<Option<Entry>> {
        self.after_flush(|s| {
            let Some(copy) = s.vfs.duplicate(id)? else {
                return Ok(None);
            };
            s.persist()?;
            s.rebind_editor();
            tracing::debug!(source = %id, copy = %copy.id, name = %copy.name, "duplicated");
            s.committed(Change::Duplicated {
                source: id.clone(),
                copy: copy.id.clone(),
            });
            Ok(Some(copy))
        })
    }

    /// Rename an entry. Returns `false` if the name did not change.
    pub fn rename(&mut self, id: &EntryId, new_name: &str) -> Result<bool> {
        self.after_flush(|s| {
            if !s.vfs.rename(id, new_name)? {
                return Ok(false);
            }
            s.persist()?;
            tracing::debug!(%id, name = %new_name.trim(), "renamed");
            s.committed(Change::Renamed(id.clone()));
            Ok(true)
        })
    }

    /// Decode and insert an upload. Collisions are resolved, never rejected.
    pub async fn import(&mut self, bytes: Vec<u8>, suggested_name: &str) -> Result<Entry> {
        let decoded = decode_import(bytes, suggested_name).await?;
        self.commit_import(decoded)
    }

    /// Insert an already decoded upload, resolving names against the tree as
    /// it is now. Lets hosts decode several uploads concurrently.
    pub fn commit_import(&mut self, decoded: DecodedImport) -> Result<Entry> {
        self.after_flush(|s| {
            let entry = s.vfs.insert_import(decoded);
            s.persist()?;
            s.rebind_editor();
            tracing::debug!(id = %entry.id, name = %entry.name, "imported");
            s.committed(Change::Imported(entry.id.clone()));
            Ok(entry)
        })
    }

    /// Switch the editor to another file, flushing pending edits first.
    pub fn set_active(&mut self, id: &EntryId) -> Result<()> {
        let target = self.vfs.get(id).ok_or_else(|| VfsError::NotFound(id.clone()))?;
        if !target.is_file() {
            return Err(VfsError::NotAFile(id.clone()));
        }
        if self.vfs.active_id() == Some(id) {
            self.tabs.open(id);
            return Ok(());
        }

        self.after_flush(|s| {
            s.vfs.set_active(id)?;
            s.persist()?;
            s.rebind_editor();
            s.committed(Change::Selected(Some(id.clone())));
            Ok(())
        })
    }

    /// Close a tab. Closing the active tab hands the selection to the last
    /// remaining tab, or clears it. Returns `false` if the tab was not open.
    pub fn close_tab(&mut self, id: &EntryId) -> Result<bool> {
        if !self.tabs.is_open(id) {
            return Ok(false);
        }
        if self.vfs.active_id() != Some(id) {
            self.tabs.close(id);
            self.committed(Change::TabClosed(id.clone()));
            return Ok(true);
        }

        self.after_flush(|s| {
            s.tabs.close(id);
            match s.tabs.fallback().cloned() {
                Some(next) => s.vfs.set_active(&next)?,
                None => s.vfs.clear_active(),
            }
            if let Err(e) = s.persist() {
                s.tabs.open(id);
                return Err(e);
            }
            s.rebind_editor();
            s.committed(Change::TabClosed(id.clone()));
            Ok(true)
        })
    }

    // ================================================================
    // Editor
    // ================================================================

    /// A keystroke: replace the buffer and write it through.
    ///
    /// Returns `false` when no text file is bound (empty editor or image).
    pub fn input(&mut self, text: &str) -> Result<bool> {
        if !self.editor.replace_text(text) {
            return Ok(false);
        }
        self.flush_editor_to_state()?;
        Ok(true)
    }

    /// Write the editor buffer into the active file's content.
    ///
    /// No-op for images, folders, an empty editor, or a clean buffer.
    /// Returns `true` if the tree changed.
    pub fn flush_editor_to_state(&mut self) -> Result<bool> {
        match self.write_back_buffer()? {
            Some(id) => {
                self.committed(Change::ContentEdited(id));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ================================================================
    // Preview
    // ================================================================

    /// Flush and recompose right away, bypassing the debounce.
    pub fn refresh_preview(&mut self) -> Result<u64> {
        self.flush_editor_to_state()?;
        let input = self.compose_input();
        Ok(self.debouncer.compose_now(input))
    }

    fn compose_input(&self) -> ComposeInput {
        ComposeInput::from_entries(self.vfs.entries())
    }

    // ================================================================
    // Context menu
    // ================================================================

    pub fn open_context_menu(&mut self, id: &EntryId) -> Result<&Entry> {
        let entry = self.vfs.get(id).ok_or_else(|| VfsError::NotFound(id.clone()))?;
        self.context_menu = Some(id.clone());
        Ok(entry)
    }

    pub fn dismiss_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// The entry the open context menu targets, if it still exists.
    pub fn context_menu(&self) -> Option<&Entry> {
        self.context_menu.as_ref().and_then(|id| self.vfs.get(id))
    }

    // ================================================================
    // Lifecycle
    // ================================================================

    /// Replace the whole tree with seed data after confirmation.
    pub fn reset(&mut self, confirm: &mut impl Confirm) -> Result<bool> {
        if !confirm.confirm("Reset the playground to the starter files?") {
            return Ok(false);
        }
        self.store.clear()?;
        let loaded = self.store.load()?;
        self.vfs = Vfs::from_state(loaded.state);
        self.tabs = TabStrip::new();
        self.context_menu = None;
        self.editor.unbind();
        self.rebind_editor();
        tracing::info!(key = %self.store.key(), "reset to seed data");
        self.committed(Change::Reset);
        Ok(true)
    }

    /// Flush pending edits and stop the debouncer.
    pub fn close(mut self) -> Result<()> {
        let flushed = self.flush_editor_to_state();
        self.debouncer.cancel();
        tracing::info!(key = %self.store.key(), "session closed");
        flushed.map(|_| ())
    }

    // ================================================================
    // Internals
    // ================================================================

    /// Persist a dirty buffer without notifying. Returns the edited file if
    /// the tree changed.
    fn write_back_buffer(&mut self) -> Result<Option<EntryId>> {
        if !self.editor.is_dirty() {
            return Ok(None);
        }
        let Some((id, text)) = self.editor.pending_flush() else {
            return Ok(None);
        };
        let (id, text) = (id.clone(), text.to_string());

        let changed = self.vfs.set_content(&id, &text)?;
        if changed {
            self.persist()?;
        }
        self.editor.mark_clean();
        if !changed {
            return Ok(None);
        }
        tracing::debug!(%id, bytes = text.len(), "flushed editor");
        Ok(Some(id))
    }

    /// Flush the buffer, then run `op`. The flush rides on `op`'s own
    /// notification, or is announced alone if `op` commits nothing.
    fn after_flush<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let flushed = self.write_back_buffer()?;
        let commits = self.commits;
        let result = op(self);
        if let Some(id) = flushed {
            if self.commits == commits {
                self.committed(Change::ContentEdited(id));
            }
        }
        result
    }

    /// Write the tree through. On failure, restore the last persisted tree
    /// and realign tabs and editor with it.
    fn persist(&mut self) -> Result<()> {
        let Err(e) = self.store.save(self.vfs.state()) else {
            return Ok(());
        };
        tracing::warn!(error = %e, "write-through failed, rolling back");
        if let Ok(Some(previous)) = self.store.last_persisted() {
            self.vfs = Vfs::from_state(previous);
        }
        self.tabs.retain_live(&self.vfs);
        if self.editor.bound_id() != self.vfs.active_id() {
            self.rebind_editor();
        }
        Err(e)
    }

    /// Point the editor at the active file and make sure its tab is open.
    fn rebind_editor(&mut self) {
        self.editor.bind(self.vfs.active());
        if let Some(id) = self.vfs.active_id() {
            self.tabs.open(id);
        }
    }

    fn committed(&mut self, change: Change) {
        self.commits += 1;
        self.events.changed(change);
        self.events.recompute_scheduled();
        let input = self.compose_input();
        self.debouncer.schedule(input);
    }
}
