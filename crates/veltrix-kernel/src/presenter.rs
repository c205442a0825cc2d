//! Tree and tab-strip view models.
//!
//! Presenters never store an "active" flag of their own: it is computed from
//! the tree's `active_id` at render time, so at most one row is active and it
//! cannot drift from the selection.

use veltrix_types::{EntryId, EntryKind};

use crate::vfs::Vfs;

/// One row of the hierarchical file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: EntryId,
    pub name: String,
    pub kind: EntryKind,
    pub icon: &'static str,
    pub active: bool,
}

/// Rows newest-first by `createdAt`, ties broken by name.
pub fn tree_rows(vfs: &Vfs) -> Vec<TreeRow> {
    let active = vfs.active_id();
    let mut entries: Vec<_> = vfs.entries().iter().collect();
    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries
        .into_iter()
        .map(|e| TreeRow {
            id: e.id.clone(),
            name: e.name.clone(),
            kind: e.kind,
            icon: e.icon(),
            active: active == Some(&e.id),
        })
        .collect()
}

/// One open tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRow {
    pub id: EntryId,
    pub name: String,
    pub icon: &'static str,
    pub active: bool,
}

/// Ordered set of files open in tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabStrip {
    open: Vec<EntryId>,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[EntryId] {
        &self.open
    }

    pub fn is_open(&self, id: &EntryId) -> bool {
        self.open.contains(id)
    }

    /// Open a tab at the end of the strip, if not already open.
    pub fn open(&mut self, id: &EntryId) {
        if !self.is_open(id) {
            self.open.push(id.clone());
        }
    }

    /// Close a tab. Returns `false` if it was not open.
    pub fn close(&mut self, id: &EntryId) -> bool {
        let before = self.open.len();
        self.open.retain(|open| open != id);
        self.open.len() != before
    }

    /// Drop tabs whose entries are gone or are no longer files.
    pub fn retain_live(&mut self, vfs: &Vfs) {
        self.open
            .retain(|id| vfs.get(id).is_some_and(|e| e.is_file()));
    }

    /// The tab a closed active tab hands over to: the last remaining one.
    pub fn fallback(&self) -> Option<&EntryId> {
        self.open.last()
    }

    pub fn rows(&self, vfs: &Vfs) -> Vec<TabRow> {
        let active = vfs.active_id();
        self.open
            .iter()
            .filter_map(|id| vfs.get(id))
            .map(|e| TabRow {
                id: e.id.clone(),
                name: e.name.clone(),
                icon: e.icon(),
                active: active == Some(&e.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veltrix_types::{Entry, Language, VfsState};

    fn vfs() -> Vfs {
        Vfs::from_state(VfsState {
            active_id: Some(EntryId::from("b")),
            files: vec![
                Entry::text_file(EntryId::from("a"), "a.js", Language::Script, "", 10),
                Entry::text_file(EntryId::from("b"), "b.css", Language::Style, "", 30),
                Entry::folder(EntryId::from("c"), "assets", 20),
                Entry::text_file(EntryId::from("d"), "0.txt", Language::PlainText, "", 10),
            ],
        })
    }

    #[test]
    fn tree_is_newest_first_with_name_ties() {
        let names: Vec<_> = tree_rows(&vfs()).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["b.css", "assets", "0.txt", "a.js"]);
    }

    #[test]
    fn exactly_one_tree_row_is_active() {
        let rows = tree_rows(&vfs());
        let active: Vec<_> = rows.iter().filter(|r| r.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, EntryId::from("b"));
        assert_eq!(rows[1].icon, "📁");
    }

    #[test]
    fn tabs_open_once_and_close() {
        let mut tabs = TabStrip::new();
        tabs.open(&EntryId::from("a"));
        tabs.open(&EntryId::from("b"));
        tabs.open(&EntryId::from("a"));
        assert_eq!(tabs.ids().len(), 2);
        assert!(tabs.close(&EntryId::from("a")));
        assert!(!tabs.close(&EntryId::from("a")));
        assert_eq!(tabs.fallback(), Some(&EntryId::from("b")));
    }

    #[test]
    fn tab_active_flag_mirrors_selection() {
        let vfs = vfs();
        let mut tabs = TabStrip::new();
        tabs.open(&EntryId::from("a"));
        tabs.open(&EntryId::from("b"));
        let rows = tabs.rows(&vfs);
        assert_eq!(rows.iter().filter(|r| r.active).count(), 1);
        assert!(rows[1].active);
    }

    #[test]
    fn retain_live_drops_missing_and_folders() {
        let vfs = vfs();
        let mut tabs = TabStrip::new();
        tabs.open(&EntryId::from("a"));
        tabs.open(&EntryId::from("c"));
        tabs.open(&EntryId::from("gone"));
        tabs.retain_live(&vfs);
        assert_eq!(tabs.ids(), &[EntryId::from("a")]);
    }
}
