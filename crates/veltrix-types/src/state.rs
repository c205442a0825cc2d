//! The persisted state blob.

use serde::{Deserialize, Serialize};

use crate::{Entry, EntryId, EntryKind};

/// The whole virtual file tree plus the active selection.
///
/// This is exactly the JSON written to the storage slot:
///
/// ```json
/// { "activeId": "e_…", "files": [ { "id": "e_…", "name": "index.html",
///   "type": "file", "lang": "html", "content": "…", "dataURL": null,
///   "createdAt": 1700000000000 } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsState {
    #[serde(rename = "activeId")]
    pub active_id: Option<EntryId>,
    pub files: Vec<Entry>,
}

impl VfsState {
    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.files.iter().find(|e| &e.id == id)
    }

    pub fn get_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        self.files.iter_mut().find(|e| &e.id == id)
    }

    /// Find an entry by exact name within one kind.
    pub fn find_by_name(&self, name: &str, kind: EntryKind) -> Option<&Entry> {
        self.files.iter().find(|e| e.kind == kind && e.name == name)
    }

    /// The first file entry in storage order.
    pub fn first_file(&self) -> Option<&Entry> {
        self.files.iter().find(|e| e.is_file())
    }

    /// The active entry, if `active_id` resolves.
    pub fn active(&self) -> Option<&Entry> {
        self.active_id.as_ref().and_then(|id| self.get(id))
    }

    /// True if `active_id` is absent or points at a live file.
    pub fn active_is_valid(&self) -> bool {
        match &self.active_id {
            None => true,
            Some(id) => self.get(id).is_some_and(Entry::is_file),
        }
    }

    /// True if no two entries of the same kind share a name.
    pub fn names_are_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.files.iter().all(|e| seen.insert((e.kind, e.name.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Language;

    const BLOB: &str = r#"{
        "activeId": "e_1",
        "files": [
            {"id": "e_1", "name": "index.html", "type": "file", "lang": "html",
             "content": "<p>hi</p>", "dataURL": null, "createdAt": 3},
            {"id": "e_2", "name": "logo.png", "type": "file", "lang": "image",
             "content": null, "dataURL": "data:image/png;base64,iVBORw0KGgo=", "createdAt": 2},
            {"id": "e_3", "name": "assets", "type": "folder", "lang": null,
             "content": null, "dataURL": null, "createdAt": 1}
        ]
    }"#;

    #[test]
    fn parses_persisted_layout() {
        let state: VfsState = serde_json::from_str(BLOB).unwrap();
        assert_eq!(state.active_id, Some(EntryId::from("e_1")));
        assert_eq!(state.files.len(), 3);
        assert_eq!(state.files[0].language, Some(Language::Markup));
        assert_eq!(state.files[2].kind, EntryKind::Folder);
        assert!(state.files.iter().all(Entry::has_consistent_shape));
        assert!(state.active_is_valid());
        assert!(state.names_are_unique());
    }

    #[test]
    fn round_trip_is_lossless() {
        let state: VfsState = serde_json::from_str(BLOB).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let again: VfsState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, again);
        assert!(json.contains("\"dataURL\":\"data:image/png;base64,iVBORw0KGgo=\""));
        assert!(json.contains("\"activeId\":\"e_1\""));
    }

    #[test]
    fn folder_as_active_is_invalid() {
        let mut state: VfsState = serde_json::from_str(BLOB).unwrap();
        state.active_id = Some(EntryId::from("e_3"));
        assert!(!state.active_is_valid());
    }

    #[test]
    fn same_name_different_kind_is_unique() {
        let state = VfsState {
            active_id: None,
            files: vec![
                Entry::folder(EntryId::from("a"), "src", 0),
                Entry::text_file(EntryId::from("b"), "src", Language::PlainText, "", 0),
            ],
        };
        assert!(state.names_are_unique());
    }
}
