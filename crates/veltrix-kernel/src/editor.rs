//! Editor surface state machine.
//!
//! ```text
//!            bind(text file)            bind(image)
//!   Empty ───────────────────▶ Editing ◀──────────▶ ImagePreview
//!     ▲                           │                      │
//!     └───────── unbind ──────────┴──────────────────────┘
//! ```
//!
//! The surface only holds the buffer. Writing the buffer back into the tree
//! before leaving `Editing` is the session's job.

use veltrix_types::{Entry, EntryId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorMode {
    /// No active file; the editor is disabled.
    #[default]
    Empty,
    /// A text file is bound and editable.
    Editing(EntryId),
    /// An image is bound; the editor is disabled and shows the image.
    ImagePreview(EntryId),
}

#[derive(Debug, Clone, Default)]
pub struct EditorSurface {
    mode: EditorMode,
    buffer: String,
    dirty: bool,
}

impl EditorSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    /// The entry bound to the surface, in either non-empty mode.
    pub fn bound_id(&self) -> Option<&EntryId> {
        match &self.mode {
            EditorMode::Empty => None,
            EditorMode::Editing(id) | EditorMode::ImagePreview(id) => Some(id),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditorMode::Editing(_))
    }

    /// True if the buffer holds keystrokes not yet written to the tree.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bind an entry (or nothing), replacing the buffer.
    pub fn bind(&mut self, entry: Option<&Entry>) {
        self.buffer.clear();
        self.dirty = false;
        self.mode = match entry {
            Some(e) if e.is_editable() => {
                self.buffer.push_str(e.content.as_deref().unwrap_or_default());
                EditorMode::Editing(e.id.clone())
            }
            Some(e) if e.is_image() => EditorMode::ImagePreview(e.id.clone()),
            _ => EditorMode::Empty,
        };
    }

    pub fn unbind(&mut self) {
        self.bind(None);
    }

    /// Replace the buffer. Ignored unless a text file is bound.
    pub fn replace_text(&mut self, text: &str) -> bool {
        if !self.is_editing() {
            return false;
        }
        if self.buffer != text {
            self.buffer.clear();
            self.buffer.push_str(text);
            self.dirty = true;
        }
        true
    }

    /// Append to the buffer. Ignored unless a text file is bound.
    pub fn append_text(&mut self, text: &str) -> bool {
        if !self.is_editing() {
            return false;
        }
        self.buffer.push_str(text);
        self.dirty |= !text.is_empty();
        true
    }

    /// The bound text file and its buffer, when there is something to flush.
    pub fn pending_flush(&self) -> Option<(&EntryId, &str)> {
        match &self.mode {
            EditorMode::Editing(id) => Some((id, self.buffer.as_str())),
            EditorMode::Empty | EditorMode::ImagePreview(_) => None,
        }
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veltrix_types::Language;

    fn text_entry() -> Entry {
        Entry::text_file(EntryId::from("t"), "a.js", Language::Script, "let a;", 0)
    }

    #[test]
    fn starts_empty() {
        let editor = EditorSurface::new();
        assert_eq!(editor.mode(), &EditorMode::Empty);
        assert_eq!(editor.bound_id(), None);
        assert!(editor.pending_flush().is_none());
    }

    #[test]
    fn binding_text_enters_editing() {
        let mut editor = EditorSurface::new();
        editor.bind(Some(&text_entry()));
        assert_eq!(editor.mode(), &EditorMode::Editing(EntryId::from("t")));
        assert_eq!(editor.text(), "let a;");
        assert!(!editor.is_dirty());
    }

    #[test]
    fn binding_image_disables_editing() {
        let mut editor = EditorSurface::new();
        editor.bind(Some(&text_entry()));
        editor.bind(Some(&Entry::image_file(EntryId::from("i"), "a.png", None, 0)));
        assert_eq!(editor.mode(), &EditorMode::ImagePreview(EntryId::from("i")));
        assert_eq!(editor.text(), "");
        assert!(!editor.replace_text("nope"));
        assert!(editor.pending_flush().is_none());
    }

    #[test]
    fn binding_folder_is_empty() {
        let mut editor = EditorSurface::new();
        editor.bind(Some(&Entry::folder(EntryId::from("f"), "lib", 0)));
        assert_eq!(editor.mode(), &EditorMode::Empty);
    }

    #[test]
    fn edits_mark_dirty_until_clean() {
        let mut editor = EditorSurface::new();
        editor.bind(Some(&text_entry()));
        assert!(editor.replace_text("let a;"));
        assert!(!editor.is_dirty());
        assert!(editor.append_text("\nlet b;"));
        assert!(editor.is_dirty());
        assert_eq!(
            editor.pending_flush(),
            Some((&EntryId::from("t"), "let a;\nlet b;"))
        );
        editor.mark_clean();
        assert!(!editor.is_dirty());
    }
}
