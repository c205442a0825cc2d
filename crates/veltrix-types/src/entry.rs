//! Entries of the virtual file tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Language, TypesError};

/// Opaque, immutable identifier of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// File or folder. Names are unique within a kind, not across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(EntryKind::File),
            "folder" => Ok(EntryKind::Folder),
            other => Err(TypesError::UnknownKind(other.to_string())),
        }
    }
}

/// One node of the virtual file tree.
///
/// The payload fields follow the kind:
/// - folders carry neither `language`, `content` nor `data_url`
/// - image files carry `data_url` (possibly absent for an empty image)
/// - every other file carries `content`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(rename = "lang")]
    pub language: Option<Language>,
    pub content: Option<String>,
    #[serde(rename = "dataURL")]
    pub data_url: Option<String>,
    /// Milliseconds since the Unix epoch. Only used to order presentation.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Entry {
    /// A folder entry.
    pub fn folder(id: EntryId, name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            kind: EntryKind::Folder,
            language: None,
            content: None,
            data_url: None,
            created_at,
        }
    }

    /// A text (non-image) file.
    pub fn text_file(
        id: EntryId,
        name: impl Into<String>,
        language: Language,
        content: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: EntryKind::File,
            language: Some(language),
            content: Some(content.into()),
            data_url: None,
            created_at,
        }
    }

    /// An image file holding an embedded-data URL, if any.
    pub fn image_file(
        id: EntryId,
        name: impl Into<String>,
        data_url: Option<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: EntryKind::File,
            language: Some(Language::Image),
            content: None,
            data_url,
            created_at,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// True for a file whose language is `Image`.
    pub fn is_image(&self) -> bool {
        self.is_file() && self.language.is_some_and(Language::is_image)
    }

    /// True for a file whose text the editor can bind to.
    pub fn is_editable(&self) -> bool {
        self.is_file() && !self.is_image()
    }

    /// True if this entry is a file of the given language.
    pub fn is_file_of(&self, language: Language) -> bool {
        self.is_file() && self.language == Some(language)
    }

    /// Check that the payload fields agree with the kind and language.
    pub fn has_consistent_shape(&self) -> bool {
        match (self.kind, self.language) {
            (EntryKind::Folder, None) => self.content.is_none() && self.data_url.is_none(),
            (EntryKind::Folder, Some(_)) => false,
            (EntryKind::File, None) => false,
            (EntryKind::File, Some(Language::Image)) => self.content.is_none(),
            (EntryKind::File, Some(_)) => self.content.is_some() && self.data_url.is_none(),
        }
    }

    /// Glyph for presenters: folders get a folder, files their language icon.
    pub fn icon(&self) -> &'static str {
        match (self.kind, self.language) {
            (EntryKind::Folder, _) => "📁",
            (EntryKind::File, Some(lang)) => lang.icon(),
            (EntryKind::File, None) => Language::PlainText.icon(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_have_consistent_shape() {
        let id = EntryId::from("e1");
        assert!(Entry::folder(id.clone(), "src", 0).has_consistent_shape());
        assert!(Entry::text_file(id.clone(), "a.js", Language::Script, "", 0).has_consistent_shape());
        assert!(Entry::image_file(id.clone(), "a.png", None, 0).has_consistent_shape());
        assert!(
            Entry::image_file(id, "a.png", Some("data:image/png;base64,AA==".into()), 0)
                .has_consistent_shape()
        );
    }

    #[test]
    fn text_file_with_data_url_is_inconsistent() {
        let mut entry = Entry::text_file(EntryId::from("e1"), "a.txt", Language::PlainText, "x", 0);
        entry.data_url = Some("data:,".into());
        assert!(!entry.has_consistent_shape());
    }

    #[test]
    fn folder_with_language_is_inconsistent() {
        let mut entry = Entry::folder(EntryId::from("e1"), "lib", 0);
        entry.language = Some(Language::Script);
        assert!(!entry.has_consistent_shape());
    }

    #[test]
    fn kind_parses_and_displays() {
        assert_eq!("folder".parse::<EntryKind>(), Ok(EntryKind::Folder));
        assert_eq!(EntryKind::File.to_string(), "file");
        assert!("dir".parse::<EntryKind>().is_err());
    }

    #[test]
    fn icons_follow_kind_then_language() {
        let folder = Entry::folder(EntryId::from("f"), "assets", 0);
        let css = Entry::text_file(EntryId::from("c"), "a.css", Language::Style, "", 0);
        assert_eq!(folder.icon(), "📁");
        assert_eq!(css.icon(), Language::Style.icon());
    }
}
