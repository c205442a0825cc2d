//! File languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Semantic kind of a file, derived from its extension.
///
/// Serialized with the short tags used by the persisted state
/// (`html`, `css`, `js`, `image`, `text`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "html")]
    Markup,
    #[serde(rename = "css")]
    Style,
    #[serde(rename = "js")]
    Script,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "text")]
    PlainText,
}

impl Language {
    /// All languages, in classifier order.
    pub const ALL: [Language; 5] = [
        Language::Markup,
        Language::Style,
        Language::Script,
        Language::Image,
        Language::PlainText,
    ];

    /// The persisted tag for this language.
    pub fn tag(self) -> &'static str {
        match self {
            Language::Markup => "html",
            Language::Style => "css",
            Language::Script => "js",
            Language::Image => "image",
            Language::PlainText => "text",
        }
    }

    /// Glyph shown next to files of this language in the tree and tab strip.
    pub fn icon(self) -> &'static str {
        match self {
            Language::Markup => "🌐",
            Language::Style => "🎨",
            Language::Script => "⚡",
            Language::Image => "🖼",
            Language::PlainText => "📄",
        }
    }

    /// Images carry a binary payload instead of editable text.
    pub fn is_image(self) -> bool {
        matches!(self, Language::Image)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = TypesError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.tag() == tag)
            .ok_or_else(|| TypesError::UnknownLanguage(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_back() {
        for lang in Language::ALL {
            assert_eq!(lang.tag().parse::<Language>(), Ok(lang));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(
            "python".parse::<Language>(),
            Err(TypesError::UnknownLanguage("python".into()))
        );
    }

    #[test]
    fn serde_uses_short_tags() {
        let json = serde_json::to_string(&Language::Script).unwrap();
        assert_eq!(json, "\"js\"");
        let lang: Language = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(lang, Language::PlainText);
    }
}
