//! Language classifier and file-name helpers.
//!
//! Classification looks only at the extension, never at content.

use veltrix_types::Language;

/// Extension table, lowercase, without the dot.
const TABLE: &[(&str, Language)] = &[
    ("html", Language::Markup),
    ("htm", Language::Markup),
    ("css", Language::Style),
    ("js", Language::Script),
    ("mjs", Language::Script),
    ("ts", Language::Script),
    ("png", Language::Image),
    ("jpg", Language::Image),
    ("jpeg", Language::Image),
    ("svg", Language::Image),
    ("gif", Language::Image),
    ("webp", Language::Image),
    ("bmp", Language::Image),
];

/// Map a file name to its language. Total: unknown extensions are plain text.
pub fn classify(name: &str) -> Language {
    let (_, ext) = split_name(name);
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, lang)| *lang)
        .unwrap_or(Language::PlainText)
}

/// Split a name into `(base, ext)` where `ext` keeps its leading dot.
///
/// A dot in the first position does not start an extension, so
/// `.gitignore` has no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// MIME type used when embedding an image as a data URL.
pub fn image_mime(name: &str) -> &'static str {
    let (_, ext) = split_name(name);
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
