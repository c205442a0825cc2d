//! Live-preview compositor.
//!
//! Merges the tree's markup, style and script files into one document:
//!
//! - the first markup file (storage order) is the base document
//! - all style files are joined into one `<style>` block placed before the
//!   first `</head>`, or prepended when there is none
//! - all script files are joined into one `<script>` block placed before the
//!   first `</body>`, or appended when there is none; the script is wrapped
//!   in `try`/`catch` so a throwing statement is logged instead of blanking
//!   the preview
//!
//! Splicing is purely textual. Missing markers never drop content.

use veltrix_types::{Entry, Language};

/// Shown when the tree has no markup file.
pub const PLACEHOLDER_DOCUMENT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Preview</title>
</head>
<body style="font-family: sans-serif; color: #888; padding: 2rem;">
  <p>Nothing to preview yet. Create an <code>.html</code> file to see it rendered here.</p>
</body>
</html>"#;

const HEAD_CLOSE: &str = "</head>";
const BODY_CLOSE: &str = "</body>";

/// Owned snapshot of everything the compositor reads.
///
/// Taken when a recompute is scheduled so the timer task needs no access to
/// the live tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeInput {
    pub markup: Option<String>,
    pub styles: Vec<String>,
    pub scripts: Vec<String>,
}

impl ComposeInput {
    pub fn from_entries(entries: &[Entry]) -> Self {
        let text_of = |language: Language| {
            entries
                .iter()
                .filter(move |e| e.is_file_of(language))
                .map(|e| e.content.clone().unwrap_or_default())
        };
        Self {
            markup: text_of(Language::Markup).next(),
            styles: text_of(Language::Style).collect(),
            scripts: text_of(Language::Script).collect(),
        }
    }

    /// Produce the document.
    pub fn render(&self) -> String {
        let Some(base) = &self.markup else {
            return PLACEHOLDER_DOCUMENT.to_string();
        };

        // Positions index the untouched base; injected text never moves a marker.
        let mut inserts: Vec<(usize, String)> = Vec::with_capacity(2);
        if !self.styles.is_empty() {
            let block = format!("<style>\n{}\n</style>\n", self.styles.join("\n\n"));
            inserts.push((base.find(HEAD_CLOSE).unwrap_or(0), block));
        }
        if !self.scripts.is_empty() {
            let js = escape_script_close(&self.scripts.join("\n\n"));
            let block = format!(
                "<script>\ntry {{\n{js}\n}} catch (err) {{\n  console.error(err);\n}}\n</script>\n"
            );
            inserts.push((base.find(BODY_CLOSE).unwrap_or(base.len()), block));
        }
        inserts.sort_by_key(|(pos, _)| *pos);

        let extra: usize = inserts.iter().map(|(_, text)| text.len()).sum();
        let mut doc = String::with_capacity(base.len() + extra);
        let mut cursor = 0;
        for (pos, text) in &inserts {
            doc.push_str(&base[cursor..*pos]);
            doc.push_str(text);
            cursor = *pos;
        }
        doc.push_str(&base[cursor..]);
        doc
    }
}

/// Compose the preview document for a set of entries.
pub fn compose(entries: &[Entry]) -> String {
    ComposeInput::from_entries(entries).render()
}

/// Neutralize `</script` (any case) so user code cannot close the wrapper.
fn escape_script_close(js: &str) -> String {
    const NEEDLE: &str = "</script";
    let lower = js.to_ascii_lowercase();
    let mut out = String::with_capacity(js.len());
    let mut cursor = 0;
    for (idx, _) in lower.match_indices(NEEDLE) {
        out.push_str(&js[cursor..idx]);
        out.push_str("<\\/");
        cursor = idx + 2;
    }
    out.push_str(&js[cursor..]);
    out
}
