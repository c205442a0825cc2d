//! First-run file set.

use veltrix_types::{Entry, Language, VfsState};

use crate::ids::{new_id, now_millis};

pub const SEED_HTML_NAME: &str = "index.html";
pub const SEED_CSS_NAME: &str = "style.css";
pub const SEED_JS_NAME: &str = "script.js";

pub const SEED_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>My Project</title>
</head>
<body>
  <h1>Hello, Veltrix IDE!</h1>
  <p>Start building something amazing.</p>
</body>
</html>"#;

pub const SEED_CSS: &str = r#"body {
  font-family: sans-serif;
  padding: 2rem;
  background: #f5f5f5;
  color: #222;
}

h1 {
  font-size: 2rem;
  margin-bottom: 0.5rem;
}"#;

pub const SEED_JS: &str = r#"// JavaScript goes here
console.log("Veltrix IDE — ready!");

document.addEventListener('DOMContentLoaded', () => {
  // Your code here
});"#;

/// The three starter files, with the markup file active.
///
/// `createdAt` is staggered so newest-first presentation lists
/// html, css, js.
pub fn seed_state() -> VfsState {
    let now = now_millis();
    let html = Entry::text_file(new_id(), SEED_HTML_NAME, Language::Markup, SEED_HTML, now);
    let css = Entry::text_file(new_id(), SEED_CSS_NAME, Language::Style, SEED_CSS, now - 1);
    let js = Entry::text_file(new_id(), SEED_JS_NAME, Language::Script, SEED_JS, now - 2);
    VfsState {
        active_id: Some(html.id.clone()),
        files: vec![html, css, js],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_one_of_each_composable_language() {
        let state = seed_state();
        assert_eq!(state.files.len(), 3);
        for lang in [Language::Markup, Language::Style, Language::Script] {
            assert_eq!(state.files.iter().filter(|e| e.is_file_of(lang)).count(), 1);
        }
    }

    #[test]
    fn seed_activates_markup() {
        let state = seed_state();
        let active = state.active().unwrap();
        assert_eq!(active.name, SEED_HTML_NAME);
        assert!(state.active_is_valid());
        assert!(state.names_are_unique());
    }
}
