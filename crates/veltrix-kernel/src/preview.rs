//! The preview surface: the latest composed document.
//!
//! Backed by a `watch` channel, so consumers always see the newest document
//! whole and intermediate generations may be skipped.

use std::sync::Arc;

use tokio::sync::watch;

/// One composed document. Generation 0 means nothing was composed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewDocument {
    pub generation: u64,
    pub html: Arc<str>,
}

/// Shared handle to the preview channel.
#[derive(Debug, Clone)]
pub struct Preview {
    tx: Arc<watch::Sender<PreviewDocument>>,
}

impl Default for Preview {
    fn default() -> Self {
        Self::new()
    }
}

impl Preview {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PreviewDocument::default());
        Self { tx: Arc::new(tx) }
    }

    /// Receive every future document (and the current one via `borrow`).
    pub fn subscribe(&self) -> watch::Receiver<PreviewDocument> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> PreviewDocument {
        self.tx.borrow().clone()
    }

    /// Replace the document wholesale. Returns the new generation.
    pub fn publish(&self, html: String) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|doc| {
            doc.generation += 1;
            doc.html = html.into();
            generation = doc.generation;
        });
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let preview = Preview::new();
        let doc = preview.current();
        assert_eq!(doc.generation, 0);
        assert!(doc.html.is_empty());
    }

    #[test]
    fn publish_replaces_and_bumps_generation() {
        let preview = Preview::new();
        let rx = preview.subscribe();
        assert_eq!(preview.publish("<p>a</p>".into()), 1);
        assert_eq!(preview.publish("<p>b</p>".into()), 2);
        assert_eq!(&*rx.borrow().html, "<p>b</p>");
        assert_eq!(rx.borrow().generation, 2);
    }
}
