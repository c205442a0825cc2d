//! Trailing-edge debounce of preview recomputation.
//!
//! Each [`schedule`](Debouncer::schedule) aborts the in-flight timer and
//! starts a new one, so a burst of edits produces exactly one compose, one
//! quiet interval after the last edit.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::compose::ComposeInput;
use crate::error::{Result, VfsError};
use crate::preview::Preview;

pub struct Debouncer {
    quiet: Duration,
    runtime: Handle,
    preview: Preview,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(quiet: Duration, runtime: Handle, preview: Preview) -> Self {
        Self {
            quiet,
            runtime,
            preview,
            pending: None,
        }
    }

    /// Build on the runtime of the calling context.
    pub fn on_current_runtime(quiet: Duration, preview: Preview) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| VfsError::NoRuntime)?;
        Ok(Self::new(quiet, runtime, preview))
    }

    /// (Re)start the quiet-interval timer with the newest snapshot.
    pub fn schedule(&mut self, input: ComposeInput) {
        self.schedule_after(self.quiet, input);
    }

    /// (Re)start the timer with an explicit delay.
    pub fn schedule_after(&mut self, delay: Duration, input: ComposeInput) {
        self.cancel();
        let preview = self.preview.clone();
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let generation = preview.publish(input.render());
            tracing::debug!(generation, "preview recomposed");
        }));
    }

    /// Cancel any pending timer and publish immediately.
    pub fn compose_now(&mut self, input: ComposeInput) -> u64 {
        self.cancel();
        let generation = self.preview.publish(input.render());
        tracing::debug!(generation, "preview recomposed immediately");
        generation
    }

    /// True while a timer is armed and has not fired.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn input(n: usize) -> ComposeInput {
        ComposeInput {
            markup: Some(format!("<p>{n}</p>")),
            ..ComposeInput::default()
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_coalesces_into_one_compose_after_last_edit() {
        let preview = Preview::new();
        let mut rx = preview.subscribe();
        let mut debouncer = Debouncer::on_current_runtime(ms(650), preview.clone()).unwrap();

        let start = Instant::now();
        for n in 0..5 {
            debouncer.schedule(input(n));
            if n < 4 {
                tokio::time::sleep(ms(100)).await;
            }
        }
        assert_eq!(preview.current().generation, 0);

        rx.changed().await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= ms(1050) && elapsed < ms(1060), "fired at {elapsed:?}");
        assert_eq!(rx.borrow().generation, 1);
        assert_eq!(&*rx.borrow().html, "<p>4</p>");

        let again = tokio::time::timeout(ms(5000), rx.changed()).await;
        assert!(again.is_err(), "no second compose expected");
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_edits_compose_each_time() {
        let preview = Preview::new();
        let mut rx = preview.subscribe();
        let mut debouncer = Debouncer::on_current_runtime(ms(650), preview.clone()).unwrap();

        debouncer.schedule(input(1));
        rx.changed().await.unwrap();
        debouncer.schedule(input(2));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().generation, 2);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn compose_now_cancels_pending_timer() {
        let preview = Preview::new();
        let mut debouncer = Debouncer::on_current_runtime(ms(650), preview.clone()).unwrap();

        debouncer.schedule(input(1));
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.compose_now(input(2)), 1);
        assert!(!debouncer.is_pending());

        tokio::time::sleep(ms(2000)).await;
        let doc = preview.current();
        assert_eq!(doc.generation, 1);
        assert_eq!(&*doc.html, "<p>2</p>");
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_pending_timer() {
        let preview = Preview::new();
        {
            let mut debouncer = Debouncer::on_current_runtime(ms(650), preview.clone()).unwrap();
            debouncer.schedule(input(1));
        }
        tokio::time::sleep(ms(2000)).await;
        assert_eq!(preview.current().generation, 0);
    }

    #[test]
    fn outside_runtime_is_an_error() {
        let result = Debouncer::on_current_runtime(ms(650), Preview::new());
        assert!(matches!(result, Err(VfsError::NoRuntime)));
    }
}
