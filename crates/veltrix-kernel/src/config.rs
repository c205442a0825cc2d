//! Playground configuration.

use std::time::Duration;

/// Default storage ceiling: the usual per-origin local storage quota.
pub const DEFAULT_MAX_STATE_BYTES: usize = 5 * 1024 * 1024;

/// Configuration for opening a session.
#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    /// Key of the slot holding the serialized file tree.
    pub storage_key: String,
    /// Quiet interval after the last edit before the preview recomposes.
    pub debounce: Duration,
    /// Delay of the first compose after the session opens.
    pub initial_compose_delay: Duration,
    /// Largest serialized state the store will write.
    pub max_state_bytes: usize,
    /// Buffer size of the change-notification channel.
    pub event_capacity: usize,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            storage_key: "veltrix_fs".to_string(),
            debounce: Duration::from_millis(650),
            initial_compose_delay: Duration::from_millis(400),
            max_state_bytes: DEFAULT_MAX_STATE_BYTES,
            event_capacity: 64,
        }
    }
}

impl PlaygroundConfig {
    /// Config for throwaway sessions (tests, `--transient`).
    pub fn transient() -> Self {
        Self {
            storage_key: "veltrix_fs_transient".to_string(),
            ..Self::default()
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_max_state_bytes(mut self, limit: usize) -> Self {
        self.max_state_bytes = limit;
        self
    }
}
