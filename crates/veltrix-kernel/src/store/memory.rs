//! In-memory slot implementation.
//!
//! Used for transient sessions and testing. All data is ephemeral.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use super::Slot;

/// In-memory key-value slot.
///
/// Thread-safe via internal `Mutex`. All data is lost when dropped.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-populated with one key, for loading fixtures.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value.into());
        Self {
            values: Mutex::new(values),
        }
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| io::Error::other("memory slot lock poisoned"))
    }
}

impl Slot for MemorySlot {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_read() {
        let slot = MemorySlot::new();
        slot.write("k", "v").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn missing_key_is_none() {
        let slot = MemorySlot::new();
        assert_eq!(slot.read("nope").unwrap(), None);
    }

    #[test]
    fn overwrite_and_remove() {
        let slot = MemorySlot::with_value("k", "first");
        slot.write("k", "second").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("second"));
        slot.remove("k").unwrap();
        assert_eq!(slot.read("k").unwrap(), None);
        // Removing again is fine
        slot.remove("k").unwrap();
    }
}
