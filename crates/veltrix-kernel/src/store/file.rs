//! Directory-backed slot implementation.
//!
//! Each key is stored as `<root>/<key>.json`. Writes go to a temporary
//! sibling first and are renamed into place, so a crash mid-write leaves
//! the previous value intact.

use std::io;
use std::path::{Path, PathBuf};

use super::Slot;

/// Key-value slot persisted as one file per key.
#[derive(Debug, Clone)]
pub struct FileSlot {
    root: PathBuf,
}

impl FileSlot {
    /// Create a slot rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Slot under `<data_dir>/slots`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(super::paths::slots_dir(data_dir))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its file, refusing keys that would escape the root.
    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid slot key: {key:?}"),
            ));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl Slot for FileSlot {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            // Non-UTF-8 bytes are corruption, not an I/O failure: surface as
            // unreadable content so the store falls back to seed data.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Ok(Some(String::new())),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_root_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("nested").join("slots"));
        slot.write("veltrix_fs", "{}").unwrap();
        assert_eq!(slot.read("veltrix_fs").unwrap().as_deref(), Some("{}"));
        assert!(slot.root().join("veltrix_fs.json").exists());
        assert!(!slot.root().join("veltrix_fs.json.tmp").exists());
    }

    #[test]
    fn data_dir_slot_lives_under_slots() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::in_data_dir(dir.path());
        assert_eq!(slot.root(), dir.path().join("slots"));
        slot.write("veltrix_fs", "[]").unwrap();
        assert!(dir.path().join("slots").join("veltrix_fs.json").exists());
    }

    #[test]
    fn missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path());
        assert_eq!(slot.read("absent").unwrap(), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path());
        slot.write("k", "v").unwrap();
        slot.remove("k").unwrap();
        slot.remove("k").unwrap();
        assert_eq!(slot.read("k").unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path());
        let err = slot.write("../escape", "x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(slot.read("").is_err());
    }

    #[test]
    fn non_utf8_reads_as_empty_blob() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path());
        std::fs::write(dir.path().join("k.json"), [0xff, 0xfe, 0x00]).unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some(""));
    }
}
