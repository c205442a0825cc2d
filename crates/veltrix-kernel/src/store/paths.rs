//! XDG Base Directory paths for veltrix state.
//!
//! | Purpose | XDG Variable | Default | veltrix Path |
//! |---------|--------------|---------|--------------|
//! | Slots | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/veltrix/slots/*.json` |
//! | Preview | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/veltrix/preview.html` |
//! | History | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/veltrix/history.txt` |
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` | `$XDG_CONFIG_HOME/veltrix/config.toml` |

use std::path::{Path, PathBuf};

use directories::BaseDirs;

/// Get the data directory for persistent state.
///
/// Uses `$XDG_DATA_HOME/veltrix` or falls back to `~/.local/share/veltrix`.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".local").join("share"))
        .join("veltrix")
}

/// Get the config directory.
///
/// Uses `$XDG_CONFIG_HOME/veltrix` or falls back to `~/.config/veltrix`.
pub fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".config"))
        .join("veltrix")
}

/// Directory backing [`FileSlot`](super::FileSlot) keys.
pub fn slots_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("slots")
}

/// Where hosts write the most recent composed document.
pub fn preview_path(data_dir: &Path) -> PathBuf {
    data_dir.join("preview.html")
}

/// Line-editor history for the REPL.
pub fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join("history.txt")
}

fn home_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_veltrix() {
        assert!(data_dir().ends_with("veltrix"));
        assert!(config_dir().ends_with("veltrix"));
    }

    #[test]
    fn data_files_are_under_data_dir() {
        let data = Path::new("/srv/veltrix");
        assert_eq!(slots_dir(data), PathBuf::from("/srv/veltrix/slots"));
        assert_eq!(preview_path(data), PathBuf::from("/srv/veltrix/preview.html"));
        assert_eq!(history_path(data), PathBuf::from("/srv/veltrix/history.txt"));
    }
}
