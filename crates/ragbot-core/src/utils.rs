//! Utility helpers — path resolution and string manipulation.

use std::path::PathBuf;

/// Get the Ragbot data directory (e.g. `~/.ragbot/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".ragbot")
}

/// Get the REPL history directory (e.g. `~/.ragbot/history/`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history")
}

/// Get the transcript export directory (e.g. `~/.ragbot/transcripts/`).
pub fn get_transcripts_path() -> PathBuf {
    get_data_path().join("transcripts")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
