//! Crash-safe file writes shared by the JSON-backed stores

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling path a write goes through before it replaces `path`
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write via a sibling temp file so a crash never leaves a half-written file
pub(crate) fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = temp_path(path);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
