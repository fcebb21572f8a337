//! File metadata helpers

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What the planner needs to know about a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

/// Reads modification time and size of `path`.
pub fn stat_file(path: impl AsRef<Path>) -> io::Result<FileMetadata> {
    let metadata = fs::metadata(path)?;
    Ok(FileMetadata {
        modified: DateTime::<Utc>::from(metadata.modified()?),
        size: metadata.len(),
    })
}

/// Regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
