use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every regular file below `root`. A missing root is an empty inventory.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Remove directories under `root` left empty, deepest first.
/// `root` itself is kept. Returns how many directories were removed.
pub fn remove_empty_dirs(root: &Path) -> Result<usize> {
    if !root.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let is_empty = std::fs::read_dir(entry.path())?.next().is_none();
        if is_empty {
            std::fs::remove_dir(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}
