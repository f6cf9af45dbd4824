use std::path::{Path, PathBuf};

use crate::error::{GenerateError, Result};

/// Recursively collect the `.rs` files under `folder_path`, sorted so that
/// repeated scans of the same tree visit files in the same order.
pub fn collect_files(folder_path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        std::fs::read_dir(folder_path).map_err(|e| GenerateError::io(folder_path, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| GenerateError::io(folder_path, e))?;
        let path = entry.path();
        if path.is_file() {
            if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        } else if path.is_dir() {
            files.extend(collect_files(&path)?);
        }
    }
    files.sort();
    Ok(files)
}

/// Module segments of a source file relative to the scanned folder.
///
/// `orders/mod.rs` and `orders.rs` both map to `["orders"]`; a root
/// `lib.rs`, `main.rs` or `mod.rs` contributes no segment.
pub fn file_to_segments(file: &Path, base_path: &Path) -> Vec<String> {
    let relative = file.strip_prefix(base_path).unwrap_or(file);
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.strip_suffix(".rs").unwrap_or(s).to_string())
        .collect();
    if let Some(last) = segments.last()
        && (last == "mod" || (segments.len() == 1 && (last == "lib" || last == "main")))
    {
        segments.pop();
    }
    segments
}
