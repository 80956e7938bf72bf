use serde_json::Value;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::errors::{Result, StarlessError};

/// Copies `src` into `dst` recursively, creating directories as needed.
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns an error if `src` cannot be walked or a file cannot be copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| StarlessError::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| StarlessError::Config(e.to_string()))?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Writes `value` as two-space indented JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the file is missing or not valid JSON.
pub fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
