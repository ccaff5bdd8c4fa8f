pub mod output;
pub mod walker;

use crate::core::{ParseFailure, SourceUnit};
use anyhow::Result;
use std::fs;
use std::path::Path;

/// Unit identifier for a file: its path relative to the scanned root, with
/// forward slashes so reports look the same on every platform.
pub fn unit_id(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let id = relative.to_string_lossy().replace('\\', "/");
    if id.is_empty() {
        path.to_string_lossy().into_owned()
    } else {
        id
    }
}

/// Read one Python file. Unreadable or non-UTF-8 files become a failure for
/// that unit rather than an error for the whole run.
pub fn read_source(path: &Path, id: String) -> std::result::Result<SourceUnit, ParseFailure> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(SourceUnit::new(id, text)),
        Err(e) => {
            log::warn!("cannot read {}: {e}", path.display());
            Err(ParseFailure::read(id, format!("cannot read file: {e}")))
        }
    }
}

/// Load every path, splitting readable units from read failures. Each
/// failure carries the index of its path so input order can be restored.
pub fn load_sources(
    paths: &[impl AsRef<Path>],
    root: &Path,
) -> (Vec<SourceUnit>, Vec<(usize, ParseFailure)>) {
    let mut units = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for (position, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        match read_source(path, unit_id(path, root)) {
            Ok(unit) => units.push(unit),
            Err(failure) => failures.push((position, failure)),
        }
    }
    (units, failures)
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}
