use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Directory names never descended into, besides hidden ones.
const SKIPPED_DIRS: &[&str] = &["__pycache__", "venv", "env"];

pub struct FileWalker {
    root: PathBuf,
    ignore_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore_patterns: vec![],
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.ignore_patterns = patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).with_context(|| format!("invalid ignore pattern `{pattern}`"))
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// Python files under the root, sorted by path.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(false)
            .ignore(false)
            .parents(false)
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
                !(is_dir && entry.depth() > 0 && is_skipped_dir(entry.file_name()))
            })
            .build();

        for entry in walker {
            let entry = entry.with_context(|| format!("failed to walk {}", self.root.display()))?;
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        log::debug!("found {} python file(s) under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        if path.extension().is_none_or(|ext| ext != "py") {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative.to_string_lossy();
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(&path_str) || pattern.matches_path(path))
    }
}

fn is_skipped_dir(name: &std::ffi::OsStr) -> bool {
    SKIPPED_DIRS.iter().any(|skipped| name == *skipped)
}

pub fn find_python_files(root: &Path, ignore_patterns: &[String]) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .with_ignore_patterns(ignore_patterns)?
        .walk()
}
