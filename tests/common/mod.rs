#![allow(dead_code)]

use indoc::indoc;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `files` into a fresh temporary directory.
pub fn create_test_project(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut paths = Vec::with_capacity(files.len());

    for (name, content) in files {
        let file_path = temp_dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        paths.push(file_path);
    }

    (temp_dir, paths)
}

/// One documented, branch-free function; nothing to complain about.
pub const CLEAN_MODULE: &str = indoc! {r#"
    """Utility helpers."""


    def greet(name):
        """Return a greeting for name."""
        return "Hello, " + name
"#};

/// Six `if` statements and no docstrings anywhere.
pub const BRANCHY_MODULE: &str = indoc! {r#"
    def classify(value):
        if value > 100:
            return "huge"
        if value > 50:
            return "large"
        if value > 10:
            return "medium"
        if value > 5:
            return "small"
        if value > 0:
            return "tiny"
        if value == 0:
            return "zero"
        return "negative"
"#};

pub const BROKEN_MODULE: &str = indoc! {r#"
    def broken(values):
        return sum((v for v in values)
"#};

const SHARED_BODY: &str = indoc! {"
    total = 0
    for item in items:
        if item.valid:
            total += item.value
        else:
            errors.append(item.name)
    average = total / len(items)
    log.info('average %s', average)
    result = round(average, 2)
    return result
"};

/// A function named `name` whose ten-line body is the same everywhere.
pub fn module_with_shared_body(name: &str) -> String {
    let body: String = SHARED_BODY.lines().map(|line| format!("    {line}\n")).collect();
    format!("def {name}(items, errors, log):\n{body}")
}

/// A function with `branches` equality checks on its argument.
pub fn function_source(name: &str, branches: usize, documented: bool) -> String {
    let mut source = format!("def {name}(value):\n");
    if documented {
        source.push_str("    \"\"\"Map a value.\"\"\"\n");
    }
    for i in 0..branches {
        source.push_str(&format!("    if value == {i}:\n        return {i}\n"));
    }
    source.push_str("    return -1\n");
    source
}
