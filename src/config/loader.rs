use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::QualityConfig;
use crate::core::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".pyqual.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to read config file contents
fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Pure function to parse and validate config from TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<QualityConfig> {
    let config = toml::from_str::<QualityConfig>(contents).map_err(|e| {
        Error::configuration(format!("Failed to parse {CONFIG_FILE_NAME}: {e}"))
    })?;
    config.validate()?;
    Ok(config)
}

/// Load an explicitly named config file. Missing or invalid files are errors.
pub fn load_config_from(path: &Path) -> Result<QualityConfig> {
    let contents = read_config_file(path).map_err(|e| Error::FileSystem {
        message: format!("cannot read config file {}", path.display()),
        path: Some(path.to_path_buf()),
        source: Some(e),
    })?;
    let config = parse_and_validate_config(&contents)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Try one candidate location during discovery.
///
/// `Ok(None)` means keep searching; a file that exists but does not parse
/// or validate stops the search with an error.
fn try_load_config_from_path(config_path: &Path) -> Result<Option<QualityConfig>> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return Ok(None);
        }
    };

    let config = parse_and_validate_config(&contents)?;
    log::debug!("Loaded config from {}", config_path.display());
    Ok(Some(config))
}

/// Handle file read errors with appropriate logging
fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.pyqual.toml`; defaults if none.
pub fn load_config(start: &Path) -> Result<QualityConfig> {
    for dir in directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH) {
        if let Some(config) = try_load_config_from_path(&dir.join(CONFIG_FILE_NAME))? {
            return Ok(config);
        }
    }

    log::debug!(
        "No config found after checking {} directories. Using default config.",
        MAX_TRAVERSAL_DEPTH
    );
    Ok(QualityConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_and_validate_config(indoc! {r#"
            [style]
            max_line_length = 99

            [duplication]
            similarity_threshold = 0.9
        "#})
        .unwrap();
        assert_eq!(config.style.max_line_length, 99);
        assert_eq!(config.duplication.similarity_threshold, 0.9);
        assert_eq!(config.duplication.window_lines, 6);
        assert_eq!(config.complexity.moderate, 5);
        assert_eq!(config.weights.style, 30.0);
    }

    #[test]
    fn test_parse_rejects_bad_weights() {
        let result = parse_and_validate_config(indoc! {r#"
            [weights]
            style = 10.0
        "#});
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        let result = parse_and_validate_config("[style\nmax_line_length = ");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_directory_ancestors_limited() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }

    #[test]
    fn test_load_config_discovers_parent_file() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("pkg").join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[complexity]\nmoderate = 3\ncomplex = 8\n",
        )
        .unwrap();

        let config = load_config(&nested).unwrap();
        assert_eq!(config.complexity.moderate, 3);
        assert_eq!(config.complexity.complex, 8);
    }

    #[test]
    fn test_load_config_from_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = load_config_from(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(Error::FileSystem { .. })));
    }
}
