use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# pyqual configuration

[complexity]
# cyclomatic complexity at which a function stops being simple
moderate = 5
# above this a function is complex
complex = 10

[style]
max_line_length = 79

[duplication]
# sequence similarity ratio in (0, 1] at which blocks count as duplicates
similarity_threshold = 0.8
# normalized code lines per comparison window
window_lines = 6
# also compare blocks across files of a directory scan
cross_file = true

[weights]
# percentages of the overall score; must sum to 100
style = 30
complexity = 30
docstrings = 25
duplication = 15

[ignore]
patterns = [
    "build/**",
    "dist/**",
    "*.egg-info/**",
]

[analysis]
parallel = true
"#;

pub fn init_config(force: bool) -> Result<()> {
    let path = init_config_in(&std::env::current_dir()?, force)?;
    println!("Created {} configuration file", path.display());
    Ok(())
}

/// Write the default configuration into `dir`, refusing to clobber an
/// existing file unless `force` is set.
pub fn init_config_in(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    log::info!("wrote {}", config_path.display());
    Ok(config_path)
}
