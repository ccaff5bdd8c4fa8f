//! Command-line surface and process setup.

pub mod setup;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pyqual")]
#[command(about = "Python code quality analyzer: style, complexity, docstrings and duplication", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a Python file or every Python file under a directory
    Analyze {
        /// File or directory to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to the nearest .pyqual.toml)
        #[arg(short, long, env = "PYQUAL_CONFIG")]
        config: Option<PathBuf>,

        /// Maximum physical line length
        #[arg(long = "max-line-length")]
        max_line_length: Option<usize>,

        /// Complexity at which a function stops being simple
        #[arg(long = "moderate-complexity")]
        moderate_complexity: Option<u32>,

        /// Complexity above which a function is complex
        #[arg(long = "complex-complexity")]
        complex_complexity: Option<u32>,

        /// Similarity ratio at which two blocks count as duplicates (0, 1]
        #[arg(long = "similarity")]
        similarity_threshold: Option<f64>,

        /// Normalized lines per duplication window
        #[arg(long = "window")]
        window_lines: Option<usize>,

        /// Only look for duplication inside each file
        #[arg(long = "no-cross-file")]
        no_cross_file: bool,

        /// Analyze files one at a time
        #[arg(long = "no-parallel")]
        no_parallel: bool,

        /// Number of worker threads (defaults to the number of CPUs)
        #[arg(short = 'j', long = "jobs")]
        jobs: Option<usize>,

        /// Additional glob patterns to skip during directory scans
        #[arg(long = "ignore", value_delimiter = ',')]
        ignore: Vec<String>,

        /// Exit with a non-zero status when the (mean) score is below this
        #[arg(long = "fail-under")]
        fail_under: Option<f64>,

        /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
        /// -v: progress information
        /// -vv: per-file details
        /// -vvv: everything
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    pub fn verbosity(&self) -> u8 {
        match self {
            Commands::Analyze { verbosity, .. } => *verbosity,
            Commands::Init { .. } => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Text => crate::io::output::OutputFormat::Text,
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_flags_parse() {
        let cli = Cli::parse_from([
            "pyqual",
            "analyze",
            "src",
            "--format",
            "json",
            "--similarity",
            "0.9",
            "--ignore",
            "tests/*,build/*",
            "--no-cross-file",
            "-vv",
        ]);
        match cli.command {
            Commands::Analyze {
                path,
                format,
                similarity_threshold,
                ignore,
                no_cross_file,
                verbosity,
                ..
            } => {
                assert_eq!(path, PathBuf::from("src"));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(similarity_threshold, Some(0.9));
                assert_eq!(ignore, vec!["tests/*".to_string(), "build/*".to_string()]);
                assert!(no_cross_file);
                assert_eq!(verbosity, 2);
            }
            Commands::Init { .. } => panic!("expected analyze"),
        }
    }
}
