//! CLI command implementations.
//!
//! - **analyze**: score a Python file or directory and write the report
//! - **init**: write a default `.pyqual.toml`

pub mod analyze;
pub mod init;

pub use analyze::{handle_analyze, AnalyzeConfig, AnalyzeStatus};
pub use init::init_config;
