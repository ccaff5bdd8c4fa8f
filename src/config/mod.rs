// Sub-modules
mod loader;
mod scoring;
mod thresholds;

pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
pub use scoring::{
    default_complexity_weight, default_docstrings_weight, default_duplication_weight,
    default_style_weight, MetricWeights,
};
pub use thresholds::{ComplexityThresholds, DuplicationConfig, StyleConfig};

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Everything the engine can be tuned with. Passed by reference into each
/// analysis call; nothing is held globally.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QualityConfig {
    #[serde(default)]
    pub complexity: ComplexityThresholds,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub duplication: DuplicationConfig,

    #[serde(default)]
    pub weights: MetricWeights,

    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IgnoreConfig {
    /// Glob patterns matched against paths during directory scans
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSettings {
    /// Analyze units of a batch on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

fn default_parallel() -> bool {
    true
}

/// Caller-supplied values that win over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_line_length: Option<usize>,
    pub moderate_complexity: Option<u32>,
    pub complex_complexity: Option<u32>,
    pub similarity_threshold: Option<f64>,
    pub window_lines: Option<usize>,
    pub cross_file: Option<bool>,
    pub weights: Option<MetricWeights>,
    pub parallel: Option<bool>,
    pub ignore_patterns: Vec<String>,
}

impl QualityConfig {
    /// Reject invalid thresholds or weights before any analysis starts.
    pub fn validate(&self) -> Result<()> {
        self.complexity
            .validate()
            .and_then(|_| self.style.validate())
            .and_then(|_| self.duplication.validate())
            .and_then(|_| self.weights.validate())
            .map_err(Error::Configuration)?;

        for pattern in &self.ignore.patterns {
            glob::Pattern::new(pattern).map_err(|e| {
                Error::configuration(format!("invalid ignore pattern '{pattern}': {e}"))
            })?;
        }
        Ok(())
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(length) = overrides.max_line_length {
            self.style.max_line_length = length;
        }
        if let Some(moderate) = overrides.moderate_complexity {
            self.complexity.moderate = moderate;
        }
        if let Some(complex) = overrides.complex_complexity {
            self.complexity.complex = complex;
        }
        if let Some(threshold) = overrides.similarity_threshold {
            self.duplication.similarity_threshold = threshold;
        }
        if let Some(window) = overrides.window_lines {
            self.duplication.window_lines = window;
        }
        if let Some(cross_file) = overrides.cross_file {
            self.duplication.cross_file = cross_file;
        }
        if let Some(weights) = overrides.weights {
            self.weights = weights;
        }
        if let Some(parallel) = overrides.parallel {
            self.analysis.parallel = parallel;
        }
        self.ignore.patterns.extend(overrides.ignore_patterns);
        self
    }
}
