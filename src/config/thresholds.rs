use crate::core::ComplexityClass;
use serde::{Deserialize, Serialize};

/// Classification bands for cyclomatic complexity.
///
/// `< moderate` is simple, `moderate..=complex` is moderate, anything above
/// `complex` is complex.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ComplexityThresholds {
    #[serde(default = "default_moderate")]
    pub moderate: u32,

    #[serde(default = "default_complex")]
    pub complex: u32,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            moderate: default_moderate(),
            complex: default_complex(),
        }
    }
}

impl ComplexityThresholds {
    pub fn classify(&self, complexity: u32) -> ComplexityClass {
        if complexity < self.moderate {
            ComplexityClass::Simple
        } else if complexity <= self.complex {
            ComplexityClass::Moderate
        } else {
            ComplexityClass::Complex
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.moderate == 0 || self.complex == 0 {
            return Err("complexity thresholds must be at least 1".to_string());
        }
        if self.moderate > self.complex {
            return Err(format!(
                "moderate complexity threshold ({}) exceeds complex threshold ({})",
                self.moderate, self.complex
            ));
        }
        Ok(())
    }
}

fn default_moderate() -> u32 {
    5
}
fn default_complex() -> u32 {
    10
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StyleConfig {
    /// 79 follows PEP 8; 99 is the common relaxed limit
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_line_length == 0 {
            return Err("max_line_length must be at least 1".to_string());
        }
        Ok(())
    }
}

fn default_max_line_length() -> usize {
    79
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DuplicationConfig {
    /// Near-duplicate cutoff for the sequence similarity ratio, in (0, 1]
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Normalized lines per comparison window
    #[serde(default = "default_window_lines")]
    pub window_lines: usize,

    /// Compare blocks across all units of a batch, not only within each unit
    #[serde(default = "default_cross_file")]
    pub cross_file: bool,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            window_lines: default_window_lines(),
            cross_file: default_cross_file(),
        }
    }
}

impl DuplicationConfig {
    pub fn validate(&self) -> Result<(), String> {
        let threshold = self.similarity_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            return Err(format!(
                "similarity_threshold must be in (0, 1], got {threshold}"
            ));
        }
        if self.window_lines < 2 {
            return Err(format!(
                "window_lines must be at least 2, got {}",
                self.window_lines
            ));
        }
        Ok(())
    }
}

fn default_similarity_threshold() -> f64 {
    0.8
}
fn default_window_lines() -> usize {
    6
}
fn default_cross_file() -> bool {
    true
}
