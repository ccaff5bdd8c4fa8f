//! Metric weights for the overall quality score

use serde::{Deserialize, Serialize};

/// Weight of each sub-metric, in percent. Must sum to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricWeights {
    #[serde(default = "default_style_weight")]
    pub style: f64,

    #[serde(default = "default_complexity_weight")]
    pub complexity: f64,

    #[serde(default = "default_docstrings_weight")]
    pub docstrings: f64,

    #[serde(default = "default_duplication_weight")]
    pub duplication: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            style: default_style_weight(),
            complexity: default_complexity_weight(),
            docstrings: default_docstrings_weight(),
            duplication: default_duplication_weight(),
        }
    }
}

impl MetricWeights {
    // Pure function: Check if a weight is in valid range
    pub fn is_valid_weight(weight: f64) -> bool {
        weight.is_finite() && (0.0..=100.0).contains(&weight)
    }

    pub fn validate_weight(weight: f64, name: &str) -> Result<(), String> {
        if Self::is_valid_weight(weight) {
            Ok(())
        } else {
            Err(format!("{name} weight must be between 0 and 100, got {weight}"))
        }
    }

    pub fn sum(&self) -> f64 {
        self.style + self.complexity + self.docstrings + self.duplication
    }

    /// Validate each weight and that they sum to 100 (with small tolerance)
    pub fn validate(&self) -> Result<(), String> {
        Self::validate_weight(self.style, "Style")?;
        Self::validate_weight(self.complexity, "Complexity")?;
        Self::validate_weight(self.docstrings, "Docstrings")?;
        Self::validate_weight(self.duplication, "Duplication")?;

        let sum = self.sum();
        if (sum - 100.0).abs() > 0.001 {
            return Err(format!("Metric weights must sum to 100, but sum to {sum:.3}"));
        }
        Ok(())
    }
}

pub fn default_style_weight() -> f64 {
    30.0
}

pub fn default_complexity_weight() -> f64 {
    30.0
}

pub fn default_docstrings_weight() -> f64 {
    25.0
}

pub fn default_duplication_weight() -> f64 {
    15.0
}
