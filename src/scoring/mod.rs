//! Score aggregation: four sub-scores, one weighted integer, one grade.

mod recommendations;

pub use recommendations::{generate_recommendations, ALL_GOOD};

use crate::config::{ComplexityThresholds, MetricWeights};
use crate::core::errors::{Error, Result};
use crate::core::{ComplexitySummary, Grade, MetricSet, QualityScore};

/// Map the average cyclomatic complexity onto 0..=100, higher is better.
///
/// Piecewise linear: 100 down to an average of 1, falling to 90 at the
/// moderate threshold, 60 at the complex threshold and 0 at twice the
/// complex threshold.
pub fn complexity_score(summary: &ComplexitySummary, thresholds: &ComplexityThresholds) -> f64 {
    if summary.function_count == 0 {
        return 100.0;
    }

    let average = summary.average;
    let moderate = f64::from(thresholds.moderate);
    let complex = f64::from(thresholds.complex);

    let score = if average <= 1.0 {
        100.0
    } else if average < moderate {
        interpolate(average, 1.0, moderate, 100.0, 90.0)
    } else if average <= complex {
        interpolate(average, moderate, complex, 90.0, 60.0)
    } else if average < 2.0 * complex {
        interpolate(average, complex, 2.0 * complex, 60.0, 0.0)
    } else {
        0.0
    };
    score.clamp(0.0, 100.0)
}

fn interpolate(x: f64, from: f64, to: f64, high: f64, low: f64) -> f64 {
    if to <= from {
        return high;
    }
    high - (high - low) * (x - from) / (to - from)
}

fn check_percentage(value: f64, name: &str) -> Result<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invariant(format!(
            "{name} must be a percentage in [0, 100], got {value}"
        )))
    }
}

pub fn validate_metrics(metrics: &MetricSet) -> Result<()> {
    check_percentage(metrics.style_compliance, "style compliance")?;
    check_percentage(metrics.complexity_score, "complexity score")?;
    check_percentage(metrics.docstring_coverage, "docstring coverage")?;
    check_percentage(metrics.duplication, "duplication percentage")
}

/// Weighted sum of the sub-scores, rounded half away from zero.
pub fn aggregate(metrics: &MetricSet, weights: &MetricWeights) -> Result<QualityScore> {
    if let Err(error) = validate_metrics(metrics) {
        debug_assert!(false, "{error}");
        return Err(error);
    }

    let weighted = weights.style * metrics.style_compliance
        + weights.complexity * metrics.complexity_score
        + weights.docstrings * metrics.docstring_coverage
        + weights.duplication * (100.0 - metrics.duplication);
    let value = (weighted / 100.0).clamp(0.0, 100.0).round() as u8;

    Ok(QualityScore {
        value,
        grade: Grade::from_score(f64::from(value)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(average: f64) -> ComplexitySummary {
        ComplexitySummary {
            function_count: 1,
            average,
            max: average.ceil() as u32,
            complex_count: 0,
        }
    }

    fn metrics(style: f64, complexity: f64, docs: f64, duplication: f64) -> MetricSet {
        MetricSet {
            style_compliance: style,
            complexity_score: complexity,
            docstring_coverage: docs,
            duplication,
        }
    }

    #[test]
    fn test_complexity_score_anchor_points() {
        let thresholds = ComplexityThresholds::default();
        assert_eq!(complexity_score(&ComplexitySummary::default(), &thresholds), 100.0);
        assert_eq!(complexity_score(&summary(1.0), &thresholds), 100.0);
        assert_eq!(complexity_score(&summary(5.0), &thresholds), 90.0);
        assert_eq!(complexity_score(&summary(10.0), &thresholds), 60.0);
        assert_eq!(complexity_score(&summary(15.0), &thresholds), 30.0);
        assert_eq!(complexity_score(&summary(20.0), &thresholds), 0.0);
        assert_eq!(complexity_score(&summary(45.0), &thresholds), 0.0);
    }

    #[test]
    fn test_complexity_score_is_monotonic() {
        let thresholds = ComplexityThresholds::default();
        let mut previous = f64::INFINITY;
        for step in 0..=100 {
            let score = complexity_score(&summary(1.0 + step as f64 * 0.25), &thresholds);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_equal_thresholds_do_not_divide_by_zero() {
        let thresholds = ComplexityThresholds {
            moderate: 5,
            complex: 5,
        };
        assert_eq!(complexity_score(&summary(5.0), &thresholds), 90.0);
        assert!(complexity_score(&summary(6.0), &thresholds).is_finite());
    }

    #[test]
    fn test_perfect_metrics_score_100() {
        let score = aggregate(&metrics(100.0, 100.0, 100.0, 0.0), &MetricWeights::default()).unwrap();
        assert_eq!(score.value, 100);
        assert_eq!(score.grade, Grade::A);
    }

    #[test]
    fn test_worst_metrics_score_0() {
        let score = aggregate(&metrics(0.0, 0.0, 0.0, 100.0), &MetricWeights::default()).unwrap();
        assert_eq!(score.value, 0);
        assert_eq!(score.grade, Grade::F);
    }

    #[test]
    fn test_weighted_sum_rounds_half_away_from_zero() {
        // 0.3 * 85 + 0.3 * 90 + 0.25 * 50 + 0.15 * 100 = 80.0
        let score = aggregate(&metrics(85.0, 90.0, 50.0, 0.0), &MetricWeights::default()).unwrap();
        assert_eq!(score.value, 80);
        assert_eq!(score.grade, Grade::B);

        let half = MetricWeights {
            style: 50.0,
            complexity: 50.0,
            docstrings: 0.0,
            duplication: 0.0,
        };
        // 0.5 * 79 + 0.5 * 80 = 79.5
        let score = aggregate(&metrics(79.0, 80.0, 0.0, 0.0), &half).unwrap();
        assert_eq!(score.value, 80);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_out_of_range_metric_is_invariant_violation() {
        let result = aggregate(&metrics(120.0, 100.0, 100.0, 0.0), &MetricWeights::default());
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "style compliance")]
    fn test_out_of_range_metric_panics_in_debug() {
        let _ = aggregate(&metrics(120.0, 100.0, 100.0, 0.0), &MetricWeights::default());
    }

    #[test]
    fn test_validate_metrics_rejects_nan() {
        assert!(validate_metrics(&metrics(f64::NAN, 0.0, 0.0, 0.0)).is_err());
        assert!(validate_metrics(&metrics(50.0, 50.0, 50.0, -1.0)).is_err());
        assert!(validate_metrics(&metrics(0.0, 100.0, 100.0, 100.0)).is_ok());
    }
}
