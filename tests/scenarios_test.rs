//! End-to-end behavior of the engine on small, fully understood inputs.

mod common;

use common::{module_with_shared_body, BRANCHY_MODULE, BROKEN_MODULE, CLEAN_MODULE};
use pretty_assertions::assert_eq;
use pyqual::core::FailureKind;
use pyqual::{
    analyze_batch, analyze_source, analyze_unit, ComplexityClass, Grade, QualityConfig, SourceUnit,
    UnitOutcome,
};

#[test]
fn test_clean_module_scores_100() {
    let unit = SourceUnit::new("greet.py", CLEAN_MODULE);
    let result = analyze_source(&unit, &QualityConfig::default()).unwrap();

    assert_eq!(result.functions.len(), 1);
    assert_eq!(result.functions[0].complexity, 1);
    assert_eq!(result.functions[0].classification, ComplexityClass::Simple);
    assert_eq!(result.docstrings.coverage, 100.0);
    assert_eq!(result.style.compliance, 100.0);
    assert!(result.violations().is_empty());
    assert_eq!(result.duplication.percentage, 0.0);
    assert!(result.duplicates().is_empty());
    assert_eq!(result.score.value, 100);
    assert_eq!(result.score.grade, Grade::A);
    assert_eq!(
        result.recommendations,
        vec!["Code quality is good! Keep up the good work.".to_string()]
    );
}

#[test]
fn test_branchy_undocumented_function_scores_lower() {
    let config = QualityConfig::default();
    let clean = analyze_source(&SourceUnit::new("greet.py", CLEAN_MODULE), &config).unwrap();
    let branchy = analyze_source(&SourceUnit::new("classify.py", BRANCHY_MODULE), &config).unwrap();

    let function = &branchy.functions[0];
    assert_eq!(function.name, "classify");
    assert_eq!(function.complexity, 7);
    assert_eq!(function.classification, ComplexityClass::Moderate);
    assert!(!function.has_docstring);
    assert_eq!(branchy.docstrings.functions_documented, 0);
    assert_eq!(branchy.docstrings.coverage, 0.0);
    assert!(branchy.score.value < clean.score.value);
}

#[test]
fn test_one_broken_file_in_a_batch_of_three() {
    let units = vec![
        SourceUnit::new("greet.py", CLEAN_MODULE),
        SourceUnit::new("broken.py", BROKEN_MODULE),
        SourceUnit::new("classify.py", BRANCHY_MODULE),
    ];
    let report = analyze_batch(&units, &QualityConfig::default()).unwrap();

    assert_eq!(report.outcomes.len(), 3);
    let order: Vec<&str> = report.outcomes.iter().map(UnitOutcome::unit).collect();
    assert_eq!(order, vec!["greet.py", "broken.py", "classify.py"]);

    let failure = report.outcomes[1].as_failure().expect("broken.py should fail");
    assert_eq!(failure.kind, FailureKind::Syntax);
    assert_eq!(failure.unit, "broken.py");
    assert!(failure.line >= 1 && failure.column >= 1, "failure at {failure}");

    let successes: Vec<f64> = report.results().map(|r| f64::from(r.score.value)).collect();
    assert_eq!(successes.len(), 2);
    let expected_mean = ((successes[0] + successes[1]) / 2.0 * 100.0).round() / 100.0;

    let summary = &report.summary;
    assert_eq!(summary.units_total, 3);
    assert_eq!(summary.units_analyzed, 2);
    assert_eq!(summary.units_failed, 1);
    assert_eq!(summary.mean_score, Some(expected_mean));
    assert_eq!(summary.grade_distribution.values().sum::<usize>(), 2);
}

#[test]
fn test_identical_bodies_in_two_files_form_one_block() {
    let units = vec![
        SourceUnit::new("first.py", module_with_shared_body("first")),
        SourceUnit::new("second.py", module_with_shared_body("second")),
    ];
    let report = analyze_batch(&units, &QualityConfig::default()).unwrap();

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.summary.total_duplicates, 1);
    let block = &report.duplicates[0];
    assert_eq!(block.first.unit, "first.py");
    assert_eq!(block.second.unit, "second.py");
    assert!(block.lines >= 10);

    for result in report.results() {
        assert_eq!(result.duplicates(), std::slice::from_ref(block));
        assert!(result.duplication.percentage > 0.0);
    }
}

#[test]
fn test_cross_file_can_be_disabled() {
    let units = vec![
        SourceUnit::new("first.py", module_with_shared_body("first")),
        SourceUnit::new("second.py", module_with_shared_body("second")),
    ];
    let mut config = QualityConfig::default();
    config.duplication.cross_file = false;

    let report = analyze_batch(&units, &config).unwrap();
    assert!(report.duplicates.is_empty());
    assert!(report.results().all(|r| r.duplication.percentage == 0.0));
}

#[test]
fn test_copy_edited_on_every_line_is_still_found() {
    let totals = |factor: &str| -> String {
        (0..8)
            .map(|i| format!("total_{i} = {factor} * {i} + offset - 1\n"))
            .collect()
    };
    let units = vec![
        SourceUnit::new("alpha.py", totals("alpha")),
        SourceUnit::new("beta.py", totals("beta")),
    ];
    let report = analyze_batch(&units, &QualityConfig::default()).unwrap();

    assert_eq!(report.duplicates.len(), 1);
    let block = &report.duplicates[0];
    assert_eq!((block.first.start_line, block.first.end_line), (1, 8));
    assert_eq!((block.second.start_line, block.second.end_line), (1, 8));
    assert!(block.similarity >= 0.8 && block.similarity < 1.0);
    assert!(report.results().all(|r| r.duplication.percentage == 100.0));
}

#[test]
fn test_three_copies_in_one_file_pair_up() {
    let copy = module_with_shared_body("handle");
    let source = format!("{copy}first_marker = 1\n{copy}second_marker = 2\n{copy}");
    let result = analyze_source(&SourceUnit::new("copies.py", source), &QualityConfig::default()).unwrap();

    let spans: Vec<_> = result
        .duplicates()
        .iter()
        .map(|block| {
            (
                (block.first.start_line, block.first.end_line),
                (block.second.start_line, block.second.end_line),
                block.similarity,
            )
        })
        .collect();
    assert_eq!(
        spans,
        vec![
            ((1, 11), (13, 23), 1.0),
            ((1, 11), (25, 35), 1.0),
            ((13, 23), (25, 35), 1.0),
        ]
    );
}

#[test]
fn test_analyzing_twice_is_identical() {
    let config = QualityConfig::default();
    for source in [CLEAN_MODULE, BRANCHY_MODULE] {
        let unit = SourceUnit::new("m.py", source);
        assert_eq!(
            analyze_source(&unit, &config).unwrap(),
            analyze_source(&unit, &config).unwrap()
        );
    }
}

#[test]
fn test_invalid_configuration_stops_before_analysis() {
    let mut config = QualityConfig::default();
    config.weights.style = 90.0;
    let unit = SourceUnit::new("greet.py", CLEAN_MODULE);

    assert!(matches!(
        analyze_source(&unit, &config),
        Err(pyqual::Error::Configuration(_))
    ));
    assert!(analyze_unit(&unit, &config).is_err());
    assert!(analyze_batch(&[unit], &config).is_err());
}

#[test]
fn test_empty_source_is_analyzable() {
    let result = analyze_source(&SourceUnit::new("empty.py", ""), &QualityConfig::default()).unwrap();
    assert_eq!(result.docstrings.coverage, 100.0);
    assert_eq!(result.score.value, 100);
    assert_eq!(result.line_count, 0);
}
