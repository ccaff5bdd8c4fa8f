//! Orchestration of the per-unit analyzers and the batch-level passes.
//!
//! A batch runs in two phases. Per-unit work (parsing, complexity, style,
//! docstrings, line normalization) is independent and may run on the rayon
//! pool. The duplication index is then filled by this thread alone and
//! queried once every unit has contributed, after which scores are final.

use crate::analyzers::parse_source;
use crate::complexity::{extract_functions, summarize};
use crate::config::QualityConfig;
use crate::core::errors::Result;
use crate::core::{
    AnalysisResult, BatchReport, BatchSummary, ComplexitySummary, DocstringReport, DuplicateBlock,
    DuplicationReport, FunctionRecord, Grade, MetricSet, SourceUnit, StyleReport, UnitOutcome,
};
use crate::docstrings::check_docstrings;
use crate::duplication::{normalize_source, DuplicationIndex, NormalizedLine};
use crate::scoring::{aggregate, complexity_score, generate_recommendations};
use crate::style::check_style;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Everything about a unit that does not depend on other units.
#[derive(Debug)]
struct UnitAnalysis {
    functions: Vec<FunctionRecord>,
    complexity: ComplexitySummary,
    style: StyleReport,
    docstrings: DocstringReport,
    normalized: Vec<NormalizedLine>,
}

fn analyze_unit_locally(unit: &SourceUnit, config: &QualityConfig) -> Result<UnitAnalysis> {
    log::debug!("analyzing {}", unit.id());
    let tree = parse_source(unit)?;

    let functions = extract_functions(&tree, &config.complexity);
    let complexity = summarize(&functions);
    let style = check_style(&tree, &config.style);
    let docstrings = check_docstrings(&tree);

    Ok(UnitAnalysis {
        functions,
        complexity,
        style,
        docstrings,
        normalized: normalize_source(unit.text()),
    })
}

fn finish_unit(
    unit: &SourceUnit,
    analysis: UnitAnalysis,
    duplication: DuplicationReport,
    config: &QualityConfig,
) -> Result<AnalysisResult> {
    let metrics = MetricSet {
        style_compliance: analysis.style.compliance,
        complexity_score: complexity_score(&analysis.complexity, &config.complexity),
        docstring_coverage: analysis.docstrings.coverage,
        duplication: duplication.percentage,
    };
    let score = aggregate(&metrics, &config.weights)?;
    let recommendations = generate_recommendations(&metrics, &analysis.complexity);

    log::debug!("{}: score {} ({})", unit.id(), score.value, score.grade);

    Ok(AnalysisResult {
        unit: unit.id().to_string(),
        line_count: unit.line_count(),
        class_count: analysis.docstrings.classes_total,
        functions: analysis.functions,
        complexity: analysis.complexity,
        style: analysis.style,
        docstrings: analysis.docstrings,
        duplication,
        metrics,
        score,
        recommendations,
    })
}

/// Analyze one unit on its own. Duplication is only looked for inside it.
///
/// Fails with a [`ParseFailure`](crate::core::ParseFailure) for invalid
/// Python and with a configuration error before doing any work when the
/// configuration is invalid.
pub fn analyze_source(unit: &SourceUnit, config: &QualityConfig) -> Result<AnalysisResult> {
    config.validate()?;
    let mut analysis = analyze_unit_locally(unit, config)?;
    let duplication = detect_normalized(unit.id(), std::mem::take(&mut analysis.normalized), config);
    finish_unit(unit, analysis, duplication, config)
}

/// Same as [`analyze_source`] with unit-local errors folded into the outcome.
pub fn analyze_unit(unit: &SourceUnit, config: &QualityConfig) -> Result<UnitOutcome> {
    into_outcome(unit, analyze_source(unit, config))
}

fn into_outcome(unit: &SourceUnit, analyzed: Result<AnalysisResult>) -> Result<UnitOutcome> {
    match analyzed {
        Ok(result) => Ok(UnitOutcome::Analyzed(Box::new(result))),
        Err(error) if error.is_unit_local() => {
            let failure = error.into_failure(unit.id());
            log::warn!("{failure}");
            Ok(UnitOutcome::Failed(failure))
        }
        Err(error) => Err(error),
    }
}

fn detect_normalized(unit_id: &str, lines: Vec<NormalizedLine>, config: &QualityConfig) -> DuplicationReport {
    let mut index = DuplicationIndex::new(&config.duplication);
    let slot = index.insert(unit_id, lines);
    index.find_duplicates(false).report_for(slot)
}

/// Analyze a collection of units. One unit failing never stops the others;
/// outcomes come back in input order.
pub fn analyze_batch(units: &[SourceUnit], config: &QualityConfig) -> Result<BatchReport> {
    config.validate()?;
    let parallel = config.analysis.parallel;
    log::info!(
        "analyzing {} unit(s){}",
        units.len(),
        if parallel { " in parallel" } else { "" }
    );

    let local: Vec<Result<UnitAnalysis>> = if parallel {
        units
            .par_iter()
            .map(|unit| analyze_unit_locally(unit, config))
            .collect()
    } else {
        units
            .iter()
            .map(|unit| analyze_unit_locally(unit, config))
            .collect()
    };

    let (local, reports, duplicates) = if config.duplication.cross_file {
        cross_unit_duplication(units, local, config)
    } else {
        per_unit_duplication(units, local, config)
    };

    let outcomes: Vec<UnitOutcome> = units
        .iter()
        .zip(local)
        .zip(reports)
        .map(|((unit, analysis), report)| {
            let analyzed = analysis
                .and_then(|analysis| finish_unit(unit, analysis, report.unwrap_or_default(), config));
            into_outcome(unit, analyzed)
        })
        .collect::<Result<_>>()?;

    let summary = summarize_batch(&outcomes, &duplicates);
    Ok(BatchReport {
        outcomes,
        duplicates,
        summary,
    })
}

type DuplicationPass = (
    Vec<Result<UnitAnalysis>>,
    Vec<Option<DuplicationReport>>,
    Vec<DuplicateBlock>,
);

fn cross_unit_duplication(
    units: &[SourceUnit],
    mut local: Vec<Result<UnitAnalysis>>,
    config: &QualityConfig,
) -> DuplicationPass {
    let mut index = DuplicationIndex::new(&config.duplication);
    let slots: Vec<Option<usize>> = units
        .iter()
        .zip(local.iter_mut())
        .map(|(unit, analysis)| {
            analysis
                .as_mut()
                .ok()
                .map(|analysis| index.insert(unit.id(), std::mem::take(&mut analysis.normalized)))
        })
        .collect();

    let findings = index.find_duplicates(config.analysis.parallel);
    let reports = slots
        .into_iter()
        .map(|slot| slot.map(|slot| findings.report_for(slot)))
        .collect();
    let duplicates = findings.blocks().cloned().collect();

    (local, reports, duplicates)
}

fn per_unit_duplication(
    units: &[SourceUnit],
    mut local: Vec<Result<UnitAnalysis>>,
    config: &QualityConfig,
) -> DuplicationPass {
    let reports: Vec<Option<DuplicationReport>> = units
        .iter()
        .zip(local.iter_mut())
        .map(|(unit, analysis)| {
            analysis.as_mut().ok().map(|analysis| {
                detect_normalized(unit.id(), std::mem::take(&mut analysis.normalized), config)
            })
        })
        .collect();
    let duplicates = reports
        .iter()
        .flatten()
        .flat_map(|report| report.blocks.iter().cloned())
        .collect();

    (local, reports, duplicates)
}

/// Aggregate statistics over a batch. Scores are averaged over analyzed
/// units only.
pub fn summarize_batch(outcomes: &[UnitOutcome], duplicates: &[DuplicateBlock]) -> BatchSummary {
    let results: Vec<&AnalysisResult> = outcomes.iter().filter_map(UnitOutcome::as_result).collect();

    let mut grade_distribution: BTreeMap<Grade, usize> =
        Grade::all().into_iter().map(|grade| (grade, 0)).collect();
    for result in &results {
        *grade_distribution.entry(result.score.grade).or_insert(0) += 1;
    }

    let mean_score = (!results.is_empty()).then(|| {
        let total: f64 = results.iter().map(|r| f64::from(r.score.value)).sum();
        (total / results.len() as f64 * 100.0).round() / 100.0
    });

    BatchSummary {
        units_total: outcomes.len(),
        units_analyzed: results.len(),
        units_failed: outcomes.len() - results.len(),
        mean_score,
        mean_grade: mean_score.map(Grade::from_score),
        grade_distribution,
        total_functions: results.iter().map(|r| r.functions.len()).sum(),
        total_violations: results.iter().map(|r| r.style.violations.len()).sum(),
        total_duplicates: duplicates.len(),
    }
}
