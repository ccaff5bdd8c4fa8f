pub mod ast;
pub mod errors;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use errors::{Error, FailureKind, ParseFailure, Result};

/// One piece of Python source handed to the engine.
///
/// The caller owns it; analysis only borrows it for the duration of a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnit {
    id: String,
    text: String,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityClass {
    Simple,
    Moderate,
    Complex,
}

impl std::fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ComplexityClass::Simple => "simple",
            ComplexityClass::Moderate => "moderate",
            ComplexityClass::Complex => "complex",
        };
        write!(f, "{label}")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Function,
    Method,
    Nested,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionRecord {
    pub name: String,
    /// Enclosing class or function, if any
    pub parent: Option<String>,
    pub kind: FunctionKind,
    pub line: usize,
    pub end_line: usize,
    pub complexity: u32,
    pub classification: ComplexityClass,
    pub has_docstring: bool,
}

impl FunctionRecord {
    pub fn qualified_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{parent}.{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn length(&self) -> usize {
        self.end_line.saturating_sub(self.line) + 1
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ComplexitySummary {
    pub function_count: usize,
    pub average: f64,
    pub max: u32,
    pub complex_count: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleRule {
    LineTooLong,
    TrailingWhitespace,
    WhitespaceOnBlankLine,
    MixedIndentation,
    InconsistentIndentation,
    MissingBlankLines,
    MultipleImports,
    ImportNotAtTop,
    MultipleStatements,
    TrailingSemicolon,
    ClassNaming,
    FunctionNaming,
    UnusedImport,
}

impl StyleRule {
    /// pycodestyle / pep8-naming / pyflakes code of the rule.
    pub fn code(&self) -> &'static str {
        match self {
            StyleRule::LineTooLong => "E501",
            StyleRule::TrailingWhitespace => "W291",
            StyleRule::WhitespaceOnBlankLine => "W293",
            StyleRule::MixedIndentation => "E101",
            StyleRule::InconsistentIndentation => "W191",
            StyleRule::MissingBlankLines => "E302",
            StyleRule::MultipleImports => "E401",
            StyleRule::ImportNotAtTop => "E402",
            StyleRule::MultipleStatements => "E702",
            StyleRule::TrailingSemicolon => "E703",
            StyleRule::ClassNaming => "N801",
            StyleRule::FunctionNaming => "N802",
            StyleRule::UnusedImport => "F401",
        }
    }
}

impl std::fmt::Display for StyleRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StyleViolation {
    pub rule: StyleRule,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StyleReport {
    pub violations: Vec<StyleViolation>,
    pub checkable_lines: usize,
    /// Percentage in [0, 100]
    pub compliance: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DocstringReport {
    /// 0 for an empty module, 1 otherwise
    pub modules_total: usize,
    pub module_documented: bool,
    pub classes_total: usize,
    pub classes_documented: usize,
    pub functions_total: usize,
    pub functions_documented: usize,
    /// Percentage in [0, 100]
    pub coverage: f64,
}

impl DocstringReport {
    pub fn total_entities(&self) -> usize {
        self.modules_total + self.classes_total + self.functions_total
    }

    pub fn documented_entities(&self) -> usize {
        usize::from(self.module_documented) + self.classes_documented + self.functions_documented
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockLocation {
    pub unit: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Two spans judged near-identical. Each unordered pair appears once.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DuplicateBlock {
    pub first: BlockLocation,
    pub second: BlockLocation,
    /// Normalized code lines in the shorter span
    pub lines: usize,
    /// Ratio in [0, 1]; 1.0 for exact copies
    pub similarity: f64,
}

impl DuplicateBlock {
    pub fn involves(&self, unit: &str) -> bool {
        self.first.unit == unit || self.second.unit == unit
    }

    pub fn is_cross_unit(&self) -> bool {
        self.first.unit != self.second.unit
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DuplicationReport {
    pub blocks: Vec<DuplicateBlock>,
    pub duplicated_lines: usize,
    pub total_lines: usize,
    /// Percentage in [0, 100]
    pub percentage: f64,
}

/// The four inputs of the aggregator, each a percentage in [0, 100].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricSet {
    pub style_compliance: f64,
    /// Average complexity mapped onto 0..=100, higher is better
    pub complexity_score: f64,
    pub docstring_coverage: f64,
    /// Share of duplicated lines, lower is better
    pub duplication: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Lower edge of each band is inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::A => "Excellent",
            Grade::B => "Good",
            Grade::C => "Satisfactory",
            Grade::D => "Needs Improvement",
            Grade::F => "Poor",
        }
    }

    pub fn all() -> [Grade; 5] {
        [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F]
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{letter}")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityScore {
    /// Integer in [0, 100]
    pub value: u8,
    pub grade: Grade,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub unit: String,
    pub line_count: usize,
    pub class_count: usize,
    pub functions: Vec<FunctionRecord>,
    pub complexity: ComplexitySummary,
    pub style: StyleReport,
    pub docstrings: DocstringReport,
    pub duplication: DuplicationReport,
    pub metrics: MetricSet,
    pub score: QualityScore,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    pub fn violations(&self) -> &[StyleViolation] {
        &self.style.violations
    }

    pub fn duplicates(&self) -> &[DuplicateBlock] {
        &self.duplication.blocks
    }
}

/// Tagged per-unit result: batch processing never stops at a failure.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitOutcome {
    Analyzed(Box<AnalysisResult>),
    Failed(ParseFailure),
}

impl UnitOutcome {
    pub fn unit(&self) -> &str {
        match self {
            UnitOutcome::Analyzed(result) => &result.unit,
            UnitOutcome::Failed(failure) => &failure.unit,
        }
    }

    pub fn as_result(&self) -> Option<&AnalysisResult> {
        match self {
            UnitOutcome::Analyzed(result) => Some(result),
            UnitOutcome::Failed(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&ParseFailure> {
        match self {
            UnitOutcome::Analyzed(_) => None,
            UnitOutcome::Failed(failure) => Some(failure),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub units_total: usize,
    pub units_analyzed: usize,
    pub units_failed: usize,
    /// Mean over successful units only
    pub mean_score: Option<f64>,
    pub mean_grade: Option<Grade>,
    pub grade_distribution: BTreeMap<Grade, usize>,
    pub total_functions: usize,
    pub total_violations: usize,
    pub total_duplicates: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<UnitOutcome>,
    /// Every block found in the batch, each pair once
    pub duplicates: Vec<DuplicateBlock>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn results(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.outcomes.iter().filter_map(UnitOutcome::as_result)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ParseFailure> {
        self.outcomes.iter().filter_map(UnitOutcome::as_failure)
    }

    /// Merge in units the loader could not read, each at its input
    /// position. They count as failures only.
    pub fn record_load_failures(&mut self, failures: Vec<(usize, ParseFailure)>) {
        self.summary.units_total += failures.len();
        self.summary.units_failed += failures.len();

        let mut analyzed = std::mem::take(&mut self.outcomes).into_iter();
        let mut failures = failures.into_iter().peekable();
        let mut merged = Vec::with_capacity(analyzed.len() + failures.len());
        loop {
            let position = merged.len();
            if let Some((_, failure)) = failures.next_if(|(at, _)| *at <= position) {
                merged.push(UnitOutcome::Failed(failure));
            } else if let Some(outcome) = analyzed.next() {
                merged.push(outcome);
            } else if let Some((_, failure)) = failures.next() {
                merged.push(UnitOutcome::Failed(failure));
            } else {
                break;
            }
        }
        self.outcomes = merged;
    }
}
