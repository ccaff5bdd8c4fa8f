use crate::core::{AnalysisResult, BatchReport, DuplicateBlock, Grade, ParseFailure};
use crate::style::count_by_rule;
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::io::Write;

const RULE_WIDTH: usize = 80;
const TOP_FUNCTIONS: usize = 5;
const MAX_LISTED: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// What was analyzed and when, shown alongside the results.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub target: String,
    /// A single file was given rather than a directory
    pub single_file: bool,
    pub generated_at: DateTime<Utc>,
}

impl ReportContext {
    pub fn new(target: impl Into<String>, single_file: bool) -> Self {
        Self {
            target: target.into(),
            single_file,
            generated_at: Utc::now(),
        }
    }
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &BatchReport, context: &ReportContext) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    context: &'a ReportContext,
    #[serde(flatten)]
    report: &'a BatchReport,
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &BatchReport, context: &ReportContext) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&JsonReport { context, report })?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TextWriter<W: Write> {
    writer: W,
}

impl<W: Write> TextWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for TextWriter<W> {
    fn write_report(&mut self, report: &BatchReport, context: &ReportContext) -> anyhow::Result<()> {
        self.write_header(context)?;

        match report.outcomes.as_slice() {
            [single] if context.single_file => match single.as_result() {
                Some(result) => self.write_unit(result)?,
                None => {
                    let failures: Vec<_> = report.failures().collect();
                    self.write_failures(&failures)?;
                }
            },
            _ => self.write_batch(report, context)?,
        }

        writeln!(self.writer)?;
        writeln!(self.writer, "{}", "=".repeat(RULE_WIDTH))?;
        Ok(())
    }
}

impl<W: Write> TextWriter<W> {
    fn write_header(&mut self, context: &ReportContext) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.writer, "{}", "CODE QUALITY ASSESSMENT REPORT".bold())?;
        writeln!(self.writer, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            self.writer,
            "Generated: {}",
            context.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_unit(&mut self, result: &AnalysisResult) -> anyhow::Result<()> {
        writeln!(self.writer, "File: {}", result.unit)?;
        writeln!(
            self.writer,
            "Overall Score: {}/100  Grade: {}",
            result.score.value,
            colored_grade(result.score.grade)
        )?;
        writeln!(self.writer, "{}", "-".repeat(RULE_WIDTH))?;

        writeln!(self.writer, "METRICS:")?;
        writeln!(self.writer, "  PEP 8 Compliance: {:.1}%", result.metrics.style_compliance)?;
        writeln!(self.writer, "  Average Complexity: {:.2}", result.complexity.average)?;
        writeln!(self.writer, "  Max Complexity: {}", result.complexity.max)?;
        writeln!(self.writer, "  Docstring Coverage: {:.1}%", result.metrics.docstring_coverage)?;
        writeln!(self.writer, "  Code Duplication: {:.1}%", result.metrics.duplication)?;
        writeln!(self.writer, "  Lines of Code: {}", result.line_count)?;
        writeln!(self.writer, "  Functions: {}", result.functions.len())?;
        writeln!(self.writer, "  Classes: {}", result.class_count)?;

        self.write_function_complexity(result)?;
        self.write_violations(result)?;
        self.write_duplicates(result.duplicates())?;

        writeln!(self.writer)?;
        writeln!(self.writer, "RECOMMENDATIONS:")?;
        for recommendation in &result.recommendations {
            writeln!(self.writer, "  • {recommendation}")?;
        }
        Ok(())
    }

    fn write_function_complexity(&mut self, result: &AnalysisResult) -> anyhow::Result<()> {
        if result.functions.is_empty() {
            return Ok(());
        }

        let mut ranked: Vec<_> = result.functions.iter().collect();
        ranked.sort_by(|a, b| b.complexity.cmp(&a.complexity).then(a.line.cmp(&b.line)));

        writeln!(self.writer)?;
        writeln!(self.writer, "FUNCTION COMPLEXITY:")?;
        for function in ranked.iter().take(TOP_FUNCTIONS) {
            writeln!(
                self.writer,
                "  {} (line {}): {} [{}]",
                function.qualified_name(),
                function.line,
                function.complexity,
                function.classification
            )?;
        }
        Ok(())
    }

    fn write_violations(&mut self, result: &AnalysisResult) -> anyhow::Result<()> {
        let violations = result.violations();
        if violations.is_empty() {
            return Ok(());
        }

        writeln!(self.writer)?;
        writeln!(self.writer, "STYLE VIOLATIONS ({}):", violations.len())?;
        let counts = count_by_rule(violations)
            .into_iter()
            .map(|(code, count)| format!("{code} x{count}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(self.writer, "  {counts}")?;
        for violation in violations.iter().take(MAX_LISTED) {
            writeln!(
                self.writer,
                "  {}:{} {} {}",
                violation.line,
                violation.column,
                violation.rule.code().yellow(),
                violation.message
            )?;
        }
        if violations.len() > MAX_LISTED {
            writeln!(self.writer, "  ... and {} more", violations.len() - MAX_LISTED)?;
        }
        Ok(())
    }

    fn write_duplicates(&mut self, blocks: &[DuplicateBlock]) -> anyhow::Result<()> {
        if blocks.is_empty() {
            return Ok(());
        }

        writeln!(self.writer)?;
        writeln!(self.writer, "DUPLICATE BLOCKS ({}):", blocks.len())?;
        for block in blocks.iter().take(MAX_LISTED) {
            writeln!(
                self.writer,
                "  {}:{}-{} ~ {}:{}-{} ({} lines, {:.0}% similar)",
                block.first.unit,
                block.first.start_line,
                block.first.end_line,
                block.second.unit,
                block.second.start_line,
                block.second.end_line,
                block.lines,
                block.similarity * 100.0
            )?;
        }
        if blocks.len() > MAX_LISTED {
            writeln!(self.writer, "  ... and {} more", blocks.len() - MAX_LISTED)?;
        }
        Ok(())
    }

    fn write_batch(&mut self, report: &BatchReport, context: &ReportContext) -> anyhow::Result<()> {
        let summary = &report.summary;
        writeln!(self.writer, "Directory: {}", context.target)?;
        writeln!(
            self.writer,
            "Files Analyzed: {} ({} failed)",
            summary.units_analyzed, summary.units_failed
        )?;
        match (summary.mean_score, summary.mean_grade) {
            (Some(score), Some(grade)) => writeln!(
                self.writer,
                "Average Score: {score:.2}/100  Grade: {}",
                colored_grade(grade)
            )?,
            _ => writeln!(self.writer, "Average Score: n/a")?,
        }
        let distribution = summary
            .grade_distribution
            .iter()
            .map(|(grade, count)| format!("{grade}: {count}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(self.writer, "Grade Distribution: {distribution}")?;
        writeln!(
            self.writer,
            "Functions: {}  Style Violations: {}  Duplicate Blocks: {}",
            summary.total_functions, summary.total_violations, summary.total_duplicates
        )?;
        writeln!(self.writer, "{}", "-".repeat(RULE_WIDTH))?;

        let mut ranked: Vec<&AnalysisResult> = report.results().collect();
        ranked.sort_by(|a, b| a.score.value.cmp(&b.score.value).then(a.unit.cmp(&b.unit)));

        writeln!(self.writer, "FILE RESULTS:")?;
        for result in ranked {
            writeln!(
                self.writer,
                "  {}: {}/100 ({})",
                result.unit,
                result.score.value,
                colored_grade_letter(result.score.grade)
            )?;
        }

        let failures: Vec<_> = report.failures().collect();
        self.write_failures(&failures)?;
        self.write_duplicates(&report.duplicates)?;
        Ok(())
    }

    fn write_failures(&mut self, failures: &[&ParseFailure]) -> anyhow::Result<()> {
        if failures.is_empty() {
            return Ok(());
        }

        writeln!(self.writer)?;
        writeln!(self.writer, "{}", format!("FAILURES ({}):", failures.len()).red())?;
        for failure in failures {
            writeln!(self.writer, "  {failure}")?;
        }
        Ok(())
    }
}

fn grade_color(grade: Grade, text: String) -> ColoredString {
    match grade {
        Grade::A => text.green().bold(),
        Grade::B => text.green(),
        Grade::C => text.yellow(),
        Grade::D => text.bright_red(),
        Grade::F => text.red().bold(),
    }
}

fn colored_grade(grade: Grade) -> ColoredString {
    grade_color(grade, format!("{grade} ({})", grade.label()))
}

fn colored_grade_letter(grade: Grade) -> ColoredString {
    grade_color(grade, grade.to_string())
}

/// One line for stderr after the report.
pub fn summary_line(report: &BatchReport, context: &ReportContext) -> String {
    let summary = &report.summary;
    match (summary.mean_score, summary.mean_grade) {
        (Some(score), Some(grade)) if context.single_file => {
            format!("Summary: {grade} ({}) ({score}/100)", grade.label())
        }
        (Some(score), Some(grade)) => format!(
            "Summary: {grade} ({}) ({score:.2}/100 average over {} file(s), {} failed)",
            grade.label(),
            summary.units_analyzed,
            summary.units_failed
        ),
        _ => format!("Summary: no file could be analyzed ({} failed)", summary.units_failed),
    }
}

pub fn create_writer<'a>(format: OutputFormat, writer: Box<dyn Write + 'a>) -> Box<dyn OutputWriter + 'a> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Text => Box::new(TextWriter::new(writer)),
    }
}
