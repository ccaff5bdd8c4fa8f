use crate::config::{self, ConfigOverrides, QualityConfig};
use crate::core::BatchReport;
use crate::engine;
use crate::io::{
    self,
    output::{self, create_writer, ReportContext},
    walker::find_python_files,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: crate::cli::OutputFormat,
    pub output: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub fail_under: Option<f64>,
}

/// Result of a completed run, as far as the exit status is concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalyzeStatus {
    Passed,
    BelowThreshold { score: f64, threshold: f64 },
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<AnalyzeStatus> {
    if !config.path.exists() {
        anyhow::bail!("Path '{}' does not exist", config.path.display());
    }

    let quality = resolve_config(config.config_path.as_deref(), config.overrides)?;
    let single_file = config.path.is_file();

    let paths = if single_file {
        vec![config.path.clone()]
    } else {
        find_python_files(&config.path, &quality.ignore.patterns)?
    };
    if paths.is_empty() {
        anyhow::bail!("No Python files found in '{}'", config.path.display());
    }

    eprintln!("Analyzing: {}...", config.path.display());
    let report = analyze_paths(&paths, &config.path, &quality)?;

    let context = ReportContext::new(config.path.display().to_string(), single_file);
    write_report(&report, &context, config.format.into(), config.output.as_deref())?;
    eprintln!("{}", output::summary_line(&report, &context));

    Ok(check_fail_under(&report, config.fail_under))
}

/// Explicit file first, then the nearest `.pyqual.toml`, then defaults.
/// Command-line overrides are applied last and the result is validated.
pub fn resolve_config(explicit: Option<&Path>, overrides: ConfigOverrides) -> Result<QualityConfig> {
    let base = match explicit {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => config::load_config(&std::env::current_dir()?)?,
    };

    let resolved = base.with_overrides(overrides);
    resolved.validate().context("Invalid configuration")?;
    Ok(resolved)
}

/// Read and analyze the given files. Unreadable files show up as failed
/// units; they never abort the batch.
pub fn analyze_paths(paths: &[PathBuf], root: &Path, quality: &QualityConfig) -> Result<BatchReport> {
    let (units, failures) = io::load_sources(paths, root);
    let mut report = engine::analyze_batch(&units, quality)?;
    report.record_load_failures(failures);
    log::info!(
        "analyzed {} of {} file(s)",
        report.summary.units_analyzed,
        report.summary.units_total
    );
    Ok(report)
}

fn write_report(
    report: &BatchReport,
    context: &ReportContext,
    format: output::OutputFormat,
    path: Option<&Path>,
) -> Result<()> {
    match path {
        Some(path) => {
            colored::control::set_override(false);
            let mut buffer = Vec::new();
            create_writer(format, Box::new(&mut buffer)).write_report(report, context)?;
            let content = String::from_utf8(buffer).context("Report is not valid UTF-8")?;
            io::write_file(path, &content)
                .with_context(|| format!("Error saving report to: {}", path.display()))?;
            eprintln!("Report saved to: {}", path.display());
        }
        None => {
            if format == output::OutputFormat::Json {
                colored::control::set_override(false);
            }
            let stdout = std::io::stdout();
            create_writer(format, Box::new(stdout.lock())).write_report(report, context)?;
        }
    }
    Ok(())
}

fn check_fail_under(report: &BatchReport, threshold: Option<f64>) -> AnalyzeStatus {
    let Some(threshold) = threshold else {
        return AnalyzeStatus::Passed;
    };

    let score = report.summary.mean_score.unwrap_or(0.0);
    if score < threshold {
        AnalyzeStatus::BelowThreshold { score, threshold }
    } else {
        AnalyzeStatus::Passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceUnit;

    fn report(source: &str) -> BatchReport {
        engine::analyze_batch(&[SourceUnit::new("a.py", source)], &QualityConfig::default()).unwrap()
    }

    #[test]
    fn test_fail_under_compares_mean_score() {
        let clean = report("\"\"\"Doc.\"\"\"\n");
        assert_eq!(check_fail_under(&clean, None), AnalyzeStatus::Passed);
        assert_eq!(check_fail_under(&clean, Some(90.0)), AnalyzeStatus::Passed);
        assert_eq!(
            check_fail_under(&clean, Some(100.5)),
            AnalyzeStatus::BelowThreshold {
                score: 100.0,
                threshold: 100.5
            }
        );
    }

    #[test]
    fn test_nothing_analyzed_fails_any_threshold() {
        let broken = report("def (\n");
        assert_eq!(
            check_fail_under(&broken, Some(1.0)),
            AnalyzeStatus::BelowThreshold {
                score: 0.0,
                threshold: 1.0
            }
        );
    }

    #[test]
    fn test_overrides_are_validated() {
        let overrides = ConfigOverrides {
            similarity_threshold: Some(1.5),
            ..ConfigOverrides::default()
        };
        let dir = tempfile::TempDir::new().unwrap();
        let explicit = dir.path().join("pyqual.toml");
        std::fs::write(&explicit, "").unwrap();

        let error = resolve_config(Some(&explicit), overrides).unwrap_err();
        assert!(format!("{error:#}").contains("Invalid configuration"));
    }
}
