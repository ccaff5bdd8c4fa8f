use anyhow::Result;
use clap::Parser;
use pyqual::cli::{setup, Cli, Commands};
use pyqual::commands::{self, AnalyzeConfig, AnalyzeStatus};
use pyqual::config::ConfigOverrides;
use std::process::ExitCode;

/// Exit status when `--fail-under` is not met
const EXIT_BELOW_THRESHOLD: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup::init_logging(cli.command.verbosity());

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Analyze {
            path,
            format,
            output,
            config,
            max_line_length,
            moderate_complexity,
            complex_complexity,
            similarity_threshold,
            window_lines,
            no_cross_file,
            no_parallel,
            jobs,
            ignore,
            fail_under,
            verbosity: _,
        } => {
            setup::configure_thread_pool(jobs.unwrap_or(0));

            let overrides = ConfigOverrides {
                max_line_length,
                moderate_complexity,
                complex_complexity,
                similarity_threshold,
                window_lines,
                cross_file: no_cross_file.then_some(false),
                weights: None,
                parallel: no_parallel.then_some(false),
                ignore_patterns: ignore,
            };

            let status = commands::handle_analyze(AnalyzeConfig {
                path,
                format,
                output,
                config_path: config,
                overrides,
                fail_under,
            })?;
            Ok(exit_code(status))
        }
        Commands::Init { force } => {
            commands::init_config(force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(status: AnalyzeStatus) -> ExitCode {
    match status {
        AnalyzeStatus::Passed => ExitCode::SUCCESS,
        AnalyzeStatus::BelowThreshold { score, threshold } => {
            eprintln!("Score {score:.2} is below the required {threshold:.2}");
            ExitCode::from(EXIT_BELOW_THRESHOLD)
        }
    }
}
