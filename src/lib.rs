// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod core;
pub mod docstrings;
pub mod duplication;
pub mod engine;
pub mod io;
pub mod scoring;
pub mod style;

// Re-export commonly used types
pub use crate::core::{
    AnalysisResult, BatchReport, BatchSummary, ComplexityClass, DuplicateBlock, Error,
    FunctionRecord, Grade, MetricSet, ParseFailure, QualityScore, SourceUnit, StyleRule,
    StyleViolation, UnitOutcome,
};

pub use crate::config::QualityConfig;
pub use crate::engine::{analyze_batch, analyze_source, analyze_unit};
