//! Conversion pipelines.
//!
//! Each pipeline is a straight line: read → parse → build documents → write → report.

mod pdcop;
mod sim;

pub use pdcop::*;
pub use sim::*;

use crate::models::{ConvertError, ProblemDocument, Result, ScenarioDocument};
use crate::output::WrittenPair;
use crate::report::ConversionStats;
use std::path::Path;

/// Documents built from one input, not yet written.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub problem: ProblemDocument,
    pub scenario: ScenarioDocument,
    pub stats: ConversionStats,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub paths: WrittenPair,
    pub stats: ConversionStats,
}

pub(crate) fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ConvertError::io(format!("reading input {}", path.display()), e))
}

/// File name used for output files and the scenario origin, e.g. `instance_0.dzn`.
pub(crate) fn input_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string())
}

/// Default problem name: the file name without extension.
pub(crate) fn default_problem_name(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dcop".to_string())
}
