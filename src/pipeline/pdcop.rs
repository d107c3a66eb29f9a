//! PDCOP pipeline: `.dzn` file → maximization problem + scenario.
//!
//! Static runs emit a scenario holding only the opening wait. Dynamic runs
//! (D-DCOP) also schedule every random-variable resolution in shuffled order.

use super::{default_problem_name, input_file_name, read_input, Conversion, ConversionOutput};
use crate::models::{Config, ProblemDocument, Result, ScenarioDocument};
use crate::output::{DocumentKind, OutputWriter};
use crate::parse::parse_pdcop;
use crate::report::{ConversionStats, Reporter};
use crate::scenario::{ddcop_events, static_events};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Arc;

/// Whether random variables get a resolution timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdcopMode {
    Static,
    Dynamic,
}

/// Shuffle source: seeded when a seed is given, system entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// PDCOP conversion pipeline.
pub struct PdcopPipeline {
    config: Config,
    reporter: Arc<dyn Reporter>,
}

impl PdcopPipeline {
    pub fn new(config: Config, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    /// Build both documents from `.dzn` text.
    pub fn build<R: Rng + ?Sized>(
        &self,
        text: &str,
        name: &str,
        origin: &str,
        mode: PdcopMode,
        rng: &mut R,
    ) -> Result<Conversion> {
        let problem = parse_pdcop(text)?;

        let events = match mode {
            PdcopMode::Static => static_events(&self.config.scenario),
            PdcopMode::Dynamic => ddcop_events(&problem.random_vars, rng, &self.config.scenario),
        };

        let stats = ConversionStats {
            decision_vars: problem.decision_vars.len(),
            random_vars: problem.random_vars.len(),
            agents: 0,
            constraints: problem.constraints.len(),
            events: events.len(),
        };

        Ok(Conversion {
            problem: ProblemDocument::from_pdcop(name, &problem),
            scenario: ScenarioDocument::new(events).with_origin(origin),
            stats,
        })
    }

    /// Convert the file at `input`, writing into the configured output directory.
    ///
    /// `name` defaults to the input file stem.
    pub fn run<R: Rng + ?Sized>(
        &self,
        input: &Path,
        name: Option<&str>,
        mode: PdcopMode,
        rng: &mut R,
    ) -> Result<ConversionOutput> {
        let text = read_input(input)?;
        let file_name = input_file_name(input);
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| default_problem_name(input));

        let conversion = self.build(&text, &name, &file_name, mode, rng)?;
        self.reporter.parsed(input, &conversion.stats);

        let writer = OutputWriter::new(&self.config.output.dir)?;
        let paths = writer.write_pair(&file_name, &conversion.problem, &conversion.scenario)?;
        self.reporter.saved(DocumentKind::Problem, &paths.problem_path);
        self.reporter.saved(DocumentKind::Scenario, &paths.scenario_path);

        Ok(ConversionOutput {
            paths,
            stats: conversion.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConvertError, Event, ProblemOutline};
    use crate::report::MemoryReporter;
    use std::fs;
    use tempfile::TempDir;

    const INSTANCE: &str = "\
decision_x1 = (0, 1);
decision_x2 = (0, 1);
random_y1 = (0, 2);
random_y2 = (1, 2);
constraint_x1_y1 = [| 0, 0, 4 | 0, 1, 2 | 1, 2, 4 |];
constraint_x2_y2 = [| 1, 1, 3 |];
initial_distribution_y1 = [0.3, 0.3, 0.4];
initial_distribution_y2 = [0.5, 0.5];
transition_y1 = [| 0.8, 0.1, 0.1 | 0.1, 0.8, 0.1 | 0.1, 0.1, 0.8 |];
transition_y2 = [| 0.6, 0.4 | 0.4, 0.6 |];
";

    fn pipeline(dir: &Path) -> (PdcopPipeline, Arc<MemoryReporter>) {
        let mut config = Config::default();
        config.output.dir = dir.join("yaml-files");
        let reporter = Arc::new(MemoryReporter::new());
        (PdcopPipeline::new(config, reporter.clone()), reporter)
    }

    #[test]
    fn test_static_build() {
        let temp_dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(temp_dir.path());
        let conversion = pipeline
            .build(INSTANCE, "meeting", "inst.dzn", PdcopMode::Static, &mut make_rng(Some(1)))
            .unwrap();

        assert_eq!(conversion.scenario.events, vec![Event::wait("w0", 1)]);
        assert_eq!(conversion.stats.decision_vars, 2);
        assert_eq!(conversion.stats.random_vars, 2);
        assert_eq!(conversion.stats.constraints, 2);
        assert_eq!(conversion.problem.variables.len(), 4);
    }

    #[test]
    fn test_dynamic_build_schedules_every_value() {
        let temp_dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(temp_dir.path());
        let conversion = pipeline
            .build(INSTANCE, "meeting", "inst.dzn", PdcopMode::Dynamic, &mut make_rng(Some(5)))
            .unwrap();

        // y1 has 3 values, y2 has 2
        assert_eq!(conversion.scenario.action_count(), 5);
        assert_eq!(conversion.stats.events, 11);
        assert_eq!(
            conversion.scenario.inputs.as_ref().map(|i| i.origin.as_str()),
            Some("inst.dzn")
        );
    }

    #[test]
    fn test_run_writes_and_reports() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("instance_0.dzn");
        fs::write(&input, INSTANCE).unwrap();
        let (pipeline, reporter) = pipeline(temp_dir.path());

        let output = pipeline
            .run(&input, None, PdcopMode::Dynamic, &mut make_rng(Some(9)))
            .unwrap();

        let out_dir = temp_dir.path().join("yaml-files");
        assert_eq!(output.paths.problem_path, out_dir.join("instance_0.dzn.yaml"));
        assert_eq!(
            output.paths.scenario_path,
            out_dir.join("instance_0.dzn-scenario.yaml")
        );

        let outline =
            ProblemOutline::from_yaml(&fs::read_to_string(&output.paths.problem_path).unwrap())
                .unwrap();
        assert_eq!(outline.name, "instance_0");
        assert_eq!(outline.domains["d_y1"].values, vec![0, 1, 2]);
        assert_eq!(outline.variables["x2"].domain, "d_x2");

        let messages = reporter.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("parsed "));
        assert!(messages[1].ends_with("instance_0.dzn.yaml"));
        assert!(messages[2].ends_with("instance_0.dzn-scenario.yaml"));
    }

    #[test]
    fn test_parse_failure_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.dzn");
        fs::write(&input, "decision_x1 = (0, 1);\nrandom_y1 (0, 2);\n").unwrap();
        let (pipeline, reporter) = pipeline(temp_dir.path());

        let err = pipeline
            .run(&input, Some("broken"), PdcopMode::Static, &mut make_rng(Some(0)))
            .unwrap_err();
        assert!(matches!(err, ConvertError::MalformedClause { .. }));
        assert_eq!(err.clause(), Some("random_y1 (0, 2)"));
        assert!(!temp_dir.path().join("yaml-files").exists());
        assert!(reporter.messages().is_empty());
    }
}
