//! DynaGraph pipeline: sim file → minimization problem with intentional
//! constraints + agent command scenario.

use super::{input_file_name, read_input, Conversion, ConversionOutput};
use crate::models::{Config, ProblemDocument, Result, ScenarioDocument};
use crate::output::{DocumentKind, OutputWriter};
use crate::parse::parse_sim;
use crate::report::{ConversionStats, Reporter};
use crate::scenario::sim_events;
use std::path::Path;
use std::sync::Arc;

/// DynaGraph conversion pipeline.
pub struct SimPipeline {
    config: Config,
    reporter: Arc<dyn Reporter>,
}

impl SimPipeline {
    pub fn new(config: Config, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    /// Build both documents from sim file text.
    pub fn build(&self, text: &str, name: &str) -> Result<Conversion> {
        let problem = parse_sim(text)?;
        let events = sim_events(&problem.commands, &self.config.scenario);

        let stats = ConversionStats {
            decision_vars: problem.agents.len(),
            random_vars: 0,
            agents: problem.agents.len(),
            constraints: problem.constraints.len(),
            events: events.len(),
        };

        Ok(Conversion {
            problem: ProblemDocument::from_sim(name, &problem),
            scenario: ScenarioDocument::new(events),
            stats,
        })
    }

    /// Convert the file at `input`, writing into the configured output directory.
    pub fn run(&self, input: &Path, name: &str) -> Result<ConversionOutput> {
        let text = read_input(input)?;
        let conversion = self.build(&text, name)?;
        self.reporter.parsed(input, &conversion.stats);

        let writer = OutputWriter::new(&self.config.output.dir)?;
        let paths = writer.write_pair(
            &input_file_name(input),
            &conversion.problem,
            &conversion.scenario,
        )?;
        self.reporter.saved(DocumentKind::Problem, &paths.problem_path);
        self.reporter.saved(DocumentKind::Scenario, &paths.scenario_path);

        Ok(ConversionOutput {
            paths,
            stats: conversion.stats,
        })
    }
}
