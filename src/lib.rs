//! dcop-yaml - Convert DCOP description files into simulator YAML.
//!
//! ## Inputs
//!
//! - **PDCOP `.dzn` files**: decision/random variables, extensional
//!   constraints, initial distributions and transition matrices
//! - **DynaGraph sim files**: agent domains, quadratic constraints and agent
//!   add/remove commands
//!
//! ## Pipelines
//!
//! - **Static PDCOP**: parse → problem document + opening-wait scenario
//! - **Dynamic PDCOP (D-DCOP)**: as static, plus a shuffled timeline resolving
//!   every random variable value
//! - **DynaGraph**: parse → intentional constraints with analytic partial
//!   derivatives + agent command timeline
//!
//! Every run writes `<input>.yaml` and `<input>-scenario.yaml` into the output
//! directory, or nothing at all if any clause fails to parse.

pub mod literal;
pub mod models;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod scenario;

// Re-exports for convenience
pub use literal::{parse_literal, Literal, Number};
pub use models::{Config, ConvertError, ProblemDocument, Result, ScenarioDocument};
pub use output::OutputWriter;
pub use pipeline::{make_rng, PdcopMode, PdcopPipeline, SimPipeline};
pub use report::{MemoryReporter, Reporter, TracingReporter};
