//! Core data models for dcop-yaml.
//!
//! - `problem`: records assembled by the parsers
//! - `document`: YAML documents written for the simulator
//! - `config` / `error`: run configuration and the error taxonomy

mod config;
mod document;
mod error;
mod problem;

pub use config::*;
pub use document::*;
pub use error::*;
pub use problem::*;
