//! Output documents consumed by the DCOP simulator.
//!
//! A run produces a problem document (domains, variables, constraints and the
//! stochastic tables or agents) and a scenario document (the event timeline).

use super::problem::{PdcopProblem, SimProblem, VariableKind};
use super::Result;
use crate::literal::Number;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Max,
    Min,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntry {
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<VariableKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub id: String,
}

/// Utility → `"a b | c d"` table of an extensional constraint.
///
/// Keys stay numeric in the YAML output, which a string-keyed map cannot express.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UtilityTable(pub Vec<(Number, String)>);

impl Serialize for UtilityTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (utility, assignments) in &self.0 {
            map.serialize_entry(utility, assignments)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConstraintEntry {
    Extensional {
        variables: Vec<String>,
        values: UtilityTable,
    },
    Intention {
        function: String,
        differentials: IndexMap<String, String>,
    },
}

/// The problem definition document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemDocument {
    pub name: String,
    pub objective: Objective,
    pub domains: IndexMap<String, DomainEntry>,
    pub variables: IndexMap<String, VariableEntry>,
    pub constraints: IndexMap<String, ConstraintEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_distributions: Option<IndexMap<String, Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_matrices: Option<IndexMap<String, Vec<Vec<f64>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<IndexMap<String, AgentEntry>>,
}

impl ProblemDocument {
    /// Build a maximization problem from a parsed PDCOP file.
    pub fn from_pdcop(name: &str, problem: &PdcopProblem) -> Self {
        let mut domains = IndexMap::new();
        let mut variables = IndexMap::new();
        for var in problem.variables() {
            let domain = format!("d_{}", var.name);
            domains.insert(
                domain.clone(),
                DomainEntry {
                    values: var.domain.clone(),
                },
            );
            variables.insert(
                var.name.clone(),
                VariableEntry {
                    domain,
                    kind: Some(var.kind),
                },
            );
        }

        let constraints = problem
            .constraints
            .iter()
            .map(|(id, constraint)| {
                let values = constraint
                    .table
                    .iter()
                    .map(|group| {
                        let rendered = group
                            .assignments
                            .iter()
                            .map(|[a, b]| format!("{a} {b}"))
                            .collect::<Vec<_>>()
                            .join(" | ");
                        (group.utility, rendered)
                    })
                    .collect();
                (
                    id.clone(),
                    ConstraintEntry::Extensional {
                        variables: constraint.variables.to_vec(),
                        values: UtilityTable(values),
                    },
                )
            })
            .collect();

        Self {
            name: name.to_string(),
            objective: Objective::Max,
            domains,
            variables,
            constraints,
            initial_distributions: Some(problem.initial_distributions.clone()),
            transition_matrices: Some(problem.transition_matrices.clone()),
            agents: None,
        }
    }

    /// Build a minimization problem from a parsed DynaGraph sim file.
    pub fn from_sim(name: &str, problem: &SimProblem) -> Self {
        let mut domains = IndexMap::new();
        let mut variables = IndexMap::new();
        let mut agents = IndexMap::new();
        for agent in &problem.agents {
            domains.insert(
                agent.domain_name(),
                DomainEntry {
                    values: agent.domain.clone(),
                },
            );
            variables.insert(
                agent.variable_name(),
                VariableEntry {
                    domain: agent.domain_name(),
                    kind: None,
                },
            );
            agents.insert(
                agent.agent_name(),
                AgentEntry {
                    id: agent.id.clone(),
                },
            );
        }

        let constraints = problem
            .constraints
            .iter()
            .enumerate()
            .map(|(i, q)| {
                (
                    format!("c{i}"),
                    ConstraintEntry::Intention {
                        function: q.function(),
                        differentials: q.differentials(),
                    },
                )
            })
            .collect();

        Self {
            name: name.to_string(),
            objective: Objective::Min,
            domains,
            variables,
            constraints,
            initial_distributions: None,
            transition_matrices: None,
            agents: Some(agents),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// The `name`, `objective`, `domains` and `variables` of a problem document,
/// read back from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProblemOutline {
    pub name: String,
    pub objective: Objective,
    pub domains: IndexMap<String, DomainEntry>,
    pub variables: IndexMap<String, VariableEntry>,
}

impl ProblemOutline {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// A single simulated change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    AddAgent { agent: String },
    RemoveAgent { agent: String },
    /// Resolve a random variable; the drawn value is left to the simulator.
    RandomVariableChange { variable: String },
}

/// A timeline entry: either a pause or a batch of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Event {
    Wait { id: String, delay: u64 },
    Action { id: String, actions: Vec<Action> },
}

impl Event {
    pub fn wait(id: impl Into<String>, delay: u64) -> Self {
        Event::Wait {
            id: id.into(),
            delay,
        }
    }

    pub fn action(id: impl Into<String>, action: Action) -> Self {
        Event::Action {
            id: id.into(),
            actions: vec![action],
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Event::Wait { id, .. } | Event::Action { id, .. } => id,
        }
    }

    pub fn delay(&self) -> Option<u64> {
        match self {
            Event::Wait { delay, .. } => Some(*delay),
            Event::Action { .. } => None,
        }
    }

    pub fn is_wait(&self) -> bool {
        matches!(self, Event::Wait { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    pub origin: String,
}

/// The scenario document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<ScenarioInputs>,
    pub events: Vec<Event>,
}

impl ScenarioDocument {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            inputs: None,
            events,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.inputs = Some(ScenarioInputs {
            origin: origin.into(),
        });
        self
    }

    /// Number of action events on the timeline.
    pub fn action_count(&self) -> usize {
        self.events.iter().filter(|e| !e.is_wait()).count()
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
