//! Parsed problem records.
//!
//! These are built in a single parse pass and handed wholesale to the
//! document builders; nothing mutates them afterwards.

use crate::literal::Number;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Whether a variable is chosen by agents or resolved by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Decision,
    Random,
}

/// Largest domain a variable clause may expand to.
pub const MAX_DOMAIN_SIZE: u64 = 1_000_000;

/// A variable with an inclusive integer domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub domain: Vec<i64>,
    pub kind: VariableKind,
}

impl Variable {
    /// Expand `[low, high]` into the domain.
    ///
    /// Returns `None` if the range is empty or wider than [`MAX_DOMAIN_SIZE`].
    pub fn with_bounds(name: impl Into<String>, low: i64, high: i64, kind: VariableKind) -> Option<Self> {
        domain_size(low, high).filter(|&size| size > 0 && size <= MAX_DOMAIN_SIZE)?;
        Some(Self {
            name: name.into(),
            domain: (low..=high).collect(),
            kind,
        })
    }
}

/// Number of values in `[low, high]`, or `None` when it does not fit in a `u64`.
pub fn domain_size(low: i64, high: i64) -> Option<u64> {
    if high < low {
        return Some(0);
    }
    (high as i128 - low as i128 + 1).try_into().ok()
}

/// All assignments of a constraint that share one utility value.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityGroup {
    pub utility: Number,
    pub assignments: Vec<[Number; 2]>,
}

/// A binary extensional constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Clause name, e.g. `constraint_x1_y1`
    pub id: String,
    pub variables: [String; 2],
    /// Utility groups in first-seen order
    pub table: Vec<UtilityGroup>,
}

impl Constraint {
    pub fn new(id: impl Into<String>, first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variables: [first.into(), second.into()],
            table: Vec::new(),
        }
    }

    /// Add an assignment under its utility.
    ///
    /// Utilities are compared numerically, so `3` and `3.0` land in one group
    /// keyed by whichever was seen first.
    pub fn add_assignment(&mut self, utility: Number, assignment: [Number; 2]) {
        match self.table.iter_mut().find(|group| group.utility == utility) {
            Some(group) => group.assignments.push(assignment),
            None => self.table.push(UtilityGroup {
                utility,
                assignments: vec![assignment],
            }),
        }
    }

    /// Total number of assignments across all groups.
    pub fn assignment_count(&self) -> usize {
        self.table.iter().map(|g| g.assignments.len()).sum()
    }
}

/// Everything read from a PDCOP `.dzn` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdcopProblem {
    pub decision_vars: Vec<Variable>,
    pub random_vars: Vec<Variable>,
    pub constraints: IndexMap<String, Constraint>,
    pub initial_distributions: IndexMap<String, Vec<f64>>,
    pub transition_matrices: IndexMap<String, Vec<Vec<f64>>>,
}

impl PdcopProblem {
    /// Decision variables followed by random variables.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.decision_vars.iter().chain(self.random_vars.iter())
    }
}

/// A DynaGraph agent and the integer domain of the variable it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimAgent {
    pub id: String,
    pub domain: Vec<i64>,
}

impl SimAgent {
    pub fn agent_name(&self) -> String {
        format!("a{}", self.id)
    }

    pub fn variable_name(&self) -> String {
        format!("var{}", self.id)
    }

    pub fn domain_name(&self) -> String {
        format!("d{}", self.id)
    }
}

/// A validated numeric coefficient and the text it was written as.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    pub value: Number,
    pub text: String,
}

impl Coefficient {
    pub fn new(value: Number, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }
}

impl From<Number> for Coefficient {
    fn from(value: Number) -> Self {
        Self::new(value, value.to_string())
    }
}

impl std::fmt::Display for Coefficient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// The quadratic form `a*x² + b*x*y + c*y²` over two agents' variables.
///
/// Rendered expressions copy the coefficients as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticConstraint {
    pub x: String,
    pub y: String,
    pub a: Coefficient,
    pub b: Coefficient,
    pub c: Coefficient,
}

impl QuadraticConstraint {
    fn var_x(&self) -> String {
        format!("var{}", self.x)
    }

    fn var_y(&self) -> String {
        format!("var{}", self.y)
    }

    /// The function in Python expression syntax.
    pub fn function(&self) -> String {
        let (x, y) = (self.var_x(), self.var_y());
        format!(
            "{a} * {x}**2 + {b} * {x} * {y} + {c} * {y}**2",
            a = self.a,
            b = self.b,
            c = self.c
        )
    }

    /// Partial derivatives keyed by variable name.
    ///
    /// When both sides name the same variable the second entry wins.
    pub fn differentials(&self) -> IndexMap<String, String> {
        let (x, y) = (self.var_x(), self.var_y());
        let mut out = IndexMap::new();
        out.insert(x.clone(), format!("2 * {} * {x} + {} * {y}", self.a, self.b));
        out.insert(y.clone(), format!("{} * {x} + 2 * {} * {y}", self.b, self.c));
        out
    }
}

/// Agent lifecycle directive from the `commands` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCommand {
    AddAgent,
    RemoveAgent,
}

impl AgentCommand {
    pub fn from_verb(verb: &str) -> Option<Self> {
        match verb {
            "add_agent" => Some(Self::AddAgent),
            "remove_agent" => Some(Self::RemoveAgent),
            _ => None,
        }
    }
}

/// A scheduled agent command and its token position in `commands`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCommand {
    pub position: usize,
    pub command: AgentCommand,
    pub agent: String,
}

/// Everything read from a DynaGraph sim file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimProblem {
    pub agents: Vec<SimAgent>,
    pub constraints: Vec<QuadraticConstraint>,
    pub commands: Vec<SimCommand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quadratic() -> QuadraticConstraint {
        QuadraticConstraint {
            x: "0".to_string(),
            y: "1".to_string(),
            a: Number::Int(1).into(),
            b: Number::Int(1).into(),
            c: Number::Int(1).into(),
        }
    }

    #[test]
    fn test_domain_is_inclusive() {
        let var = Variable::with_bounds("x1", 2, 5, VariableKind::Decision).unwrap();
        assert_eq!(var.domain, vec![2, 3, 4, 5]);
        assert_eq!(Variable::with_bounds("x", 3, 3, VariableKind::Random).unwrap().domain, vec![3]);
        assert!(Variable::with_bounds("x", 4, 3, VariableKind::Decision).is_none());
    }

    #[test]
    fn test_domain_size_limits() {
        assert_eq!(domain_size(0, 9), Some(10));
        assert_eq!(domain_size(5, 4), Some(0));
        assert_eq!(domain_size(i64::MIN, i64::MAX), None);
        assert_eq!(domain_size(0, i64::MAX), Some(1 << 63));
        assert!(Variable::with_bounds("x", 0, i64::MAX, VariableKind::Decision).is_none());
        assert!(Variable::with_bounds("x", i64::MIN, i64::MAX, VariableKind::Random).is_none());
        let widest = MAX_DOMAIN_SIZE as i64 - 1;
        assert!(Variable::with_bounds("x", 0, widest, VariableKind::Decision).is_some());
    }

    #[test]
    fn test_function_keeps_coefficient_text() {
        let q = QuadraticConstraint {
            x: "0".to_string(),
            y: "1".to_string(),
            a: Coefficient::new(Number::Float(1.5), "1.50"),
            b: Coefficient::new(Number::Int(2), "+2"),
            c: Coefficient::new(Number::Float(0.001), "1e-3"),
        };
        assert_eq!(q.function(), "1.50 * var0**2 + +2 * var0 * var1 + 1e-3 * var1**2");
        assert_eq!(q.differentials()["var0"], "2 * 1.50 * var0 + +2 * var1");
    }

    #[test]
    fn test_grouping_collapses_equal_utilities() {
        let mut c = Constraint::new("constraint_x_y", "x", "y");
        c.add_assignment(Number::Int(5), [Number::Int(0), Number::Int(1)]);
        c.add_assignment(Number::Int(2), [Number::Int(1), Number::Int(1)]);
        c.add_assignment(Number::Float(5.0), [Number::Int(2), Number::Int(0)]);

        assert_eq!(c.table.len(), 2);
        assert!(matches!(c.table[0].utility, Number::Int(5)));
        assert_eq!(c.table[0].assignments.len(), 2);
        assert_eq!(c.assignment_count(), 3);
    }

    #[test]
    fn test_quadratic_function() {
        assert_eq!(
            unit_quadratic().function(),
            "1 * var0**2 + 1 * var0 * var1 + 1 * var1**2"
        );
    }

    #[test]
    fn test_quadratic_differentials() {
        let diffs = unit_quadratic().differentials();
        assert_eq!(diffs["var0"], "2 * 1 * var0 + 1 * var1");
        assert_eq!(diffs["var1"], "1 * var0 + 2 * 1 * var1");
    }

    #[test]
    fn test_differentials_follow_coefficients() {
        let q = QuadraticConstraint {
            x: "2".to_string(),
            y: "5".to_string(),
            a: Number::Int(3).into(),
            b: Number::Float(-0.5).into(),
            c: Number::Int(4).into(),
        };
        assert_eq!(q.function(), "3 * var2**2 + -0.5 * var2 * var5 + 4 * var5**2");
        let diffs = q.differentials();
        assert_eq!(diffs["var2"], "2 * 3 * var2 + -0.5 * var5");
        assert_eq!(diffs["var5"], "-0.5 * var2 + 2 * 4 * var5");
    }

    #[test]
    fn test_agent_command_verbs() {
        assert_eq!(AgentCommand::from_verb("add_agent"), Some(AgentCommand::AddAgent));
        assert_eq!(AgentCommand::from_verb("remove_agent"), Some(AgentCommand::RemoveAgent));
        assert_eq!(AgentCommand::from_verb("pause_agent"), None);
    }
}
