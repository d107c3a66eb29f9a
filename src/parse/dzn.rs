//! Parser for PDCOP `.dzn` files.
//!
//! The file is a list of `;`-terminated clauses. Each clause is classified by
//! the first keyword it contains, in this order: `decision`, `random`,
//! `constraint`, `initial_distribution`, `transition`. Clauses matching none
//! of them (comments, solver directives) are dropped.

use super::split_assignment;
use crate::literal::{parse_literal, Literal, Number};
use crate::models::{
    domain_size, Constraint, ConvertError, PdcopProblem, Result, Variable, VariableKind,
    MAX_DOMAIN_SIZE,
};
use tracing::debug;

/// Clause categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Decision,
    Random,
    Constraint,
    InitialDistribution,
    Transition,
}

/// Classify a clause by keyword substring.
pub fn classify_clause(clause: &str) -> Option<ClauseKind> {
    if clause.contains("decision") {
        Some(ClauseKind::Decision)
    } else if clause.contains("random") {
        Some(ClauseKind::Random)
    } else if clause.contains("constraint") {
        Some(ClauseKind::Constraint)
    } else if clause.contains("initial_distribution") {
        Some(ClauseKind::InitialDistribution)
    } else if clause.contains("transition") {
        Some(ClauseKind::Transition)
    } else {
        None
    }
}

/// Parse the full text of a `.dzn` file.
pub fn parse_pdcop(text: &str) -> Result<PdcopProblem> {
    let mut problem = PdcopProblem::default();

    for clause in text.split(';') {
        match classify_clause(clause) {
            Some(ClauseKind::Decision) => {
                problem
                    .decision_vars
                    .push(parse_variable(clause, VariableKind::Decision)?);
            }
            Some(ClauseKind::Random) => {
                problem
                    .random_vars
                    .push(parse_variable(clause, VariableKind::Random)?);
            }
            Some(ClauseKind::Constraint) => {
                let constraint = parse_constraint(clause)?;
                problem.constraints.insert(constraint.id.clone(), constraint);
            }
            Some(ClauseKind::InitialDistribution) => {
                let (name, distribution) = parse_distribution(clause)?;
                problem.initial_distributions.insert(name, distribution);
            }
            Some(ClauseKind::Transition) => {
                let (name, matrix) = parse_transition(clause)?;
                problem.transition_matrices.insert(name, matrix);
            }
            None => {
                if !clause.trim().is_empty() {
                    debug!(clause = clause.trim(), "Skipping unrecognized clause");
                }
            }
        }
    }

    Ok(problem)
}

/// `decision_x1 = (0, 4)` → `x1` with domain `0..=4`.
pub fn parse_variable(clause: &str, kind: VariableKind) -> Result<Variable> {
    let (lhs, rhs) = split_assignment(clause)?;
    let name = lhs
        .split('_')
        .nth(1)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ConvertError::malformed(clause, "expected `<kind>_<name>` before `=`"))?;

    let (low, high) = parse_literal(rhs)
        .and_then(Literal::into_bounds)
        .map_err(|e| ConvertError::literal(clause, e))?;

    match domain_size(low, high) {
        Some(0) => Err(ConvertError::malformed(
            clause,
            format!("empty domain ({low}, {high})"),
        )),
        Some(size) if size <= MAX_DOMAIN_SIZE => Variable::with_bounds(name, low, high, kind)
            .ok_or_else(|| ConvertError::malformed(clause, "invalid domain")),
        _ => Err(ConvertError::malformed(
            clause,
            format!("domain ({low}, {high}) too large, at most {MAX_DOMAIN_SIZE} values"),
        )),
    }
}

/// `constraint_x1_y1 = [| 0, 1, 5 | 1, 1, 2 |]`
///
/// Each `|` segment is an assignment to both variables followed by its utility.
pub fn parse_constraint(clause: &str) -> Result<Constraint> {
    let (lhs, rhs) = split_assignment(clause)?;
    let (first, second) = match lhs.split('_').collect::<Vec<_>>().as_slice() {
        [_, first, second] if !first.is_empty() && !second.is_empty() => (*first, *second),
        _ => {
            return Err(ConvertError::malformed(
                clause,
                "expected `constraint_<var>_<var>` before `=`",
            ));
        }
    };

    let mut constraint = Constraint::new(lhs, first, second);
    for segment in bracket_segments(rhs, clause)? {
        let values = segment
            .split(',')
            .map(|field| {
                parse_literal(field)
                    .and_then(Literal::into_number)
                    .map_err(|e| ConvertError::literal(clause, e))
            })
            .collect::<Result<Vec<Number>>>()?;

        match values.as_slice() {
            [a, b, utility] => constraint.add_assignment(*utility, [*a, *b]),
            _ => {
                return Err(ConvertError::malformed(
                    clause,
                    format!(
                        "assignment `{segment}` binds {} values, expected 2",
                        values.len().saturating_sub(1)
                    ),
                ));
            }
        }
    }

    Ok(constraint)
}

/// `initial_distribution_y1 = [0.2, 0.8]`
pub fn parse_distribution(clause: &str) -> Result<(String, Vec<f64>)> {
    let (lhs, rhs) = split_assignment(clause)?;
    let name = table_owner(lhs, clause)?;
    let values = parse_literal(rhs)
        .and_then(Literal::into_numbers)
        .map_err(|e| ConvertError::literal(clause, e))?;
    Ok((name, values.into_iter().map(Number::as_f64).collect()))
}

/// `transition_y1 = [| 0.9, 0.1 | 0.3, 0.7 |]`
pub fn parse_transition(clause: &str) -> Result<(String, Vec<Vec<f64>>)> {
    let (lhs, rhs) = split_assignment(clause)?;
    let name = table_owner(lhs, clause)?;

    let mut matrix = Vec::new();
    for row in bracket_segments(rhs, clause)? {
        let values = parse_literal(&format!("[{row}]"))
            .and_then(Literal::into_numbers)
            .map_err(|e| ConvertError::literal(clause, e))?;
        matrix.push(values.into_iter().map(Number::as_f64).collect());
    }
    Ok((name, matrix))
}

/// The variable a distribution or matrix belongs to: the last `_` token.
fn table_owner(lhs: &str, clause: &str) -> Result<String> {
    match lhs.rsplit('_').next() {
        Some(name) if !name.is_empty() && name != lhs => Ok(name.to_string()),
        _ => Err(ConvertError::malformed(
            clause,
            "expected `<table>_<variable>` before `=`",
        )),
    }
}

/// Non-empty `|` segments inside `[...]`.
fn bracket_segments<'a>(rhs: &'a str, clause: &str) -> Result<Vec<&'a str>> {
    let inner = rhs
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| ConvertError::malformed(clause, "value must be enclosed in `[` `]`"))?;
    Ok(inner
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect())
}
