//! Parsers for the two input grammars.
//!
//! - `dzn`: `;`-separated PDCOP clauses
//! - `sim`: line-oriented DynaGraph `key=value` files
//!
//! Both fail fast: the first clause that does not fit aborts the parse.

mod dzn;
mod sim;

pub use dzn::*;
pub use sim::*;

use crate::literal::parse_literal;
use crate::models::{ConvertError, Result};

/// Split `lhs = rhs`, requiring exactly one `=`.
pub(crate) fn split_assignment(clause: &str) -> Result<(&str, &str)> {
    let (lhs, rhs) = clause
        .split_once('=')
        .ok_or_else(|| ConvertError::malformed(clause, "missing `=`"))?;
    if rhs.contains('=') {
        return Err(ConvertError::malformed(clause, "more than one `=`"));
    }
    Ok((lhs.trim(), rhs.trim()))
}

/// Read a single integer literal.
pub(crate) fn parse_int(text: &str, clause: &str) -> Result<i64> {
    let number = parse_literal(text)
        .and_then(|lit| lit.into_number())
        .map_err(|e| ConvertError::literal(clause, e))?;
    number
        .as_int()
        .ok_or_else(|| ConvertError::malformed(clause, format!("`{}` is not an integer", text.trim())))
}
