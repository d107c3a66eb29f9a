//! Parser for DynaGraph simulation files.
//!
//! One `key=value` pair per line. Three keys are required:
//! - `domains`: `id:v1,v2,...` tokens separated by spaces
//! - `cons`: `(x,y):(a,b,c)` quadratic constraints joined by `>`
//! - `commands`: space separated directives; `add_agent:<id>` and
//!   `remove_agent:<id>` are scheduled, everything else is ignored

use super::parse_int;
use crate::literal::{parse_literal, Literal};
use crate::models::{
    AgentCommand, Coefficient, ConvertError, QuadraticConstraint, Result, SimAgent, SimCommand, SimProblem,
};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

pub const DOMAINS_KEY: &str = "domains";
pub const CONSTRAINTS_KEY: &str = "cons";
pub const COMMANDS_KEY: &str = "commands";

/// Parse the full text of a sim file.
pub fn parse_sim(text: &str) -> Result<SimProblem> {
    let entries = parse_entries(text)?;

    let agents = required(&entries, DOMAINS_KEY)?
        .split_whitespace()
        .map(parse_domain_token)
        .collect::<Result<Vec<_>>>()?;

    let constraints = required(&entries, CONSTRAINTS_KEY)?
        .split('>')
        .filter(|token| !token.trim().is_empty())
        .map(parse_constraint_token)
        .collect::<Result<Vec<_>>>()?;

    let commands = parse_commands(required(&entries, COMMANDS_KEY)?)?;

    Ok(SimProblem {
        agents,
        constraints,
        commands,
    })
}

/// Read `key=value` lines. Blank lines are skipped; a repeated key keeps the last value.
pub fn parse_entries(text: &str) -> Result<IndexMap<String, String>> {
    let mut entries = IndexMap::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| ConvertError::malformed(line, "expected `key=value`"))?;
        entries.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(entries)
}

fn required<'a>(entries: &'a IndexMap<String, String>, key: &str) -> Result<&'a str> {
    entries
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ConvertError::MissingKey(key.to_string()))
}

/// `3:0,1,2` → agent `3` owning domain `[0, 1, 2]`.
pub fn parse_domain_token(token: &str) -> Result<SimAgent> {
    let (id, values) = token
        .split_once(':')
        .ok_or_else(|| ConvertError::malformed(token, "expected `<agent>:<values>`"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(ConvertError::malformed(token, "missing agent id"));
    }

    let domain = values
        .split(',')
        .map(|value| parse_int(value, token))
        .collect::<Result<Vec<_>>>()?;

    Ok(SimAgent {
        id: id.to_string(),
        domain,
    })
}

fn constraint_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*\(\s*([^,()\s]+)\s*,\s*([^,()\s]+)\s*\)\s*:\s*\((.*)\)\s*$")
            .expect("constraint pattern is a valid regex")
    })
}

/// `(0,1):(1,2,3)` → `1*var0² + 2*var0*var1 + 3*var1²`.
pub fn parse_constraint_token(token: &str) -> Result<QuadraticConstraint> {
    let caps = constraint_pattern()
        .captures(token)
        .ok_or_else(|| ConvertError::malformed(token, "expected `(x,y):(a,b,c)`"))?;

    let coefficients = caps[3]
        .split(',')
        .map(|field| {
            let text = field.trim();
            parse_literal(text)
                .and_then(Literal::into_number)
                .map(|value| Coefficient::new(value, text))
                .map_err(|e| ConvertError::literal(token, e))
        })
        .collect::<Result<Vec<_>>>()?;
    let Ok([a, b, c]) = <[Coefficient; 3]>::try_from(coefficients) else {
        return Err(ConvertError::malformed(
            token,
            "expected 3 coefficients `(a,b,c)`",
        ));
    };

    Ok(QuadraticConstraint {
        x: caps[1].to_string(),
        y: caps[2].to_string(),
        a,
        b,
        c,
    })
}

/// Scheduled agent commands, keeping each token's position in the line.
///
/// Tokens are split on single spaces, so consecutive spaces leave empty
/// tokens that still take up a position.
pub fn parse_commands(line: &str) -> Result<Vec<SimCommand>> {
    let mut commands = Vec::new();
    for (position, token) in line.split(' ').enumerate() {
        let token = token.trim();
        if !(token.contains("add_agent") || token.contains("remove_agent")) {
            if !token.is_empty() {
                debug!(token, position, "Ignoring command");
            }
            continue;
        }

        let (verb, agent) = match token.split(':').collect::<Vec<_>>().as_slice() {
            [verb, agent] if !agent.is_empty() => (*verb, *agent),
            _ => return Err(ConvertError::malformed(token, "expected `<command>:<agent>`")),
        };
        let command = AgentCommand::from_verb(verb)
            .ok_or_else(|| ConvertError::malformed(token, format!("unknown command `{verb}`")))?;

        commands.push(SimCommand {
            position,
            command,
            agent: agent.to_string(),
        });
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Number;

    const GRAPH: &str = "\
domains=0:1,2,3 1:1,2,3 2:0,5
cons=(0,1):(1,1,1)>(1,2):(2,-1,0.5)
commands=sleep:5 add_agent:3 run remove_agent:1
";

    #[test]
    fn test_parse_graph() {
        let problem = parse_sim(GRAPH).unwrap();

        assert_eq!(problem.agents.len(), 3);
        assert_eq!(problem.agents[2].id, "2");
        assert_eq!(problem.agents[2].domain, vec![0, 5]);

        assert_eq!(problem.constraints.len(), 2);
        assert_eq!(
            problem.constraints[0].function(),
            "1 * var0**2 + 1 * var0 * var1 + 1 * var1**2"
        );
        assert_eq!(problem.constraints[1].c.value, Number::Float(0.5));

        assert_eq!(
            problem.commands,
            vec![
                SimCommand {
                    position: 1,
                    command: AgentCommand::AddAgent,
                    agent: "3".to_string(),
                },
                SimCommand {
                    position: 3,
                    command: AgentCommand::RemoveAgent,
                    agent: "1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_entries_skip_blank_and_override() {
        let entries = parse_entries("a=1\n\n  \nb = two words \na=3\n").unwrap();
        assert_eq!(entries["a"], "3");
        assert_eq!(entries["b"], "two words");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_line_without_equals() {
        let err = parse_entries("domains=0:1\njunk\n").unwrap_err();
        assert_eq!(err.clause(), Some("junk"));
    }

    #[test]
    fn test_missing_keys() {
        for (text, key) in [
            ("cons=\ncommands=\n", "domains"),
            ("domains=0:1\ncommands=\n", "cons"),
            ("domains=0:1\ncons=\n", "commands"),
        ] {
            match parse_sim(text) {
                Err(ConvertError::MissingKey(k)) => assert_eq!(k, key),
                other => panic!("expected missing {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_sections() {
        let problem = parse_sim("domains=\ncons=\ncommands=\n").unwrap();
        assert!(problem.agents.is_empty());
        assert!(problem.constraints.is_empty());
        assert!(problem.commands.is_empty());
    }

    #[test]
    fn test_constraint_token_shapes() {
        let q = parse_constraint_token(" ( 4 , 7 ) : ( 1, 0, 2 ) ").unwrap();
        assert_eq!((q.x.as_str(), q.y.as_str()), ("4", "7"));
        assert!(parse_constraint_token("(0,1)(1,1,1)").is_err());
        assert!(parse_constraint_token("(0,1):(1,1)").is_err());
        assert!(matches!(
            parse_constraint_token("(0,1):(1,a,1)"),
            Err(ConvertError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_domain_token_errors() {
        assert!(parse_domain_token("0-1,2").is_err());
        assert!(parse_domain_token(":1,2").is_err());
        assert!(parse_domain_token("0:1,x").is_err());
        assert!(parse_domain_token("0:1.5").is_err());
    }

    #[test]
    fn test_command_positions_count_every_space() {
        let commands = parse_commands("run  add_agent:3").unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].position, 2);
        assert_eq!(commands[0].agent, "3");

        let commands = parse_commands("add_agent:1 remove_agent:1").unwrap();
        let positions: Vec<_> = commands.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn test_coefficients_keep_source_text() {
        let q = parse_constraint_token("(0,1):(1.50,+2,1e-3)").unwrap();
        assert_eq!(q.a.value, Number::Float(1.5));
        assert_eq!(q.b.text, "+2");
        assert_eq!(
            q.function(),
            "1.50 * var0**2 + +2 * var0 * var1 + 1e-3 * var1**2"
        );
        assert_eq!(q.differentials()["var1"], "+2 * var0 + 2 * 1e-3 * var1");
    }

    #[test]
    fn test_command_errors() {
        assert!(parse_commands("add_agent").is_err());
        assert!(parse_commands("add_agent:1:2").is_err());
        assert!(parse_commands("re_add_agent:1").is_err());
        assert!(parse_commands("add_agent:").is_err());
    }
}
