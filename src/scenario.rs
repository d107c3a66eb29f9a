//! Scenario timeline generation.
//!
//! Every timeline opens with a `w0` wait. D-DCOP timelines then alternate a
//! random-variable change with a short wait, in shuffled order; DynaGraph
//! timelines alternate agent commands with a longer wait.

use crate::models::{Action, AgentCommand, Event, ScenarioConfig, SimCommand, Variable};
use rand::seq::SliceRandom;
use rand::Rng;

/// One way a random variable can be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub variable: String,
    pub value: i64,
}

/// Every (random variable, domain value) pair, in declaration order.
pub fn resolution_candidates<'a>(
    random_vars: impl IntoIterator<Item = &'a Variable>,
) -> Vec<Resolution> {
    random_vars
        .into_iter()
        .flat_map(|var| {
            var.domain.iter().map(move |&value| Resolution {
                variable: var.name.clone(),
                value,
            })
        })
        .collect()
}

/// Timeline for a static problem: just the opening wait.
pub fn static_events(delays: &ScenarioConfig) -> Vec<Event> {
    vec![Event::wait("w0", delays.initial_delay)]
}

/// Shuffled resolution timeline for a dynamic problem.
///
/// Action `e{k}` is followed by wait `w{k}` for k = 1..=n. Only the variable
/// name goes into the action; the value is drawn by the simulator.
pub fn ddcop_events<R: Rng + ?Sized>(
    random_vars: &[Variable],
    rng: &mut R,
    delays: &ScenarioConfig,
) -> Vec<Event> {
    let mut candidates = resolution_candidates(random_vars);
    candidates.shuffle(rng);

    let mut events = Vec::with_capacity(candidates.len() * 2 + 1);
    events.push(Event::wait("w0", delays.initial_delay));
    for (k, resolution) in (1..).zip(candidates) {
        events.push(Event::action(
            format!("e{k}"),
            Action::RandomVariableChange {
                variable: resolution.variable,
            },
        ));
        events.push(Event::wait(format!("w{k}"), delays.resolution_delay));
    }
    events
}

/// Agent command timeline for a DynaGraph problem.
///
/// Ids follow the command's token position `i`: action `e{i}`, then wait `w{i+1}`.
pub fn sim_events(commands: &[SimCommand], delays: &ScenarioConfig) -> Vec<Event> {
    let mut events = Vec::with_capacity(commands.len() * 2 + 1);
    events.push(Event::wait("w0", delays.initial_delay));
    for cmd in commands {
        let agent = format!("a{}", cmd.agent);
        let action = match cmd.command {
            AgentCommand::AddAgent => Action::AddAgent { agent },
            AgentCommand::RemoveAgent => Action::RemoveAgent { agent },
        };
        events.push(Event::action(format!("e{}", cmd.position), action));
        events.push(Event::wait(
            format!("w{}", cmd.position + 1),
            delays.command_delay,
        ));
    }
    events
}
