//! # Gold Scoring Oracle
//!
//! The single implementation of the alert propagation rule. Strategies use
//! `reward` and `AlertState` to reason about it; `replay` is the ground
//! truth that turns any order into its total gold.
//!
//! ## Rule
//!
//! ```text
//! alerted(v)  = self_alert(v) || some earlier-attacked neighbour lacked Shield
//! reward(v)   = value(v) / 2   if alerted(v) && !immune(v)
//!             = value(v)       otherwise
//! gold(order) = sum of reward(v) in attack order
//! ```
//!
//! Attacking a Shield fort never alerts its neighbours. Shield does not
//! protect the fort itself.

pub mod alert;

use serde::{Deserialize, Serialize};

use crate::graph::nodes::Capabilities;
use crate::graph::{FortGraph, GraphError};
use crate::{RaidError, RaidResult};

pub use alert::AlertState;

/// Gold earned by attacking a fort worth `value`.
pub fn reward(value: f64, alerted: bool, immune: bool) -> f64 {
    if alerted && !immune {
        value / 2.0
    } else {
        value
    }
}

/// Whether a fort counts as alerted given its capabilities and the live flag.
pub fn alerted_at_attack(caps: Capabilities, flagged: bool) -> bool {
    caps.self_alert || flagged
}

/// Gold a fort would yield if attacked now.
pub fn current_reward(graph: &FortGraph, idx: usize, state: &AlertState) -> f64 {
    let caps = graph.caps(idx);
    reward(
        graph.value(idx),
        alerted_at_attack(caps, state.is_alerted(idx)),
        caps.immune,
    )
}

/// One step of a replayed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackRecord {
    pub label: String,
    pub value: f64,
    /// Whether the fort was on alert at the moment it was attacked.
    pub alerted: bool,
    pub reward: f64,
    /// Neighbours that went on alert as a direct result of this attack.
    pub newly_alerted: Vec<String>,
}

/// Result of replaying an order against the alert rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub records: Vec<AttackRecord>,
    pub total_gold: f64,
}

/// Replay an order (full or partial) starting with nobody on alert.
pub fn replay<S: AsRef<str>>(graph: &FortGraph, order: &[S]) -> RaidResult<Replay> {
    replay_with_prealerted::<S, &str>(graph, order, &[])
}

/// Replay an order with some forts already on alert before the first attack.
///
/// Labels that are unknown or attacked twice are rejected.
pub fn replay_with_prealerted<S, P>(
    graph: &FortGraph,
    order: &[S],
    prealerted: &[P],
) -> RaidResult<Replay>
where
    S: AsRef<str>,
    P: AsRef<str>,
{
    let mut state = AlertState::new(graph.len());
    for label in prealerted {
        state.mark(resolve(graph, label.as_ref())?);
    }

    let mut attacked = vec![false; graph.len()];
    let mut records = Vec::with_capacity(order.len());
    let mut total_gold = 0.0;

    for label in order {
        let label = label.as_ref();
        let idx = resolve(graph, label)?;
        if attacked[idx] {
            return Err(RaidError::InvalidOrder(format!("{} is attacked twice", label)));
        }
        attacked[idx] = true;

        let caps = graph.caps(idx);
        let alerted = alerted_at_attack(caps, state.is_alerted(idx));
        let gained = reward(graph.value(idx), alerted, caps.immune);
        total_gold += gained;

        let mut newly_alerted = Vec::new();
        if caps.propagates_alert() {
            for &n in graph.neighbours(idx) {
                if state.mark(n) {
                    newly_alerted.push(graph.label(n).to_string());
                }
            }
        }

        records.push(AttackRecord {
            label: label.to_string(),
            value: graph.value(idx),
            alerted,
            reward: gained,
            newly_alerted,
        });
    }

    Ok(Replay {
        records,
        total_gold,
    })
}

/// Total gold of an order.
pub fn compute_gold_for_order<S: AsRef<str>>(graph: &FortGraph, order: &[S]) -> RaidResult<f64> {
    Ok(replay(graph, order)?.total_gold)
}

/// Check that `order` names every fort exactly once.
pub fn check_permutation<S: AsRef<str>>(graph: &FortGraph, order: &[S]) -> RaidResult<()> {
    let mut seen = vec![false; graph.len()];
    for label in order {
        let idx = resolve(graph, label.as_ref())?;
        if seen[idx] {
            return Err(RaidError::InvalidOrder(format!(
                "{} appears more than once",
                label.as_ref()
            )));
        }
        seen[idx] = true;
    }

    if let Some(missing) = seen.iter().position(|s| !s) {
        return Err(RaidError::InvalidOrder(format!(
            "{} is missing from the order ({} of {} forts listed)",
            graph.label(missing),
            order.len(),
            graph.len()
        )));
    }
    Ok(())
}

fn resolve(graph: &FortGraph, label: &str) -> RaidResult<usize> {
    graph
        .index_of(label)
        .ok_or_else(|| GraphError::UnknownVertex(label.to_string()).into())
}
