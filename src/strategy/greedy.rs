//! # Greedy Strategy (incremental)
//!
//! Heuristic for arbitrary graphs. At every step the unattacked fort with the
//! highest score is taken:
//!
//! ```text
//! penalty(v) = 0                                       if v has Shield
//!            = sum(value(n) * discount, n in N(v), !immune(n))  otherwise
//! score(v)   = current_reward(v) - penalty(v)
//! ```
//!
//! The penalty is fixed before the first attack, so a score only changes when
//! the fort itself goes on alert. That happens at most once per fort, which
//! makes lazy invalidation cheap: every queue entry remembers the fort's alert
//! version when it was pushed, a fresh entry is pushed on the transition, and
//! outdated entries are dropped as they surface.
//!
//! Ties go to the fort that comes first in enumeration order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, info};

use super::RaidStrategy;
use crate::graph::FortGraph;
use crate::scoring::{current_reward, AlertState};
use crate::AttackOrder;

/// Canonical lookahead discount.
pub const DEFAULT_DISCOUNT: f64 = 0.5;

/// Priority-queue greedy strategy.
#[derive(Debug, Clone, Copy)]
pub struct GreedyStrategy {
    discount: f64,
}

/// A queued score for one fort, valid while `version` matches the fort's
/// alert version.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f64,
    idx: usize,
    version: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Whether score `a` beats the current best `b`. Shared with the rescan
/// baseline so both strategies rank identically.
pub(crate) fn outranks(a: f64, b: f64) -> bool {
    a.total_cmp(&b) == Ordering::Greater
}

/// Fixed lookahead penalty for every fort.
pub fn static_penalties(graph: &FortGraph, discount: f64) -> Vec<f64> {
    (0..graph.len())
        .map(|idx| {
            if graph.caps(idx).shield {
                return 0.0;
            }
            graph
                .neighbours(idx)
                .iter()
                .filter(|&&n| !graph.caps(n).immune)
                .map(|&n| graph.value(n) * discount)
                .sum()
        })
        .collect()
}

impl GreedyStrategy {
    pub fn new(discount: f64) -> Self {
        Self { discount }
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }
}

impl Default for GreedyStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_DISCOUNT)
    }
}

impl RaidStrategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose_order_to_attack(&self, graph: &FortGraph) -> AttackOrder {
        let n = graph.len();
        let penalties = static_penalties(graph, self.discount);
        let mut alert = AlertState::new(n);
        let mut attacked = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let mut gold = 0.0;
        let mut discarded = 0usize;

        let score = |idx: usize, alert: &AlertState| current_reward(graph, idx, alert) - penalties[idx];

        let mut queue: BinaryHeap<Candidate> = (0..n)
            .map(|idx| Candidate {
                score: score(idx, &alert),
                idx,
                version: 0,
            })
            .collect();

        while let Some(candidate) = queue.pop() {
            let idx = candidate.idx;
            if attacked[idx] || candidate.version != alert.version(idx) {
                discarded += 1;
                continue;
            }

            let gained = current_reward(graph, idx, &alert);
            debug!(
                "greedy: attack {} (score {:.2}, reward {:.2})",
                graph.label(idx),
                candidate.score,
                gained
            );
            attacked[idx] = true;
            order.push(idx);
            gold += gained;

            if graph.caps(idx).propagates_alert() {
                for &neighbour in graph.neighbours(idx) {
                    if alert.mark(neighbour) && !attacked[neighbour] {
                        queue.push(Candidate {
                            score: score(neighbour, &alert),
                            idx: neighbour,
                            version: alert.version(neighbour),
                        });
                    }
                }
            }
        }

        info!(
            "greedy: {} forts, {} on alert, {} stale entries dropped, expected {:.2} gold",
            order.len(),
            alert.alerted_count(),
            discarded,
            gold
        );

        order.into_iter().map(|i| graph.label(i).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::nodes::{Capabilities, Fort};
    use crate::scoring::compute_gold_for_order;

    #[test]
    fn test_candidate_ordering_prefers_score_then_lower_index() {
        let mut heap = BinaryHeap::new();
        heap.push(Candidate { score: 1.0, idx: 2, version: 0 });
        heap.push(Candidate { score: 3.0, idx: 5, version: 0 });
        heap.push(Candidate { score: 3.0, idx: 1, version: 0 });
        let popped: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|c| c.idx)).collect();
        assert_eq!(popped, vec![1, 5, 2]);
    }

    #[test]
    fn test_static_penalties() {
        let graph = FortGraph::from_parts(
            vec![
                Fort::plain("A", 10.0),
                Fort::new("I", 20.0, Capabilities::NONE.with_immune()),
                Fort::new("S", 4.0, Capabilities::NONE.with_shield()),
            ],
            [("A", "I"), ("A", "S")],
        )
        .unwrap();
        let penalties = static_penalties(&graph, 0.5);
        // A: I is immune, S counts.
        assert_eq!(penalties[0], 2.0);
        assert_eq!(penalties[1], 5.0);
        // Shield forts never alert anybody.
        assert_eq!(penalties[2], 0.0);
    }

    #[test]
    fn test_path_of_three() {
        let graph = FortGraph::from_parts(
            vec![Fort::plain("A", 10.0), Fort::plain("B", 10.0), Fort::plain("C", 10.0)],
            [("A", "B"), ("B", "C")],
        )
        .unwrap();
        let order = GreedyStrategy::default().choose_order_to_attack(&graph);
        // Scores start at A=5, B=0, C=5; A wins the tie, then C (5) beats B (-5).
        assert_eq!(order, vec!["A", "C", "B"]);
        assert_eq!(compute_gold_for_order(&graph, &order).unwrap(), 25.0);
    }

    #[test]
    fn test_stale_entry_is_skipped() {
        // B's first entry (20) outranks C, but H goes first and alerts B.
        // The stale entry must be dropped in favour of the halved one.
        let graph = FortGraph::from_parts(
            vec![
                Fort::plain("B", 20.0),
                Fort::new("H", 30.0, Capabilities::NONE.with_immune()),
                Fort::plain("C", 19.0),
            ],
            [("H", "B")],
        )
        .unwrap();
        let order = GreedyStrategy::new(0.0).choose_order_to_attack(&graph);
        assert_eq!(order, vec!["H", "C", "B"]);
    }

    #[test]
    fn test_works_on_cycles() {
        let graph = FortGraph::from_parts(
            vec![
                Fort::plain("A", 3.0),
                Fort::plain("B", 5.0),
                Fort::plain("C", 7.0),
                Fort::plain("D", 9.0),
            ],
            [("A", "B"), ("B", "C"), ("C", "D"), ("D", "A"), ("A", "C")],
        )
        .unwrap();
        let order = GreedyStrategy::default().choose_order_to_attack(&graph);
        assert_eq!(order.len(), 4);
        crate::scoring::check_permutation(&graph, &order).unwrap();
    }
}
