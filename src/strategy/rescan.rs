//! # Greedy Strategy (full rescan)
//!
//! Quadratic reference version of the greedy heuristic: every step rescans
//! all unattacked forts and recomputes their scores from the live alert set.
//! With `PenaltyModel::Static` it ranks exactly like `GreedyStrategy` and
//! serves as its oracle. `PenaltyModel::Lookahead` only charges for
//! neighbours that are still unattacked and not yet on alert.

use log::{debug, info};

use super::greedy::{outranks, static_penalties, DEFAULT_DISCOUNT};
use super::{PenaltyModel, RaidStrategy};
use crate::graph::FortGraph;
use crate::scoring::{current_reward, AlertState};
use crate::AttackOrder;

/// O(V^2) greedy strategy.
#[derive(Debug, Clone, Copy)]
pub struct RescanGreedyStrategy {
    discount: f64,
    penalty_model: PenaltyModel,
}

impl RescanGreedyStrategy {
    pub fn new(discount: f64, penalty_model: PenaltyModel) -> Self {
        Self {
            discount,
            penalty_model,
        }
    }

    fn lookahead_penalty(
        &self,
        graph: &FortGraph,
        idx: usize,
        alert: &AlertState,
        attacked: &[bool],
    ) -> f64 {
        if graph.caps(idx).shield {
            return 0.0;
        }
        graph
            .neighbours(idx)
            .iter()
            .filter(|&&n| !attacked[n] && !alert.is_alerted(n) && !graph.caps(n).immune)
            .map(|&n| graph.value(n) * self.discount)
            .sum()
    }
}

impl Default for RescanGreedyStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_DISCOUNT, PenaltyModel::Static)
    }
}

impl RaidStrategy for RescanGreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy-rescan"
    }

    fn choose_order_to_attack(&self, graph: &FortGraph) -> AttackOrder {
        let n = graph.len();
        let fixed = static_penalties(graph, self.discount);
        let mut alert = AlertState::new(n);
        let mut attacked = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let mut gold = 0.0;

        while order.len() < n {
            let mut best: Option<(usize, f64)> = None;

            for idx in 0..n {
                if attacked[idx] {
                    continue;
                }
                let penalty = match self.penalty_model {
                    PenaltyModel::Static => fixed[idx],
                    PenaltyModel::Lookahead => self.lookahead_penalty(graph, idx, &alert, &attacked),
                };
                let score = current_reward(graph, idx, &alert) - penalty;
                if best.map_or(true, |(_, top)| outranks(score, top)) {
                    best = Some((idx, score));
                }
            }

            let Some((idx, score)) = best else { break };
            let gained = current_reward(graph, idx, &alert);
            debug!(
                "greedy-rescan: attack {} (score {:.2}, reward {:.2})",
                graph.label(idx),
                score,
                gained
            );
            attacked[idx] = true;
            order.push(idx);
            gold += gained;

            if graph.caps(idx).propagates_alert() {
                for &neighbour in graph.neighbours(idx) {
                    alert.mark(neighbour);
                }
            }
        }

        info!(
            "greedy-rescan ({:?}): {} forts, expected {:.2} gold",
            self.penalty_model,
            order.len(),
            gold
        );

        order.into_iter().map(|i| graph.label(i).to_string()).collect()
    }
}
