//! # Ordering Strategies
//!
//! A strategy takes a read-only `FortGraph` and returns an attack order: a
//! permutation of every fort label. All mutable state (visited sets, alert
//! flags, priority queues) lives inside a single call.
//!
//! - `tree_dp` - exact for forests, ignores cycle-closing edges
//! - `greedy`  - incremental priority-queue heuristic for any graph
//! - `rescan`  - quadratic full-rescan greedy, used as a reference

pub mod greedy;
pub mod rescan;
pub mod tree_dp;

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};

use crate::graph::FortGraph;
use crate::scoring;
use crate::{AttackOrder, GreedyConfig, RaidReport, RaidResult};

pub use greedy::GreedyStrategy;
pub use rescan::RescanGreedyStrategy;
pub use tree_dp::TreeDpStrategy;

/// Something that can order a raid.
pub trait RaidStrategy {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Produce a permutation of all fort labels.
    fn choose_order_to_attack(&self, graph: &FortGraph) -> AttackOrder;
}

/// Which strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    TreeDp,
    Greedy,
    GreedyRescan,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::TreeDp,
        StrategyKind::Greedy,
        StrategyKind::GreedyRescan,
    ];

    /// Instantiate the strategy with the given greedy tuning.
    pub fn build(self, greedy: &GreedyConfig) -> Box<dyn RaidStrategy> {
        match self {
            StrategyKind::TreeDp => Box::new(TreeDpStrategy::new()),
            StrategyKind::Greedy => Box::new(GreedyStrategy::new(greedy.discount)),
            StrategyKind::GreedyRescan => Box::new(RescanGreedyStrategy::new(
                greedy.discount,
                greedy.penalty_model,
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::TreeDp => "tree-dp",
            StrategyKind::Greedy => "greedy",
            StrategyKind::GreedyRescan => "greedy-rescan",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree-dp" | "dp" => Ok(StrategyKind::TreeDp),
            "greedy" => Ok(StrategyKind::Greedy),
            "greedy-rescan" | "rescan" => Ok(StrategyKind::GreedyRescan),
            other => Err(format!(
                "unknown strategy '{}' (expected tree-dp, greedy or greedy-rescan)",
                other
            )),
        }
    }
}

/// How the greedy lookahead penalty is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PenaltyModel {
    /// Computed once before the first attack and never updated.
    Static,
    /// Recomputed every step, counting only neighbours that are still
    /// unattacked and not yet on alert.
    Lookahead,
}

/// Run a strategy, verify its output against the scoring oracle, and
/// package the result.
pub fn plan_raid(strategy: &dyn RaidStrategy, graph: &FortGraph) -> RaidResult<RaidReport> {
    let order = strategy.choose_order_to_attack(graph);
    scoring::check_permutation(graph, &order)?;
    let gold = scoring::compute_gold_for_order(graph, &order)?;

    info!(
        "{}: ordered {} forts for {:.2} gold",
        strategy.name(),
        order.len(),
        gold
    );

    Ok(RaidReport {
        strategy: strategy.name().to_string(),
        vertex_count: graph.len(),
        order,
        gold,
        generated_at: Utc::now(),
    })
}
