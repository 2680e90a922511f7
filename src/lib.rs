//! # Sherwood - Core Library
//!
//! Plans the order in which to raid a network of forts.
//!
//! Every fort holds gold. Raiding a fort may put its neighbours on high
//! alert, which halves whatever they yield later unless they are immune.
//! Sherwood computes an attack order (a permutation of all forts) that
//! collects as much gold as possible under that rule.
//!
//! ## Strategies
//! - **Tree DP** - exact on forests, two hypotheses per fort.
//! - **Greedy** - priority-queue heuristic for any graph.
//! - **Greedy rescan** - quadratic reference version of the greedy.
//!
//! The `scoring` module is the single source of truth for the alert rule and
//! replays any order to its total gold.

pub mod graph;
pub mod scoring;
pub mod strategy;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::graph::GraphError;
use crate::strategy::{PenaltyModel, StrategyKind};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for Sherwood.
#[derive(Error, Debug)]
pub enum RaidError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Invalid attack order: {0}")]
    InvalidOrder(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type RaidResult<T> = Result<T, RaidError>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Top-level configuration for Sherwood.
///
/// Loaded from `sherwood.toml` in the working directory or a path supplied
/// via CLI flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SherwoodConfig {
    /// Input and output locations.
    pub general: GeneralConfig,

    /// Which strategy `plan` runs.
    pub strategy: StrategyConfig,

    /// Greedy heuristic tuning.
    pub greedy: GreedyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Graph file (JSON) to plan against.
    pub graph_file: PathBuf,

    /// Where to write the JSON raid report. None = stdout only.
    pub report_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Strategy used by `plan` unless overridden on the command line.
    pub kind: StrategyKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreedyConfig {
    /// Fraction of a neighbour's value charged as the cost of alerting it.
    /// 0.5 is canonical; 0.2 is the known alternative tuning.
    pub discount: f64,

    /// Penalty model for the rescan variant. The incremental greedy is
    /// always static.
    pub penalty_model: PenaltyModel,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            discount: strategy::greedy::DEFAULT_DISCOUNT,
            penalty_model: PenaltyModel::Static,
        }
    }
}

impl Default for SherwoodConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig {
                graph_file: PathBuf::from("./forts.json"),
                report_file: None,
            },
            strategy: StrategyConfig {
                kind: StrategyKind::TreeDp,
            },
            greedy: GreedyConfig::default(),
        }
    }
}

impl SherwoodConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> RaidResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SherwoodConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration to a TOML file.
    pub fn write_default(path: &std::path::Path) -> RaidResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| RaidError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings no strategy can run with.
    pub fn validate(&self) -> RaidResult<()> {
        let discount = self.greedy.discount;
        if !discount.is_finite() || !(0.0..=1.0).contains(&discount) {
            return Err(RaidError::Config(format!(
                "greedy.discount must be within [0, 1], got {}",
                discount
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Core Types
// ---------------------------------------------------------------------------

/// Fort labels in the order they are attacked. Always a permutation of the
/// graph's forts.
pub type AttackOrder = Vec<String>;

/// Outcome of running one strategy against one graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidReport {
    /// Strategy name (`tree-dp`, `greedy`, `greedy-rescan`).
    pub strategy: String,

    /// The attack order.
    pub order: AttackOrder,

    /// Total gold of `order` as replayed by the scoring oracle.
    pub gold: f64,

    /// Number of forts in the graph.
    pub vertex_count: usize,

    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}

impl RaidReport {
    /// Write the report as pretty JSON.
    pub fn save(&self, path: &std::path::Path) -> RaidResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}
