//! # Sherwood - CLI Entry Point
//!
//! Commands:
//! - `plan`        - Order a raid with the configured strategy
//! - `score`       - Replay a hand-written order and report its gold
//! - `compare`     - Run every strategy on the same graph
//! - `init-config` - Generate a default configuration file

use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use sherwood::graph::FortGraph;
use sherwood::scoring;
use sherwood::strategy::{plan_raid, StrategyKind};
use sherwood::{RaidError, RaidResult, SherwoodConfig};

/// Sherwood - plan the most profitable raid order over a graph of forts.
#[derive(Parser, Debug)]
#[command(name = "sherwood")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "sherwood.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute an attack order.
    Plan {
        /// Graph file, overriding `general.graph_file`.
        #[arg(short, long)]
        graph: Option<PathBuf>,

        /// Strategy, overriding `strategy.kind` (tree-dp, greedy, greedy-rescan).
        #[arg(short, long)]
        strategy: Option<StrategyKind>,

        /// Report file, overriding `general.report_file`.
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Replay an attack order and show the gold it yields.
    Score {
        /// Graph file, overriding `general.graph_file`.
        #[arg(short, long)]
        graph: Option<PathBuf>,

        /// Comma-separated fort labels, e.g. `A,C,B`.
        #[arg(short, long, value_delimiter = ',', required = true)]
        order: Vec<String>,
    },

    /// Run every strategy and compare their gold.
    Compare {
        /// Graph file, overriding `general.graph_file`.
        #[arg(short, long)]
        graph: Option<PathBuf>,
    },

    /// Generate a default configuration file.
    InitConfig,
}

fn main() -> RaidResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            graph,
            strategy,
            report,
        } => cmd_plan(&cli.config, graph, strategy, report),
        Commands::Score { graph, order } => cmd_score(&cli.config, graph, &order),
        Commands::Compare { graph } => cmd_compare(&cli.config, graph),
        Commands::InitConfig => cmd_init_config(&cli.config),
    }
}

fn load_config(config_path: &Path) -> RaidResult<SherwoodConfig> {
    if config_path.exists() {
        info!("Loading configuration from: {}", config_path.display());
        SherwoodConfig::from_file(config_path)
    } else {
        info!("No config file found, using defaults. Run 'init-config' to generate one.");
        Ok(SherwoodConfig::default())
    }
}

fn load_graph(config: &SherwoodConfig, override_path: Option<PathBuf>) -> RaidResult<FortGraph> {
    let path = override_path.unwrap_or_else(|| config.general.graph_file.clone());
    let graph = FortGraph::load(&path)?;
    let stats = graph.stats();
    info!(
        "Loaded {} ({} forts, {} edges, {} components, forest: {})",
        path.display(),
        stats.forts,
        stats.edges,
        stats.components,
        stats.is_forest,
    );
    Ok(graph)
}

/// Plan a raid with one strategy.
fn cmd_plan(
    config_path: &Path,
    graph_path: Option<PathBuf>,
    strategy: Option<StrategyKind>,
    report_path: Option<PathBuf>,
) -> RaidResult<()> {
    let config = load_config(config_path)?;
    let graph = load_graph(&config, graph_path)?;

    let kind = strategy.unwrap_or(config.strategy.kind);
    if kind == StrategyKind::TreeDp && !graph.is_forest() {
        warn!("Graph is not a forest; tree-dp result is not guaranteed optimal");
    }

    let strategy = kind.build(&config.greedy);
    let report = plan_raid(strategy.as_ref(), &graph)?;

    println!("Strategy: {}", report.strategy);
    println!("Order:    {}", report.order.join(" -> "));
    println!("Gold:     {:.2}", report.gold);

    if let Some(path) = report_path.or(config.general.report_file) {
        report.save(&path)?;
        println!("Report written to: {}", path.display());
    }

    Ok(())
}

/// Replay an order supplied on the command line.
fn cmd_score(config_path: &Path, graph_path: Option<PathBuf>, order: &[String]) -> RaidResult<()> {
    let config = load_config(config_path)?;
    let graph = load_graph(&config, graph_path)?;

    if let Err(e) = scoring::check_permutation(&graph, order) {
        warn!("Order does not cover the whole graph: {}", e);
    }
    let replay = scoring::replay(&graph, order)?;

    println!("{:<16} {:>10} {:>8} {:>10}  alerts", "fort", "value", "alerted", "gold");
    for record in &replay.records {
        println!(
            "{:<16} {:>10.2} {:>8} {:>10.2}  {}",
            record.label,
            record.value,
            if record.alerted { "yes" } else { "no" },
            record.reward,
            record.newly_alerted.join(","),
        );
    }
    println!();
    println!("Total gold: {:.2}", replay.total_gold);

    Ok(())
}

/// Run all strategies on the same graph.
fn cmd_compare(config_path: &Path, graph_path: Option<PathBuf>) -> RaidResult<()> {
    let config = load_config(config_path)?;
    let graph = load_graph(&config, graph_path)?;
    let forest = graph.is_forest();

    println!("{:<14} {:>12}", "strategy", "gold");
    for kind in StrategyKind::ALL {
        let strategy = kind.build(&config.greedy);
        let report = plan_raid(strategy.as_ref(), &graph)?;
        let note = if kind == StrategyKind::TreeDp && forest {
            "  (optimal)"
        } else {
            ""
        };
        println!("{:<14} {:>12.2}{}", report.strategy, report.gold, note);
    }

    Ok(())
}

/// Generate a default configuration file.
fn cmd_init_config(config_path: &Path) -> RaidResult<()> {
    if config_path.exists() {
        return Err(RaidError::Config(format!(
            "Configuration file already exists: {}. Remove it first or use a different path.",
            config_path.display()
        )));
    }

    SherwoodConfig::write_default(config_path)?;
    println!("Default configuration written to: {}", config_path.display());
    println!();
    println!("Key settings:");
    println!("  [general]  - graph_file points at the JSON fort graph");
    println!("  [strategy] - kind = tree-dp | greedy | greedy-rescan");
    println!("  [greedy]   - discount (default 0.5), penalty_model = static | lookahead");

    Ok(())
}
