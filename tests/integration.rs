//! # Sherwood - Integration Tests
//!
//! End-to-end checks of the planning pipeline:
//! graph file -> FortGraph -> strategy -> scoring oracle -> report
//!
//! The property tests generate random forests and graphs and hold every
//! strategy to the laws the alert rule implies: full permutations, an
//! optimal tree DP (checked by brute force), and identical results from
//! the incremental and rescanning greedy variants.
//!
//! Copyright (c) 2026 CIPS Corps. All rights reserved.

use std::fs;
use std::path::PathBuf;

use proptest::prelude::*;
use proptest::sample::Index;

use sherwood::graph::nodes::{Capabilities, Fort};
use sherwood::graph::{FortGraph, GraphError};
use sherwood::scoring::{check_permutation, compute_gold_for_order, replay};
use sherwood::strategy::{
    plan_raid, GreedyStrategy, PenaltyModel, RaidStrategy, RescanGreedyStrategy, StrategyKind,
    TreeDpStrategy,
};
use sherwood::{GreedyConfig, RaidError, RaidReport, SherwoodConfig};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a temporary directory for test files. Returns the path.
fn create_test_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("sherwood-test").join(test_name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create test dir");
    dir
}

fn cleanup_test_dir(dir: &PathBuf) {
    let _ = fs::remove_dir_all(dir);
}

type FortSpec = (u32, bool, bool, bool);

/// Build a graph with labels F0..Fn from (value, self_alert, immune, shield)
/// tuples and index pairs.
fn build(forts: &[FortSpec], edges: &[(usize, usize)]) -> FortGraph {
    let forts = forts
        .iter()
        .enumerate()
        .map(|(i, &(value, self_alert, immune, shield))| {
            Fort::new(
                format!("F{}", i),
                value as f64,
                Capabilities::new(self_alert, immune, shield),
            )
        })
        .collect();
    let edges: Vec<(String, String)> = edges
        .iter()
        .map(|&(a, b)| (format!("F{}", a), format!("F{}", b)))
        .collect();
    FortGraph::from_parts(forts, edges).expect("valid graph")
}

fn labels(graph: &FortGraph) -> Vec<String> {
    graph.labels().map(String::from).collect()
}

fn permute(items: &mut Vec<String>, k: usize, visit: &mut dyn FnMut(&[String])) {
    if k == items.len() {
        visit(items);
        return;
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, visit);
        items.swap(k, i);
    }
}

/// Best gold over every permutation of the graph's forts.
fn brute_force_best(graph: &FortGraph) -> f64 {
    let mut items = labels(graph);
    let mut best = f64::NEG_INFINITY;
    permute(&mut items, 0, &mut |perm| {
        let gold = compute_gold_for_order(graph, perm).expect("valid permutation");
        if gold > best {
            best = gold;
        }
    });
    best
}

fn arb_fort() -> impl Strategy<Value = FortSpec> {
    (
        0u32..50,
        prop::bool::weighted(0.2),
        prop::bool::weighted(0.2),
        prop::bool::weighted(0.25),
    )
}

/// Random forest: fort i (i > 0) hangs off a random earlier fort, or starts
/// a new tree.
fn arb_forest(max_forts: usize) -> impl Strategy<Value = FortGraph> {
    (1..=max_forts)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(arb_fort(), n),
                prop::collection::vec((any::<Index>(), prop::bool::weighted(0.85)), n),
            )
        })
        .prop_map(|(forts, parents)| {
            let edges: Vec<(usize, usize)> = parents
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, (_, connect))| *connect)
                .map(|(i, (parent, _))| (parent.index(i), i))
                .collect();
            build(&forts, &edges)
        })
}

/// Random graph of any shape, cycles included.
fn arb_graph(max_forts: usize) -> impl Strategy<Value = FortGraph> {
    (1..=max_forts)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(arb_fort(), n),
                prop::collection::vec((any::<Index>(), any::<Index>()), 0..n * 3),
            )
        })
        .prop_map(|(forts, pairs)| {
            let n = forts.len();
            let edges: Vec<(usize, usize)> = pairs
                .iter()
                .map(|(a, b)| (a.index(n), b.index(n)))
                .collect();
            build(&forts, &edges)
        })
}

fn all_strategies() -> Vec<Box<dyn RaidStrategy>> {
    StrategyKind::ALL
        .iter()
        .map(|kind| kind.build(&GreedyConfig::default()))
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_path_of_three_yields_25() {
    let graph = build(&[(10, false, false, false); 3], &[(0, 1), (1, 2)]);
    let order = TreeDpStrategy::new().choose_order_to_attack(&graph);
    assert_eq!(order, vec!["F0", "F2", "F1"]);
    assert_eq!(compute_gold_for_order(&graph, &order).unwrap(), 25.0);
    assert_eq!(brute_force_best(&graph), 25.0);
}

#[test]
fn test_isolated_self_alert_fort_is_always_halved() {
    let graph = build(
        &[(10, true, false, false), (6, false, false, false), (4, false, false, false)],
        &[(1, 2)],
    );
    for strategy in all_strategies() {
        let order = strategy.choose_order_to_attack(&graph);
        let replay = replay(&graph, &order).unwrap();
        let record = replay
            .records
            .iter()
            .find(|r| r.label == "F0")
            .expect("F0 attacked");
        assert!(record.alerted);
        assert_eq!(record.reward, 5.0, "{} got the wrong reward", strategy.name());
    }
}

#[test]
fn test_empty_graph_yields_empty_order() {
    let graph = FortGraph::new();
    for strategy in all_strategies() {
        let report = plan_raid(strategy.as_ref(), &graph).unwrap();
        assert!(report.order.is_empty());
        assert_eq!(report.gold, 0.0);
    }
}

#[test]
fn test_dp_beats_or_matches_greedy_on_a_tree() {
    // Small tree mixing every capability.
    let graph = build(
        &[
            (40, false, false, false),
            (10, false, false, false),
            (40, false, false, false),
            (30, false, false, true),
            (25, false, true, false),
            (5, true, false, false),
        ],
        &[(0, 1), (1, 2), (1, 3), (2, 4), (2, 5)],
    );
    let dp = plan_raid(&TreeDpStrategy::new(), &graph).unwrap();
    let greedy = plan_raid(&GreedyStrategy::default(), &graph).unwrap();
    assert_eq!(dp.gold, brute_force_best(&graph));
    assert!(dp.gold >= greedy.gold);
}

// ---------------------------------------------------------------------------
// File pipeline
// ---------------------------------------------------------------------------

#[test]
fn test_graph_file_to_report_pipeline() {
    let dir = create_test_dir("pipeline");
    let graph_path = dir.join("forts.json");
    fs::write(
        &graph_path,
        r#"{
            "forts": [
                { "label": "Nottingham", "value": 50.0 },
                { "label": "Locksley", "value": 20.0, "shield": true },
                { "label": "Barnsdale", "value": 30.0, "immune": true },
                { "label": "Sherwood", "value": 10.0, "self_alert": true }
            ],
            "edges": [["Nottingham", "Locksley"], ["Nottingham", "Barnsdale"], ["Barnsdale", "Sherwood"]]
        }"#,
    )
    .unwrap();

    let graph = FortGraph::load(&graph_path).unwrap();
    assert_eq!(graph.len(), 4);
    assert!(graph.is_forest());

    let report = plan_raid(&TreeDpStrategy::new(), &graph).unwrap();
    check_permutation(&graph, &report.order).unwrap();
    assert_eq!(report.gold, brute_force_best(&graph));

    let report_path = dir.join("out").join("report.json");
    report.save(&report_path).unwrap();
    let loaded: RaidReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(loaded.order, report.order);
    assert_eq!(loaded.gold, report.gold);
    assert_eq!(loaded.strategy, "tree-dp");

    cleanup_test_dir(&dir);
}

#[test]
fn test_dangling_neighbour_fails_fast() {
    let dir = create_test_dir("dangling");
    let graph_path = dir.join("forts.json");
    fs::write(
        &graph_path,
        r#"{ "forts": [{ "label": "A", "value": 1.0 }], "edges": [["A", "Ghost"]] }"#,
    )
    .unwrap();

    let err = FortGraph::load(&graph_path).unwrap_err();
    assert_eq!(
        err,
        GraphError::DanglingNeighbor {
            from: "A".to_string(),
            to: "Ghost".to_string()
        }
    );

    cleanup_test_dir(&dir);
}

#[test]
fn test_config_file_roundtrip() {
    let dir = create_test_dir("config");
    let config_path = dir.join("sherwood.toml");

    SherwoodConfig::write_default(&config_path).unwrap();
    let config = SherwoodConfig::from_file(&config_path).unwrap();
    assert_eq!(config.strategy.kind, StrategyKind::TreeDp);
    assert_eq!(config.greedy.discount, 0.5);
    assert_eq!(config.greedy.penalty_model, PenaltyModel::Static);

    fs::write(
        &config_path,
        "[general]\ngraph_file = \"g.json\"\n\n[strategy]\nkind = \"greedy\"\n\n[greedy]\ndiscount = 2.0\npenalty_model = \"static\"\n",
    )
    .unwrap();
    assert!(matches!(
        SherwoodConfig::from_file(&config_path),
        Err(RaidError::Config(_))
    ));

    cleanup_test_dir(&dir);
}

#[test]
fn test_score_rejects_partial_orders() {
    let graph = build(&[(1, false, false, false); 3], &[(0, 1)]);
    let err = check_permutation(&graph, &["F0", "F1"]).unwrap_err();
    assert!(matches!(err, RaidError::InvalidOrder(_)));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_strategy_returns_a_permutation(graph in arb_graph(25)) {
        for strategy in all_strategies() {
            let order = strategy.choose_order_to_attack(&graph);
            prop_assert_eq!(order.len(), graph.len());
            prop_assert!(check_permutation(&graph, &order).is_ok());
        }
    }

    #[test]
    fn prop_incremental_greedy_matches_rescan(graph in arb_graph(30), discount in prop::sample::select(vec![0.0, 0.2, 0.5, 1.0])) {
        let incremental = GreedyStrategy::new(discount).choose_order_to_attack(&graph);
        let rescan = RescanGreedyStrategy::new(discount, PenaltyModel::Static)
            .choose_order_to_attack(&graph);
        prop_assert_eq!(
            compute_gold_for_order(&graph, &incremental).unwrap(),
            compute_gold_for_order(&graph, &rescan).unwrap()
        );
        prop_assert_eq!(incremental, rescan);
    }

    #[test]
    fn prop_replay_follows_alert_rule(
        (graph, order) in arb_graph(15).prop_flat_map(|g| {
            let labels = labels(&g);
            (Just(g), Just(labels).prop_shuffle())
        })
    ) {
        let replay = replay(&graph, &order).unwrap();
        let mut attacked: Vec<usize> = Vec::new();
        let mut ever_alerted = vec![false; graph.len()];

        for record in &replay.records {
            let idx = graph.index_of(&record.label).unwrap();
            let caps = graph.caps(idx);
            let by_neighbour = attacked
                .iter()
                .any(|&a| graph.neighbours(a).contains(&idx) && !graph.caps(a).shield);
            prop_assert_eq!(record.alerted, caps.self_alert || by_neighbour);

            // Immune forts always keep their full value.
            if caps.immune {
                prop_assert_eq!(record.reward, record.value);
            }
            // Shield forts never alert anybody.
            if caps.shield {
                prop_assert!(record.newly_alerted.is_empty());
            }
            // Alert only grows: nobody is newly alerted twice.
            for label in &record.newly_alerted {
                let n = graph.index_of(label).unwrap();
                prop_assert!(!ever_alerted[n]);
                ever_alerted[n] = true;
            }
            attacked.push(idx);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_tree_dp_is_optimal_on_forests(graph in arb_forest(8)) {
        let order = TreeDpStrategy::new().choose_order_to_attack(&graph);
        let dp_gold = compute_gold_for_order(&graph, &order).unwrap();
        let best = brute_force_best(&graph);
        prop_assert!(
            dp_gold >= best - 1e-9,
            "dp {} below optimum {} for order {:?}",
            dp_gold,
            best,
            order
        );
    }
}
