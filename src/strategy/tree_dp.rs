//! # Tree DP Strategy
//!
//! Exact ordering for forests. Each component is walked once, depth first,
//! from its first fort in enumeration order. An edge into an already-visited
//! fort is treated as absent, so on a graph with cycles the result is exact
//! for the spanning forest the walk discovers and a heuristic otherwise.
//!
//! Every fort gets two plans, one per hypothesis about its parent:
//!
//! ```text
//! calm    = parent has not put this fort on alert
//! alerted = parent was attacked first and put it on alert
//! ```
//!
//! Each plan covers the fort's whole subtree and is the best of:
//!
//! ```text
//! early = [fort] ++ child plans       (alerted plans unless fort has Shield)
//! late  = calm child plans ++ [fort]  (fort alerted if any child lacks Shield)
//! split = shielded calm plans ++ [fort] ++ remaining children as in early
//! ```
//!
//! `late` wins only if strictly better than `early`; `split` only if strictly
//! better than that winner. Without Shield forts `split` is identical to
//! `early`, so it never changes the early/late outcome there.

use log::{debug, info, warn};

use super::RaidStrategy;
use crate::graph::FortGraph;
use crate::scoring::reward;
use crate::AttackOrder;

/// Exact tree dynamic-programming strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeDpStrategy;

/// An ordering of one subtree together with the gold it yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub order: Vec<usize>,
    pub gold: f64,
}

impl Plan {
    fn push(&mut self, fort: usize, gold: f64) {
        self.order.push(fort);
        self.gold += gold;
    }

    fn append(&mut self, other: &Plan) {
        self.order.extend_from_slice(&other.order);
        self.gold += other.gold;
    }
}

/// Both hypotheses for one fort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSolution {
    pub calm: Plan,
    pub alerted: Plan,
}

struct Frame {
    node: usize,
    cursor: usize,
    children: Vec<(usize, NodeSolution)>,
}

impl Frame {
    fn new(node: usize) -> Self {
        Self {
            node,
            cursor: 0,
            children: Vec::new(),
        }
    }
}

impl TreeDpStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Solve the component containing `root`, marking its forts visited.
    ///
    /// Iterative post-order walk; children are discovered in adjacency order
    /// and a neighbour is only claimed once the previous child's subtree is
    /// complete.
    pub fn solve_component(
        &self,
        graph: &FortGraph,
        root: usize,
        visited: &mut [bool],
    ) -> NodeSolution {
        visited[root] = true;
        let mut stack = vec![Frame::new(root)];
        let mut finished = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(&next) = graph.neighbours(frame.node).get(frame.cursor) {
                frame.cursor += 1;
                if !visited[next] {
                    visited[next] = true;
                    stack.push(Frame::new(next));
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let solution = solve_node(graph, done.node, &done.children);
            match stack.last_mut() {
                Some(parent) => parent.children.push((done.node, solution)),
                None => finished = Some(solution),
            }
        }

        finished.unwrap_or_default()
    }
}

/// Compute both plans for `node` from its already-solved children.
pub fn solve_node(graph: &FortGraph, node: usize, children: &[(usize, NodeSolution)]) -> NodeSolution {
    NodeSolution {
        calm: best_plan(graph, node, children, false),
        alerted: best_plan(graph, node, children, true),
    }
}

fn best_plan(graph: &FortGraph, node: usize, children: &[(usize, NodeSolution)], pre: bool) -> Plan {
    let caps = graph.caps(node);
    let value = graph.value(node);
    let alerted_from_above = pre || caps.self_alert;

    // The child plan used when this fort is attacked before the child.
    let after_me = |child: &NodeSolution| -> Plan {
        if caps.shield {
            child.calm.clone()
        } else {
            child.alerted.clone()
        }
    };

    let mut early = Plan::default();
    early.push(node, reward(value, alerted_from_above, caps.immune));
    for (_, child) in children {
        early.append(&after_me(child));
    }

    let mut late = Plan::default();
    let mut alerted_by_child = false;
    for (idx, child) in children {
        late.append(&child.calm);
        if graph.caps(*idx).propagates_alert() {
            alerted_by_child = true;
        }
    }
    late.push(
        node,
        reward(value, alerted_from_above || alerted_by_child, caps.immune),
    );

    let mut best = if late.gold > early.gold { late } else { early };

    let shielded = children.iter().filter(|(idx, _)| graph.caps(*idx).shield).count();
    if shielded > 0 && shielded < children.len() {
        let mut split = Plan::default();
        for (_, child) in children.iter().filter(|(idx, _)| graph.caps(*idx).shield) {
            split.append(&child.calm);
        }
        split.push(node, reward(value, alerted_from_above, caps.immune));
        for (_, child) in children.iter().filter(|(idx, _)| !graph.caps(*idx).shield) {
            split.append(&after_me(child));
        }
        if split.gold > best.gold {
            best = split;
        }
    }

    best
}

impl RaidStrategy for TreeDpStrategy {
    fn name(&self) -> &'static str {
        "tree-dp"
    }

    fn choose_order_to_attack(&self, graph: &FortGraph) -> AttackOrder {
        if !graph.is_forest() {
            warn!("tree-dp: graph has cycles, edges into visited forts will be ignored");
        }

        let mut visited = vec![false; graph.len()];
        let mut order = Vec::with_capacity(graph.len());
        let mut components = 0;
        let mut gold = 0.0;

        for root in 0..graph.len() {
            if visited[root] {
                continue;
            }
            let solution = self.solve_component(graph, root, &mut visited);
            debug!(
                "tree-dp: component rooted at {} covers {} forts for {:.2} gold",
                graph.label(root),
                solution.calm.order.len(),
                solution.calm.gold
            );
            components += 1;
            gold += solution.calm.gold;
            order.extend(solution.calm.order);
        }

        info!(
            "tree-dp: {} components, expected {:.2} gold",
            components, gold
        );

        order.into_iter().map(|i| graph.label(i).to_string()).collect()
    }
}
