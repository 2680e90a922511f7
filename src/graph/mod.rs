// Sherwood - Fort Graph
// mod.rs - Module exports and FortGraph (the read-only graph model)
//
// The graph is built once, validated at the boundary, and then shared
// read-only by every strategy and by the scoring oracle.
//
// Copyright (c) 2026 CIPS Corps. All rights reserved.

pub mod nodes;

use std::collections::HashMap;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use nodes::{Capabilities, Fort};

/// On-disk representation of a graph.
///
/// ```json
/// { "forts": [{ "label": "A", "value": 10.0, "shield": true }],
///   "edges": [["A", "B"]] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFile {
    pub forts: Vec<Fort>,
    #[serde(default)]
    pub edges: Vec<(String, String)>,
}

/// Undirected labelled graph of forts.
///
/// Vertices keep their insertion order, which is the stable enumeration
/// order every strategy relies on for determinism. Adjacency lists keep
/// edge insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphFile", into = "GraphFile")]
pub struct FortGraph {
    forts: Vec<Fort>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
}

impl FortGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from forts and label pairs, validating every reference.
    pub fn from_parts<I, A, B>(forts: Vec<Fort>, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut graph = Self::new();
        for fort in forts {
            graph.add_fort(fort)?;
        }
        for (a, b) in edges {
            graph.add_edge(a.as_ref(), b.as_ref())?;
        }
        Ok(graph)
    }

    /// Add a fort. Labels must be unique and values finite and non-negative.
    pub fn add_fort(&mut self, fort: Fort) -> Result<usize, GraphError> {
        if !fort.value.is_finite() || fort.value < 0.0 {
            return Err(GraphError::InvalidValue {
                label: fort.label,
                value: fort.value,
            });
        }
        if self.index.contains_key(&fort.label) {
            return Err(GraphError::DuplicateLabel(fort.label));
        }
        let idx = self.forts.len();
        self.index.insert(fort.label.clone(), idx);
        self.forts.push(fort);
        self.adjacency.push(Vec::new());
        Ok(idx)
    }

    /// Add an undirected edge between two existing forts.
    ///
    /// Both endpoints must already exist; a reference to a missing fort is a
    /// `DanglingNeighbor` error. Repeated edges and self-loops are dropped.
    pub fn add_edge(&mut self, a: &str, b: &str) -> Result<(), GraphError> {
        let ia = self.require(a, b)?;
        let ib = self.require(b, a)?;

        if ia == ib {
            warn!("Ignoring self-loop on fort {}", a);
            return Ok(());
        }
        if self.adjacency[ia].contains(&ib) {
            return Ok(());
        }
        self.adjacency[ia].push(ib);
        self.adjacency[ib].push(ia);
        Ok(())
    }

    fn require(&self, label: &str, from: &str) -> Result<usize, GraphError> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| GraphError::DanglingNeighbor {
                from: from.to_string(),
                to: label.to_string(),
            })
    }

    /// Number of forts.
    pub fn len(&self) -> usize {
        self.forts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forts.is_empty()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// All forts in enumeration order.
    pub fn forts(&self) -> &[Fort] {
        &self.forts
    }

    pub fn fort(&self, idx: usize) -> &Fort {
        &self.forts[idx]
    }

    /// All labels in enumeration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.forts.iter().map(|f| f.label.as_str())
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn label(&self, idx: usize) -> &str {
        &self.forts[idx].label
    }

    pub fn value(&self, idx: usize) -> f64 {
        self.forts[idx].value
    }

    pub fn caps(&self, idx: usize) -> Capabilities {
        self.forts[idx].capabilities
    }

    /// Neighbour indices of a fort, in edge insertion order.
    pub fn neighbours(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }

    /// Base value of the fort with this label.
    pub fn value_at(&self, label: &str) -> Option<f64> {
        self.index_of(label).map(|i| self.value(i))
    }

    /// Capability triple of the fort with this label.
    pub fn capabilities(&self, label: &str) -> Option<Capabilities> {
        self.index_of(label).map(|i| self.caps(i))
    }

    /// Labels adjacent to `label`.
    pub fn adjacent(&self, label: &str) -> Option<Vec<&str>> {
        self.index_of(label)
            .map(|i| self.adjacency[i].iter().map(|&n| self.label(n)).collect())
    }

    /// Connected components, each listed in discovery order.
    /// Components are ordered by their first fort in enumeration order.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.len()];
        let mut components = Vec::new();

        for root in 0..self.len() {
            if seen[root] {
                continue;
            }
            seen[root] = true;
            let mut component = Vec::new();
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                component.push(node);
                for &n in &self.adjacency[node] {
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    /// True if the graph has no cycles. An undirected graph is a forest
    /// exactly when `edges = vertices - components`.
    pub fn is_forest(&self) -> bool {
        self.edge_count() + self.components().len() == self.len()
    }

    /// Summary statistics for reporting.
    pub fn stats(&self) -> GraphStats {
        let components = self.components().len();
        GraphStats {
            forts: self.len(),
            edges: self.edge_count(),
            components,
            is_forest: self.edge_count() + components == self.len(),
            total_value: self.forts.iter().map(|f| f.value).sum(),
        }
    }

    /// Load and validate a graph from a JSON file.
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let json = std::fs::read_to_string(path).map_err(|e| GraphError::Io(e.to_string()))?;
        let file: GraphFile =
            serde_json::from_str(&json).map_err(|e| GraphError::Serialization(e.to_string()))?;
        FortGraph::try_from(file)
    }

    /// Save the graph to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), GraphError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GraphError::Serialization(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| GraphError::Io(e.to_string()))?;
        Ok(())
    }
}

impl TryFrom<GraphFile> for FortGraph {
    type Error = GraphError;

    fn try_from(file: GraphFile) -> Result<Self, Self::Error> {
        FortGraph::from_parts(file.forts, file.edges)
    }
}

impl From<FortGraph> for GraphFile {
    fn from(graph: FortGraph) -> Self {
        let mut edges = Vec::with_capacity(graph.edge_count());
        for (i, neighbours) in graph.adjacency.iter().enumerate() {
            for &j in neighbours {
                if i < j {
                    edges.push((graph.label(i).to_string(), graph.label(j).to_string()));
                }
            }
        }
        GraphFile {
            forts: graph.forts,
            edges,
        }
    }
}

/// Summary statistics about a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub forts: usize,
    pub edges: usize,
    pub components: usize,
    pub is_forest: bool,
    pub total_value: f64,
}

/// Errors raised while building or loading a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    DuplicateLabel(String),
    DanglingNeighbor { from: String, to: String },
    UnknownVertex(String),
    InvalidValue { label: String, value: f64 },
    Io(String),
    Serialization(String),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateLabel(label) => write!(f, "Duplicate fort label: {}", label),
            GraphError::DanglingNeighbor { from, to } => {
                write!(f, "Fort {} references missing neighbour {}", from, to)
            }
            GraphError::UnknownVertex(label) => write!(f, "Unknown fort: {}", label),
            GraphError::InvalidValue { label, value } => {
                write!(f, "Fort {} has invalid value {}", label, value)
            }
            GraphError::Io(msg) => write!(f, "IO error: {}", msg),
            GraphError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for GraphError {}
