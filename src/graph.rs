//! Graph Model
//!
//! The fixed problem instance: labelled nodes and weighted directed edges.
//! Edge insertion order doubles as the relaxation order, so the stepper can
//! address the k-th edge of a pass directly by index.

use eyre::{eyre, Result};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Declarative form of the instance, as it appears in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSpec {
    pub nodes: Vec<String>,
    pub edges: Vec<EdgeDef>,
}

/// One directed weighted edge as declared in the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDef {
    pub from: String,
    pub to: String,
    pub weight: i64,
}

impl GraphSpec {
    /// The built-in five-node instance the simulator ships with.
    pub fn sample() -> Self {
        let nodes = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let edges = [
            ("A", "B", 4),
            ("A", "C", 2),
            ("B", "C", 1),
            ("B", "D", 5),
            ("C", "D", 8),
            ("C", "E", 10),
            ("D", "B", -4),
            ("E", "D", 2),
        ]
        .iter()
        .map(|&(from, to, weight)| EdgeDef {
            from: from.to_string(),
            to: to.to_string(),
            weight,
        })
        .collect();

        Self { nodes, edges }
    }
}

/// A resolved edge, ready for relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaxEdge {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub weight: i64,
}

/// The immutable problem graph.
///
/// Built once at startup from a [`GraphSpec`] and never mutated afterwards.
/// Node indices follow declaration order, which is also the display order.
#[derive(Debug)]
pub struct GraphModel {
    graph: DiGraph<String, i64>,
    label_to_node: HashMap<String, NodeIndex>,
}

impl GraphModel {
    /// Build the graph from its declarative form.
    ///
    /// An edge referencing an unknown node or a duplicated node label is a
    /// configuration error and fails construction outright.
    pub fn from_spec(spec: &GraphSpec) -> Result<Self> {
        if spec.nodes.is_empty() {
            return Err(eyre!("graph instance has no nodes"));
        }

        let mut graph = DiGraph::new();
        let mut label_to_node = HashMap::new();

        for label in &spec.nodes {
            if label_to_node.contains_key(label) {
                return Err(eyre!("duplicate node label '{}'", label));
            }
            let node = graph.add_node(label.clone());
            label_to_node.insert(label.clone(), node);
        }

        for edge in &spec.edges {
            let from = *label_to_node
                .get(&edge.from)
                .ok_or_else(|| eyre!("edge {}→{} references unknown node '{}'", edge.from, edge.to, edge.from))?;
            let to = *label_to_node
                .get(&edge.to)
                .ok_or_else(|| eyre!("edge {}→{} references unknown node '{}'", edge.from, edge.to, edge.to))?;
            graph.add_edge(from, to, edge.weight);
        }

        info!(
            "Graph built: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            graph,
            label_to_node,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Upper bound on full relaxation passes: |V| − 1.
    pub fn iteration_bound(&self) -> usize {
        self.graph.node_count().saturating_sub(1)
    }

    pub fn node(&self, label: &str) -> Option<NodeIndex> {
        self.label_to_node.get(label).copied()
    }

    pub fn label(&self, node: NodeIndex) -> &str {
        &self.graph[node]
    }

    /// Nodes in declaration order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// The edge at a given position in relaxation order.
    pub fn edge_at(&self, index: usize) -> Option<RelaxEdge> {
        let edge = EdgeIndex::new(index);
        let (from, to) = self.graph.edge_endpoints(edge)?;
        let weight = *self.graph.edge_weight(edge)?;
        Some(RelaxEdge { from, to, weight })
    }

    /// All edges in relaxation order.
    pub fn edges(&self) -> impl Iterator<Item = RelaxEdge> + '_ {
        (0..self.edge_count()).filter_map(|i| self.edge_at(i))
    }

    /// Resolve the source node: an explicit label, or the first declared node.
    pub fn resolve_source(&self, label: Option<&str>) -> Result<NodeIndex> {
        match label {
            Some(label) => self
                .node(label)
                .ok_or_else(|| eyre!("source node '{}' is not in the graph", label)),
            None => self
                .node_indices()
                .next()
                .ok_or_else(|| eyre!("graph has no nodes")),
        }
    }
}
