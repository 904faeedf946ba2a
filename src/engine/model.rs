use std::collections::HashMap;

use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Primary,
    Secondary,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub size: f32,
    /// Backend color hint, used when no cluster claims the node.
    pub color: Option<String>,
    pub metadata: Map<String, Value>,
    pub cluster_id: Option<String>,
    pub palette_index: Option<usize>,
    pub connection_count: usize,
    pub tier: Tier,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub source: usize,
    pub target: usize,
    pub label: String,
    pub strength: f32,
    pub dashed: bool,
}

impl Edge {
    /// The endpoint opposite `index`, when `index` is one of the endpoints.
    pub fn other(&self, index: usize) -> Option<usize> {
        if self.source == index {
            Some(self.target)
        } else if self.target == index {
            Some(self.source)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub coherence_score: f32,
    pub member_ids: Vec<String>,
    pub palette_index: usize,
}

/// Immutable normalized graph. Swapped wholesale on every refresh.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub clusters: Vec<Cluster>,
    pub version: u64,
    pub(super) index_by_id: HashMap<String, usize>,
    pub(super) incident: Vec<Vec<usize>>,
    pub(super) max_connections: usize,
}

impl GraphSnapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// Indices into `edges` touching node `index`.
    pub fn incident_edges(&self, index: usize) -> &[usize] {
        self.incident.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct neighbor indices of node `index`, in edge order.
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &edge_index in self.incident_edges(index) {
            let Some(other) = self.edges[edge_index].other(index) else {
                continue;
            };
            if other != index && !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Connection count relative to the best-connected node, in `[0, 1]`.
    pub fn importance(&self, index: usize) -> f32 {
        if self.max_connections == 0 {
            return 0.0;
        }
        self.nodes
            .get(index)
            .map(|node| node.connection_count as f32 / self.max_connections as f32)
            .unwrap_or(0.0)
    }

    pub fn cluster(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.id == id)
    }

    pub fn primary_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.tier == Tier::Primary)
            .count()
    }
}
