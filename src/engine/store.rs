use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use super::model::{Cluster, Edge, GraphSnapshot, Node, Tier};
use crate::backend::RawGraph;

/// Cluster colors, cycled by cluster order.
pub const PALETTE: [&str; 12] = [
    "#8B5CF6", "#06B6D4", "#F59E0B", "#10B981", "#EF4444", "#3B82F6", "#EC4899", "#84CC16",
    "#F97316", "#14B8A6", "#A855F7", "#EAB308",
];

/// Normalizes a raw backend graph into an immutable snapshot.
///
/// Duplicate node ids keep the first occurrence, edges with a missing or unknown endpoint are
/// dropped, and the `primary_tier_size` most-connected nodes (stable by input order) become
/// [`Tier::Primary`].
pub fn ingest(raw: RawGraph, version: u64, primary_tier_size: usize) -> GraphSnapshot {
    let mut nodes = Vec::with_capacity(raw.nodes.len());
    let mut index_by_id = HashMap::with_capacity(raw.nodes.len());
    let mut duplicates = 0usize;

    for raw_node in raw.nodes {
        if index_by_id.contains_key(&raw_node.id) {
            duplicates += 1;
            continue;
        }
        index_by_id.insert(raw_node.id.clone(), nodes.len());
        let label = if raw_node.label.is_empty() {
            raw_node.id.clone()
        } else {
            raw_node.label
        };
        nodes.push(Node {
            id: raw_node.id,
            label,
            kind: raw_node.kind,
            size: raw_node.size,
            color: raw_node.color,
            metadata: raw_node.metadata,
            cluster_id: None,
            palette_index: None,
            connection_count: 0,
            tier: Tier::Secondary,
        });
    }

    let mut edges = Vec::with_capacity(raw.edges.len());
    let mut dangling = 0usize;
    for raw_edge in raw.edges {
        if raw_edge.source.is_empty() || raw_edge.target.is_empty() {
            dangling += 1;
            continue;
        }
        let (Some(&source), Some(&target)) = (
            index_by_id.get(&raw_edge.source),
            index_by_id.get(&raw_edge.target),
        ) else {
            dangling += 1;
            continue;
        };
        let strength = if raw_edge.strength.is_finite() {
            raw_edge.strength.clamp(0.0, 1.0)
        } else {
            0.0
        };
        edges.push(Edge {
            id: raw_edge.id,
            source_id: raw_edge.source,
            target_id: raw_edge.target,
            source,
            target,
            label: raw_edge.label,
            strength,
            dashed: raw_edge.dashed,
        });
    }

    let mut incident = vec![Vec::new(); nodes.len()];
    for (edge_index, edge) in edges.iter().enumerate() {
        nodes[edge.source].connection_count += 1;
        incident[edge.source].push(edge_index);
        if edge.target != edge.source {
            nodes[edge.target].connection_count += 1;
            incident[edge.target].push(edge_index);
        }
    }

    let mut clusters = Vec::with_capacity(raw.clusters.len());
    for (i, raw_cluster) in raw.clusters.into_iter().enumerate() {
        let palette_index = i % PALETTE.len();
        for member in &raw_cluster.concept_ids {
            if let Some(&index) = index_by_id.get(member) {
                nodes[index].palette_index = Some(palette_index);
                nodes[index].cluster_id = Some(raw_cluster.id.clone());
            }
        }
        clusters.push(Cluster {
            id: raw_cluster.id,
            name: raw_cluster.name,
            coherence_score: raw_cluster.coherence_score,
            member_ids: raw_cluster.concept_ids,
            palette_index,
        });
    }

    let mut ranked = (0..nodes.len()).collect::<Vec<_>>();
    ranked.sort_by(|&a, &b| nodes[b].connection_count.cmp(&nodes[a].connection_count));
    for &index in ranked.iter().take(primary_tier_size) {
        nodes[index].tier = Tier::Primary;
    }

    let max_connections = nodes
        .iter()
        .map(|node| node.connection_count)
        .max()
        .unwrap_or(0);

    if duplicates > 0 || dangling > 0 {
        debug!(duplicates, dangling, "dropped malformed graph entries");
    }

    GraphSnapshot {
        nodes,
        edges,
        clusters,
        version,
        index_by_id,
        incident,
        max_connections,
    }
}

/// Holds the current snapshot plus the session-scoped auto-build guard.
pub struct GraphDataStore {
    snapshot: Arc<GraphSnapshot>,
    version: u64,
    primary_tier_size: usize,
    active_collection: Option<String>,
    auto_built: HashSet<String>,
}

impl GraphDataStore {
    pub fn new(primary_tier_size: usize) -> Self {
        Self {
            snapshot: Arc::new(GraphSnapshot::default()),
            version: 0,
            primary_tier_size,
            active_collection: None,
            auto_built: HashSet::new(),
        }
    }

    pub fn snapshot(&self) -> &Arc<GraphSnapshot> {
        &self.snapshot
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn replace(&mut self, raw: RawGraph) -> Arc<GraphSnapshot> {
        self.version += 1;
        let snapshot = Arc::new(ingest(raw, self.version, self.primary_tier_size));
        info!(
            version = self.version,
            nodes = snapshot.node_count(),
            edges = snapshot.edge_count(),
            clusters = snapshot.clusters.len(),
            "graph snapshot replaced"
        );
        self.snapshot = Arc::clone(&snapshot);
        snapshot
    }

    pub fn active_collection(&self) -> Option<&str> {
        self.active_collection.as_deref()
    }

    pub fn set_active_collection(&mut self, collection_id: Option<String>) {
        if self.active_collection != collection_id {
            self.auto_built.clear();
            self.active_collection = collection_id;
        }
    }

    /// Whether an empty snapshot should trigger a one-time build for `collection_id`.
    /// Returns `true` at most once per collection until the active collection changes.
    pub fn should_auto_build(
        &mut self,
        collection_id: &str,
        source_count: usize,
        min_sources: usize,
    ) -> bool {
        if !self.snapshot.is_empty() || source_count < min_sources {
            return false;
        }
        self.auto_built.insert(collection_id.to_owned())
    }
}
