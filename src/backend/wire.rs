use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
    #[serde(default)]
    pub clusters: Vec<RawCluster>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_node_size")]
    pub size: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A link as the backend sends it. Missing or null fields fall back to defaults; an edge
/// left without an endpoint is dropped at ingest.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default = "default_edge_strength", deserialize_with = "null_as_edge_strength")]
    pub strength: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dashed: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawCluster {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub coherence_score: f32,
    #[serde(default)]
    pub concept_ids: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GraphStats {
    #[serde(default)]
    pub concepts: usize,
    #[serde(default)]
    pub links: usize,
    #[serde(default)]
    pub clusters: usize,
}

fn default_node_size() -> f32 {
    1.0
}

fn default_edge_strength() -> f32 {
    0.5
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_edge_strength<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or_else(default_edge_strength))
}
