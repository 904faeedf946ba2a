use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{Color32, Vec2};
use rand::Rng;

use super::frame::{CameraPose, EdgeVisual, NodePose, NodeVisual};
use super::layout::LayoutEngine;
use super::model::{GraphSnapshot, Node, Tier};
use super::store::PALETTE;
use crate::config::{FocusConfig, LayoutConfig};
use crate::util::parse_hex_color;

const DEFAULT_NODE_COLOR: Color32 = Color32::from_rgb(148, 163, 184);
const TOPIC_COLOR: Color32 = Color32::from_rgb(139, 92, 246);

#[derive(Clone, Debug, PartialEq)]
pub enum EdgeVisibility {
    All,
    Only(HashSet<usize>),
    Hidden,
}

/// Render arena for one snapshot: layout bodies plus per-node visual state, both indexed
/// by node index and rebuilt only when the snapshot changes.
pub struct Scene {
    pub snapshot: Arc<GraphSnapshot>,
    pub layout: LayoutEngine,
    pub visuals: Vec<NodeVisual>,
    pub edge_visibility: EdgeVisibility,
    pub camera: CameraPose,
    pub rotation: f32,
}

impl Scene {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            snapshot: Arc::new(GraphSnapshot::default()),
            layout: LayoutEngine::new(layout),
            visuals: Vec::new(),
            edge_visibility: EdgeVisibility::All,
            camera: CameraPose::default(),
            rotation: 0.0,
        }
    }

    pub fn rebuild(
        &mut self,
        snapshot: Arc<GraphSnapshot>,
        focus: &FocusConfig,
        rng: &mut impl Rng,
    ) {
        self.layout.seed(&snapshot, rng);
        self.visuals = snapshot
            .nodes
            .iter()
            .zip(self.layout.bodies())
            .map(|(node, body)| {
                let pose = tier_pose(node.tier, body.position, body.depth, focus);
                NodeVisual {
                    position: pose.position,
                    depth: pose.depth,
                    tier: node.tier,
                    opacity: pose.opacity,
                    scale: pose.scale,
                    label_visible: node.tier == Tier::Primary,
                    color: node_color(node),
                }
            })
            .collect();
        self.snapshot = snapshot;
        self.edge_visibility = EdgeVisibility::All;
    }

    /// Copies simulated positions into the visuals of bodies no animation controls.
    pub fn sync_from_layout(&mut self) {
        for (visual, body) in self.visuals.iter_mut().zip(self.layout.bodies()) {
            if !body.pinned {
                visual.position = body.position;
                visual.depth = body.depth;
            }
        }
    }

    pub fn poses(&self) -> Vec<NodePose> {
        self.visuals.iter().map(NodeVisual::pose).collect()
    }

    pub fn edge_visuals(&self) -> Vec<EdgeVisual> {
        let focused_only = matches!(self.edge_visibility, EdgeVisibility::Only(_));
        self.snapshot
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let from = self.visuals.get(edge.source)?;
                let to = self.visuals.get(edge.target)?;
                let visible = match &self.edge_visibility {
                    EdgeVisibility::All => true,
                    EdgeVisibility::Only(edges) => edges.contains(&index),
                    EdgeVisibility::Hidden => false,
                };
                let emphasis = if focused_only {
                    0.8
                } else {
                    0.18 + edge.strength * 0.3
                };
                Some(EdgeVisual {
                    edge: index,
                    from: from.position,
                    to: to.position,
                    opacity: emphasis * from.opacity.min(to.opacity),
                    color: from.color,
                    visible,
                    dashed: edge.dashed,
                })
            })
            .collect()
    }
}

/// Resting emphasis for a tier in the full view.
pub fn tier_pose(
    tier: Tier,
    position: Vec2,
    depth: f32,
    config: &FocusConfig,
) -> NodePose {
    let (opacity, scale) = match tier {
        Tier::Primary => (1.0, 1.0),
        Tier::Secondary => (config.secondary_opacity, 0.7),
    };
    NodePose {
        position,
        depth,
        opacity,
        scale,
    }
}

/// Cluster palette first, then the backend hint, then a per-kind default.
pub fn node_color(node: &Node) -> Color32 {
    node.palette_index
        .and_then(|index| parse_hex_color(PALETTE[index % PALETTE.len()]))
        .or_else(|| node.color.as_deref().and_then(parse_hex_color))
        .unwrap_or(match node.kind.as_str() {
            "topic" => TOPIC_COLOR,
            _ => DEFAULT_NODE_COLOR,
        })
}
