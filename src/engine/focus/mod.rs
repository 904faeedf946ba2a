mod history;
mod rings;

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use super::frame::{CameraPose, NodePose};
use super::model::Tier;
use super::scene::{EdgeVisibility, Scene, tier_pose};
use super::tween::Tween;
use crate::config::FocusConfig;
pub use history::NavigationHistory;
pub use rings::{RingLayout, ViewDistance};
use rings::{assign_rings, labeled_count, sort_by_connections};

const FOCUSED_SCALE: f32 = 1.6;
const LABELED_SCALE: f32 = 1.1;
const DIM_SCALE: f32 = 0.75;
const FADED_SCALE: f32 = 0.6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("unknown concept `{0}`")]
    UnknownNode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusPhase {
    Idle,
    Focused(usize),
}

#[derive(Clone, Debug)]
struct HomeLayout {
    poses: Vec<NodePose>,
    camera: CameraPose,
}

#[derive(Clone, Debug)]
enum TransitionKind {
    Focus { edges: HashSet<usize> },
    Reset,
}

#[derive(Clone, Debug)]
struct Transition {
    generation: u64,
    nodes: Tween<Vec<NodePose>>,
    camera: Tween<CameraPose>,
    kind: TransitionKind,
}

pub struct FocusNavigator {
    config: FocusConfig,
    focused: Option<usize>,
    connected: Vec<usize>,
    rings: RingLayout,
    history: NavigationHistory,
    home: Option<HomeLayout>,
    transition: Option<Transition>,
    generation: u64,
    ambient: bool,
}

impl FocusNavigator {
    pub fn new(config: FocusConfig) -> Self {
        let history = NavigationHistory::new(config.history_limit);
        Self {
            config,
            focused: None,
            connected: Vec::new(),
            rings: RingLayout::default(),
            history,
            home: None,
            transition: None,
            generation: 0,
            ambient: true,
        }
    }

    pub fn phase(&self) -> FocusPhase {
        match self.focused {
            Some(index) => FocusPhase::Focused(index),
            None => FocusPhase::Idle,
        }
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Neighbors of the focused node, best-connected first.
    pub fn connected(&self) -> &[usize] {
        &self.connected
    }

    pub fn rings(&self) -> &RingLayout {
        &self.rings
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn ambient_rotation(&self) -> bool {
        self.ambient && self.transition.is_none()
    }

    /// Drops all focus state; used when the snapshot is replaced.
    pub fn clear(&mut self) {
        self.focused = None;
        self.connected.clear();
        self.rings = RingLayout::default();
        self.history.clear();
        self.home = None;
        self.transition = None;
        self.generation += 1;
        self.ambient = true;
    }

    pub fn focus(&mut self, id: &str, scene: &mut Scene, now: f64) -> Result<(), NavigationError> {
        let snapshot = scene.snapshot.clone();
        let index = snapshot
            .index_of(id)
            .ok_or_else(|| NavigationError::UnknownNode(id.to_owned()))?;

        if self.home.is_none() {
            self.home = Some(HomeLayout {
                poses: scene.poses(),
                camera: scene.camera,
            });
        }

        let mut connected = snapshot.neighbors(index);
        sort_by_connections(&snapshot, &mut connected);
        let rings = assign_rings(&connected, &self.config);
        let labeled = labeled_count(connected.len());
        let distance = ViewDistance::for_connected(connected.len());
        let center = scene.visuals[index].position;

        let start = scene.poses();
        let mut end = start
            .iter()
            .map(|pose| NodePose {
                opacity: self.config.faded_opacity,
                scale: FADED_SCALE,
                ..*pose
            })
            .collect::<Vec<_>>();
        end[index] = NodePose {
            position: center,
            depth: 0.0,
            opacity: 1.0,
            scale: FOCUSED_SCALE,
        };

        for visual in &mut scene.visuals {
            visual.label_visible = false;
        }
        scene.visuals[index].label_visible = true;

        for (rank, slot) in rings.slots.iter().enumerate() {
            let emphasized = rank < labeled;
            end[slot.node] = NodePose {
                position: center + slot.offset(),
                depth: slot.depth(self.config.depth_spread),
                opacity: if emphasized {
                    1.0
                } else {
                    self.config.dim_opacity
                },
                scale: if emphasized { LABELED_SCALE } else { DIM_SCALE },
            };
            scene.visuals[slot.node].label_visible = emphasized;
        }

        scene.layout.unpin_all();
        scene.layout.set_pinned(index, true);
        for &node in &connected {
            scene.layout.set_pinned(node, true);
        }

        let connected_set = connected.iter().copied().collect::<HashSet<_>>();
        let edges = snapshot
            .incident_edges(index)
            .iter()
            .copied()
            .filter(|&edge| {
                snapshot.edges[edge]
                    .other(index)
                    .is_some_and(|other| other != index && connected_set.contains(&other))
            })
            .collect();

        let camera_target = CameraPose {
            center,
            zoom: distance.zoom(&self.config),
        };

        self.generation += 1;
        self.transition = Some(Transition {
            generation: self.generation,
            nodes: Tween::new(now, self.config.duration_secs, start, end),
            camera: Tween::new(now, self.config.duration_secs, scene.camera, camera_target),
            kind: TransitionKind::Focus { edges },
        });
        scene.edge_visibility = EdgeVisibility::Hidden;

        info!(
            concept = id,
            connected = connected.len(),
            rings = rings.slots.last().map_or(0, |slot| slot.ring_index + 1),
            ?distance,
            "focused concept"
        );

        self.focused = Some(index);
        self.connected = connected;
        self.rings = rings;
        self.ambient = false;
        self.history.push(id);
        Ok(())
    }

    /// Returns to the previous focus, or to the full view when there is nothing to go back to.
    pub fn back(&mut self, scene: &mut Scene, now: f64) -> Result<(), NavigationError> {
        if self.history.len() < 2 {
            self.reset_to_full_view(scene, now);
            return Ok(());
        }

        self.history.pop();
        match self.history.top().map(str::to_owned) {
            Some(previous) => self.focus(&previous, scene, now),
            None => {
                self.reset_to_full_view(scene, now);
                Ok(())
            }
        }
    }

    pub fn reset_to_full_view(&mut self, scene: &mut Scene, now: f64) {
        // Kept until the reset lands so an interrupting focus or reset still targets it.
        let home = self.home.clone();
        self.focused = None;
        self.connected.clear();
        self.rings = RingLayout::default();
        self.history.clear();
        self.generation += 1;

        let Some(home) = home else {
            // Nothing was ever moved; settle immediately.
            self.transition = None;
            self.settle_full_view(scene);
            return;
        };

        let start = scene.poses();
        let end = scene
            .visuals
            .iter()
            .enumerate()
            .map(|(index, visual)| {
                let resting = home.poses.get(index).copied().unwrap_or_else(|| visual.pose());
                tier_pose(visual.tier, resting.position, resting.depth, &self.config)
            })
            .collect();

        for (index, visual) in scene.visuals.iter_mut().enumerate() {
            visual.label_visible = visual.tier == Tier::Primary;
            scene.layout.set_pinned(index, true);
        }

        self.transition = Some(Transition {
            generation: self.generation,
            nodes: Tween::new(now, self.config.reset_duration_secs, start, end),
            camera: Tween::new(
                now,
                self.config.reset_duration_secs,
                scene.camera,
                home.camera,
            ),
            kind: TransitionKind::Reset,
        });
        scene.edge_visibility = EdgeVisibility::Hidden;
        info!("returning to full view");
    }

    /// Writes the in-flight animation into the scene. Returns whether one is running.
    pub fn advance(&mut self, scene: &mut Scene, now: f64) -> bool {
        let Some(transition) = &self.transition else {
            return false;
        };

        let poses = transition.nodes.value_at(now);
        for (index, pose) in poses.iter().enumerate() {
            let pinned = scene.layout.body(index).is_some_and(|body| body.pinned);
            let Some(visual) = scene.visuals.get_mut(index) else {
                continue;
            };
            if pinned {
                visual.apply(pose);
                scene.layout.place(index, pose.position, pose.depth);
            } else {
                visual.opacity = pose.opacity;
                visual.scale = pose.scale;
            }
        }
        scene.camera = transition.camera.value_at(now);

        let finished = transition.nodes.is_finished(now) && transition.camera.is_finished(now);
        let generation = transition.generation;
        if finished {
            self.complete(generation, scene);
        }
        true
    }

    /// Finishes the transition started as `generation`. Superseded generations are ignored.
    pub fn complete(&mut self, generation: u64, scene: &mut Scene) {
        let Some(transition) = self.transition.take_if(|t| t.generation == generation) else {
            debug!(generation, current = self.generation, "ignoring stale transition");
            return;
        };

        match transition.kind {
            TransitionKind::Focus { edges } => {
                scene.edge_visibility = EdgeVisibility::Only(edges);
            }
            TransitionKind::Reset => {
                self.home = None;
                self.settle_full_view(scene);
            }
        }
    }

    fn settle_full_view(&mut self, scene: &mut Scene) {
        scene.edge_visibility = EdgeVisibility::All;
        scene.layout.unpin_all();
        self.ambient = true;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::backend::{RawEdge, RawGraph, RawNode};
    use crate::config::LayoutConfig;
    use crate::engine::store::ingest;

    fn raw(nodes: &[&str], edges: &[(&str, &str)]) -> RawGraph {
        RawGraph {
            nodes: nodes
                .iter()
                .map(|id| RawNode {
                    id: (*id).to_owned(),
                    label: id.to_uppercase(),
                    kind: "concept".to_owned(),
                    color: None,
                    size: 1.0,
                    metadata: Default::default(),
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(a, b)| RawEdge {
                    id: format!("{a}-{b}"),
                    source: (*a).to_owned(),
                    target: (*b).to_owned(),
                    label: String::new(),
                    strength: 0.5,
                    dashed: false,
                })
                .collect(),
            clusters: vec![],
        }
    }

    fn scene(graph: RawGraph) -> Scene {
        let mut scene = Scene::new(LayoutConfig::default());
        scene.rebuild(
            Arc::new(ingest(graph, 1, 25)),
            &FocusConfig::default(),
            &mut StdRng::seed_from_u64(3),
        );
        scene.layout.halt();
        scene
    }

    fn abc() -> Scene {
        scene(raw(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c")]))
    }

    fn navigator() -> FocusNavigator {
        FocusNavigator::new(FocusConfig::default())
    }

    fn settle(nav: &mut FocusNavigator, scene: &mut Scene, now: f64) {
        while nav.advance(scene, now) {}
    }

    #[test]
    fn focus_on_middle_node_rings_both_neighbors() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.focus("b", &mut scene, 0.0).expect("b exists");

        assert_eq!(scene.snapshot.nodes[0].connection_count, 1);
        assert_eq!(scene.snapshot.nodes[1].connection_count, 2);
        assert_eq!(scene.snapshot.nodes[2].connection_count, 1);
        assert_eq!(nav.phase(), FocusPhase::Focused(1));
        assert_eq!(nav.connected(), &[0, 2]);
        assert_eq!(nav.rings().ring_size, 8);
        assert!(nav.rings().slots.iter().all(|slot| slot.ring_index == 0));
        assert_eq!(nav.history().top(), Some("b"));
    }

    #[test]
    fn focus_completion_shows_only_focus_edges() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.focus("b", &mut scene, 0.0).expect("b exists");
        assert_eq!(scene.edge_visibility, EdgeVisibility::Hidden);

        nav.advance(&mut scene, 0.4);
        assert!(nav.is_animating());
        settle(&mut nav, &mut scene, 1.0);

        assert!(!nav.is_animating());
        assert_eq!(scene.edge_visibility, EdgeVisibility::Only(HashSet::from([0, 1])));
        assert_eq!(scene.visuals[1].scale, FOCUSED_SCALE);
        assert_eq!(scene.visuals[1].opacity, 1.0);
        assert!(scene.visuals[0].label_visible);
        assert_eq!(scene.visuals[3].opacity, FocusConfig::default().faded_opacity);
        assert!(!scene.visuals[3].label_visible);
        assert_eq!(scene.camera.center, scene.visuals[1].position);
        assert!(!nav.ambient_rotation());
    }

    #[test]
    fn ring_positions_surround_focus() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.focus("b", &mut scene, 0.0).expect("b exists");
        settle(&mut nav, &mut scene, 1.0);

        let center = scene.visuals[1].position;
        let radius = FocusConfig::default().ring_base_radius;
        for neighbor in [0, 2] {
            let distance = (scene.visuals[neighbor].position - center).length();
            assert!((distance - radius).abs() < 1.0, "neighbor {neighbor} at {distance}");
        }
    }

    #[test]
    fn isolated_focus_has_empty_rings() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.focus("d", &mut scene, 0.0).expect("d exists");
        settle(&mut nav, &mut scene, 1.0);

        assert!(nav.connected().is_empty());
        assert!(nav.rings().slots.is_empty());
        assert_eq!(scene.edge_visibility, EdgeVisibility::Only(HashSet::new()));
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn unknown_node_is_rejected() {
        let mut scene = abc();
        let mut nav = navigator();
        assert_eq!(
            nav.focus("zzz", &mut scene, 0.0),
            Err(NavigationError::UnknownNode("zzz".to_owned()))
        );
        assert_eq!(nav.phase(), FocusPhase::Idle);
        assert!(nav.history().is_empty());
        assert!(!nav.is_animating());
    }

    #[test]
    fn back_with_single_entry_resets() {
        let mut scene = abc();
        let home = scene.poses();
        let home_camera = scene.camera;
        let mut nav = navigator();
        nav.focus("a", &mut scene, 0.0).expect("a exists");
        settle(&mut nav, &mut scene, 1.0);

        nav.back(&mut scene, 2.0).expect("back succeeds");
        assert_eq!(nav.phase(), FocusPhase::Idle);
        assert!(nav.history().is_empty());
        settle(&mut nav, &mut scene, 3.0);

        assert_eq!(scene.edge_visibility, EdgeVisibility::All);
        assert_eq!(scene.camera, home_camera);
        assert!(nav.ambient_rotation());
        assert!(scene.layout.bodies().iter().all(|body| !body.pinned));
        for (pose, visual) in home.iter().zip(&scene.visuals) {
            assert!((pose.position - visual.position).length() < 1e-3);
            assert_eq!(pose.opacity, visual.opacity);
        }
    }

    #[test]
    fn back_with_empty_history_equals_reset() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.back(&mut scene, 0.0).expect("back succeeds");
        assert_eq!(nav.phase(), FocusPhase::Idle);
        assert_eq!(scene.edge_visibility, EdgeVisibility::All);
        assert!(nav.ambient_rotation());
    }

    #[test]
    fn back_returns_to_previous_focus() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.focus("a", &mut scene, 0.0).expect("a exists");
        nav.focus("b", &mut scene, 0.1).expect("b exists");
        assert_eq!(nav.history().len(), 2);

        nav.back(&mut scene, 0.2).expect("back succeeds");
        assert_eq!(nav.phase(), FocusPhase::Focused(0));
        assert_eq!(nav.history().recent().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn history_cap_across_focus_calls() {
        let names = (0..12).map(|i| format!("n{i}")).collect::<Vec<_>>();
        let ids = names.iter().map(String::as_str).collect::<Vec<_>>();
        let mut scene = scene(raw(&ids, &[]));
        let mut nav = navigator();
        for id in &ids {
            nav.focus(id, &mut scene, 0.0).expect("node exists");
        }
        nav.focus("n11", &mut scene, 0.0).expect("node exists");
        assert_eq!(nav.history().len(), 10);
        assert_eq!(nav.history().top(), Some("n11"));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.focus("b", &mut scene, 0.0).expect("b exists");
        settle(&mut nav, &mut scene, 1.0);

        nav.reset_to_full_view(&mut scene, 2.0);
        settle(&mut nav, &mut scene, 3.0);
        let visuals = scene.visuals.clone();
        let camera = scene.camera;

        nav.reset_to_full_view(&mut scene, 4.0);
        settle(&mut nav, &mut scene, 5.0);

        assert_eq!(scene.visuals, visuals);
        assert_eq!(scene.camera, camera);
        assert_eq!(scene.edge_visibility, EdgeVisibility::All);
        assert_eq!(nav.phase(), FocusPhase::Idle);
        assert!(nav.history().is_empty());
    }

    #[test]
    fn reset_interrupted_by_reset_still_lands_home() {
        let mut scene = abc();
        let home = scene.poses();
        let home_camera = scene.camera;
        let mut nav = navigator();
        nav.focus("b", &mut scene, 0.0).expect("b exists");
        settle(&mut nav, &mut scene, 1.0);

        nav.reset_to_full_view(&mut scene, 2.0);
        nav.advance(&mut scene, 2.1);
        assert!(nav.is_animating());
        nav.reset_to_full_view(&mut scene, 2.1);
        assert!(nav.is_animating());
        assert_eq!(scene.edge_visibility, EdgeVisibility::Hidden);
        settle(&mut nav, &mut scene, 4.0);

        assert!(!nav.is_animating());
        assert_eq!(scene.edge_visibility, EdgeVisibility::All);
        assert_eq!(scene.camera, home_camera);
        assert!(scene.layout.bodies().iter().all(|body| !body.pinned));
        for (pose, visual) in home.iter().zip(&scene.visuals) {
            assert!((pose.position - visual.position).length() < 1e-3);
            assert_eq!(pose.opacity, visual.opacity);
            assert_eq!(pose.scale, visual.scale);
        }
    }

    #[test]
    fn focus_during_reset_keeps_first_home() {
        let mut scene = abc();
        let home = scene.poses();
        let home_camera = scene.camera;
        let mut nav = navigator();
        nav.focus("b", &mut scene, 0.0).expect("b exists");
        settle(&mut nav, &mut scene, 1.0);

        nav.reset_to_full_view(&mut scene, 2.0);
        nav.advance(&mut scene, 2.1);
        nav.focus("a", &mut scene, 2.1).expect("a exists");
        settle(&mut nav, &mut scene, 4.0);
        assert_eq!(nav.phase(), FocusPhase::Focused(0));

        nav.reset_to_full_view(&mut scene, 5.0);
        settle(&mut nav, &mut scene, 7.0);

        assert_eq!(scene.camera, home_camera);
        assert!(scene.layout.bodies().iter().all(|body| !body.pinned));
        for (pose, visual) in home.iter().zip(&scene.visuals) {
            assert!((pose.position - visual.position).length() < 1e-3);
            assert_eq!(pose.opacity, visual.opacity);
        }
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.focus("a", &mut scene, 0.0).expect("a exists");
        let first = nav.generation();
        nav.focus("b", &mut scene, 0.2).expect("b exists");

        nav.complete(first, &mut scene);
        assert!(nav.is_animating());
        assert_eq!(scene.edge_visibility, EdgeVisibility::Hidden);

        settle(&mut nav, &mut scene, 2.0);
        assert_eq!(nav.phase(), FocusPhase::Focused(1));
        assert_eq!(scene.edge_visibility, EdgeVisibility::Only(HashSet::from([0, 1])));
    }

    #[test]
    fn clear_drops_everything() {
        let mut scene = abc();
        let mut nav = navigator();
        nav.focus("b", &mut scene, 0.0).expect("b exists");
        nav.clear();
        assert_eq!(nav.phase(), FocusPhase::Idle);
        assert!(nav.history().is_empty());
        assert!(!nav.is_animating());
        assert!(nav.ambient_rotation());
    }
}
