mod focus;
mod frame;
mod layout;
mod model;
mod picking;
mod scene;
mod store;
mod tween;
mod updates;

use std::sync::Arc;

use eframe::egui::{Pos2, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::backend::RawGraph;
use crate::config::Config;
use focus::{FocusNavigator, NavigationError, NavigationHistory};
pub use focus::FocusPhase;
use frame::{CameraPose, ViewTransform};
pub use frame::{Frame, RenderAdapter};
use model::Node;
pub use model::GraphSnapshot;
use picking::{PickingIndex, PointerOutcome};
pub use picking::node_radius;
use scene::Scene;
use store::GraphDataStore;
use updates::UpdateChannel;
pub use updates::{
    ChannelSignal, ConnectionState, ProgressKind, ProgressTracker, ReconnectPolicy, UpdateAction,
};

/// Longest animation step taken in one tick; longer gaps (e.g. after the window was
/// hidden) are not caught up.
const MAX_STEP_SECS: f32 = 0.1;
const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 6.0;

/// Owns every constellation component and drives them from a single loop.
pub struct ConstellationEngine {
    config: Config,
    store: GraphDataStore,
    scene: Scene,
    navigator: FocusNavigator,
    picking: PickingIndex,
    updates: UpdateChannel,
    rng: StdRng,
    clock: f64,
    wall: f64,
    visible: bool,
    hovered: Option<usize>,
    pending: Vec<UpdateAction>,
}

impl ConstellationEngine {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> Self {
        Self {
            store: GraphDataStore::new(config.layout.primary_tier_size),
            scene: Scene::new(config.layout.clone()),
            navigator: FocusNavigator::new(config.focus.clone()),
            picking: PickingIndex::new(config.picking.clone()),
            updates: UpdateChannel::new(config.updates.clone()),
            config: config.clone(),
            rng,
            clock: 0.0,
            wall: 0.0,
            visible: true,
            hovered: None,
            pending: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> &Arc<GraphSnapshot> {
        self.store.snapshot()
    }

    pub fn now(&self) -> f64 {
        self.clock
    }

    /// Replaces the graph. Focus state and the render arena start over.
    pub fn ingest(&mut self, raw: RawGraph) {
        let snapshot = self.store.replace(raw);
        self.navigator.clear();
        self.scene
            .rebuild(snapshot, &self.config.focus, &mut self.rng);
        self.scene.camera = CameraPose::default();
        self.hovered = None;
    }

    pub fn active_collection(&self) -> Option<&str> {
        self.store.active_collection()
    }

    pub fn set_active_collection(&mut self, collection_id: Option<String>) {
        self.store.set_active_collection(collection_id.clone());
        self.updates.set_active_collection(collection_id);
    }

    /// Whether the freshly ingested, empty graph of the active collection should be built
    /// automatically. Fires once per collection per session.
    pub fn should_auto_build(&mut self, source_count: usize) -> bool {
        let Some(collection_id) = self.store.active_collection().map(str::to_owned) else {
            return false;
        };
        self.store.should_auto_build(
            &collection_id,
            source_count,
            self.config.updates.auto_build_min_sources,
        )
    }

    pub fn begin_build(&mut self) {
        self.updates.begin_build(self.wall);
    }

    pub fn begin_clustering(&mut self) {
        self.updates.begin_clustering();
    }

    /// Advances simulation, transitions, ambient rotation and timers by `dt` seconds.
    /// Returns whether anything on screen is still moving.
    pub fn tick(&mut self, dt: f32) -> bool {
        let dt = dt.max(0.0);
        self.wall += dt as f64;
        let actions = self.updates.poll(self.wall);
        self.pending.extend(actions);

        if !self.visible {
            return false;
        }

        let step = dt.min(MAX_STEP_SECS);
        self.clock += step as f64;

        let simulating = self.scene.layout.tick(&self.scene.snapshot, step);
        self.scene.sync_from_layout();
        let animating = self.navigator.advance(&mut self.scene, self.clock);

        let rotating = self.navigator.ambient_rotation()
            && self.config.layout.ambient_rotation_speed != 0.0
            && !self.scene.snapshot.is_empty();
        if rotating {
            self.scene.rotation = (self.scene.rotation
                + self.config.layout.ambient_rotation_speed * step)
                .rem_euclid(std::f32::consts::TAU);
        }

        simulating || animating || rotating
    }

    pub fn focus(&mut self, id: &str) -> Result<(), NavigationError> {
        self.navigator.focus(id, &mut self.scene, self.clock)
    }

    pub fn back(&mut self) -> Result<(), NavigationError> {
        self.navigator.back(&mut self.scene, self.clock)
    }

    pub fn reset_to_full_view(&mut self) {
        self.navigator.reset_to_full_view(&mut self.scene, self.clock);
    }

    pub fn phase(&self) -> FocusPhase {
        self.navigator.phase()
    }

    pub fn focused_node(&self) -> Option<&Node> {
        self.navigator
            .focused()
            .and_then(|index| self.scene.snapshot.nodes.get(index))
    }

    pub fn connected(&self) -> &[usize] {
        self.navigator.connected()
    }

    pub fn history(&self) -> &NavigationHistory {
        self.navigator.history()
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn view_transform(&self, screen_center: Pos2) -> ViewTransform {
        ViewTransform {
            screen_center,
            camera: self.scene.camera,
            rotation: self.scene.rotation,
        }
    }

    pub fn pointer_down(&mut self, position: Pos2) {
        self.picking.pointer_down(position, self.clock);
    }

    /// Tracks the pointer; an active drag pans the camera by `delta`.
    pub fn pointer_moved(&mut self, position: Pos2, delta: Vec2, screen_center: Pos2) {
        if self.picking.pointer_moved(position) {
            self.pan_by(delta, screen_center);
            self.hovered = None;
        } else {
            self.hovered = self.hit_test(position, screen_center);
        }
    }

    /// Ends a press. A click on a node focuses it and returns its index.
    pub fn pointer_up(&mut self, position: Pos2, screen_center: Pos2) -> Option<usize> {
        let PointerOutcome::Click(at) = self.picking.pointer_up(position, self.clock)? else {
            return None;
        };
        let index = self.hit_test(at, screen_center)?;
        let id = self.scene.snapshot.nodes[index].id.clone();
        match self.focus(&id) {
            Ok(()) => Some(index),
            Err(error) => {
                debug!(%error, "click did not focus");
                None
            }
        }
    }

    pub fn pointer_left(&mut self) {
        self.hovered = None;
    }

    pub fn hit_test(&self, pointer: Pos2, screen_center: Pos2) -> Option<usize> {
        let mut preferred = Vec::new();
        preferred.extend(self.navigator.focused());
        preferred.extend(
            self.navigator
                .history()
                .recent()
                .filter_map(|id| self.scene.snapshot.index_of(id)),
        );
        self.picking.hit_test(
            pointer,
            &self.view_transform(screen_center),
            &self.scene.snapshot,
            &self.scene.visuals,
            &preferred,
        )
    }

    pub fn pan_by(&mut self, delta: Vec2, screen_center: Pos2) {
        let world = self.view_transform(screen_center).screen_delta_to_world(delta);
        self.scene.camera.center -= world;
    }

    /// Zooms by `factor`, keeping the world point under `pointer` fixed.
    pub fn zoom_at(&mut self, factor: f32, pointer: Pos2, screen_center: Pos2) {
        let before = self.view_transform(screen_center).screen_to_world(pointer);
        self.scene.camera.zoom = (self.scene.camera.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let after = self.view_transform(screen_center).screen_to_world(pointer);
        self.scene.camera.center += before - after;
    }

    pub fn frame(&self, screen_center: Pos2) -> Frame<'_> {
        Frame {
            snapshot: &self.scene.snapshot,
            nodes: &self.scene.visuals,
            edges: self.scene.edge_visuals(),
            transform: self.view_transform(screen_center),
            focused: self.navigator.focused(),
            hovered: self.hovered,
        }
    }

    pub fn render(&self, adapter: &mut impl RenderAdapter) {
        if !self.visible {
            return;
        }
        let frame = self.frame(adapter.viewport_center());
        adapter.draw_frame(&frame);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool, adapter: &mut impl RenderAdapter) {
        if self.visible != visible {
            debug!(visible, "constellation visibility changed");
        }
        self.visible = visible;
        adapter.set_visible(visible);
    }

    pub fn picking(&self) -> &PickingIndex {
        &self.picking
    }

    pub fn updates(&self) -> &UpdateChannel {
        &self.updates
    }

    pub fn handle_signal(&mut self, signal: ChannelSignal) {
        let actions = self.updates.on_signal(signal, self.wall);
        self.pending.extend(actions);
    }

    pub fn handle_push(&mut self, text: &str) {
        self.handle_signal(ChannelSignal::Frame(text.to_owned()));
    }

    pub fn drain_actions(&mut self) -> Vec<UpdateAction> {
        std::mem::take(&mut self.pending)
    }
}
