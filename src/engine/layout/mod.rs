mod forces;
mod placement;

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use rand::Rng;
use tracing::debug;

use super::model::{GraphSnapshot, Tier};
use crate::config::LayoutConfig;
use forces::{ForceParams, accumulate_centering, accumulate_repulsion, accumulate_springs};
use placement::{inner_point, shell_point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub depth: f32,
    pub velocity: Vec2,
    /// Pinned bodies push others away but are not integrated.
    pub pinned: bool,
}

pub struct LayoutEngine {
    config: LayoutConfig,
    bodies: Vec<Body>,
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    elapsed: f32,
    running: bool,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            bodies: Vec::new(),
            forces: Vec::new(),
            positions: Vec::new(),
            elapsed: 0.0,
            running: false,
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// World-space rectangle the simulation keeps bodies inside.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(
            Pos2::ZERO,
            vec2(self.config.viewport_width, self.config.viewport_height),
        )
    }

    /// Tiered initial placement: primary nodes on the outer golden-angle shell, the rest
    /// scattered through the inner band. Restarts the simulation clock.
    pub fn seed(&mut self, snapshot: &GraphSnapshot, rng: &mut impl Rng) {
        let primary_total = snapshot.primary_count();
        let mut primary_seen = 0usize;

        self.bodies.clear();
        self.bodies.reserve(snapshot.node_count());
        for node in &snapshot.nodes {
            let (position, depth) = match node.tier {
                Tier::Primary => {
                    let point =
                        shell_point(primary_seen, primary_total, self.config.outer_shell_radius);
                    primary_seen += 1;
                    point
                }
                Tier::Secondary => inner_point(
                    rng,
                    self.config.inner_shell_min_radius,
                    self.config.inner_shell_max_radius,
                ),
            };
            let position = self.clamp(position);
            self.bodies.push(Body {
                position,
                depth,
                velocity: Vec2::ZERO,
                pinned: false,
            });
        }

        self.elapsed = 0.0;
        self.running = !self.bodies.is_empty();
        debug!(
            bodies = self.bodies.len(),
            primary = primary_total,
            "seeded layout"
        );
    }

    /// Advances the simulation by `dt` seconds. Returns whether anything moved.
    pub fn tick(&mut self, snapshot: &GraphSnapshot, dt: f32) -> bool {
        if !self.running {
            return false;
        }

        let dt = dt.max(0.0);
        self.elapsed += dt;
        let node_count = self.bodies.len();

        self.forces.clear();
        self.forces.resize(node_count, Vec2::ZERO);
        self.positions.clear();
        self.positions
            .extend(self.bodies.iter().map(|body| body.position));

        let params = ForceParams {
            repulsion: self.config.repulsion,
            softening: self.config.softening.max(0.0001),
            centering: self.config.centering,
            spring: self.config.spring,
            spring_length: self.config.spring_length,
        };
        accumulate_repulsion(&self.positions, params, &mut self.forces);
        accumulate_springs(&snapshot.edges, &self.positions, params, &mut self.forces);
        accumulate_centering(&self.positions, params, &mut self.forces);

        let time_step_scale = (dt * 60.0).clamp(0.25, 3.0);
        let damping_factor = self.config.damping.clamp(0.0, 1.0).powf(time_step_scale);
        let max_speed = self.config.max_speed.max(0.0);
        let bounds = self.bounds();
        let mut any_motion = false;

        for (body, force) in self.bodies.iter_mut().zip(&self.forces) {
            if body.pinned {
                body.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = (body.velocity + *force * time_step_scale) * damping_factor;
            let speed = velocity.length();
            if speed > max_speed {
                velocity *= max_speed / speed;
            }

            let next = body.position + velocity * time_step_scale;
            let clamped = next.clamp(bounds.min.to_vec2(), bounds.max.to_vec2());
            if clamped.x != next.x {
                velocity.x = 0.0;
            }
            if clamped.y != next.y {
                velocity.y = 0.0;
            }

            any_motion |= (clamped - body.position).length_sq() > 0.000_001;
            body.position = clamped;
            body.velocity = velocity;
        }

        if self.elapsed >= self.config.simulation_secs {
            self.halt();
        }

        any_motion
    }

    pub fn halt(&mut self) {
        if self.running {
            debug!(elapsed = self.elapsed, "layout simulation halted");
        }
        self.running = false;
        for body in &mut self.bodies {
            body.velocity = Vec2::ZERO;
        }
    }

    pub fn set_pinned(&mut self, index: usize, pinned: bool) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pinned = pinned;
            body.velocity = Vec2::ZERO;
        }
    }

    pub fn unpin_all(&mut self) {
        for body in &mut self.bodies {
            body.pinned = false;
        }
    }

    /// Moves a body without simulating, e.g. to follow a focus animation.
    pub fn place(&mut self, index: usize, position: Vec2, depth: f32) {
        let position = self.clamp(position);
        if let Some(body) = self.bodies.get_mut(index) {
            body.position = position;
            body.depth = depth;
        }
    }

    fn clamp(&self, position: Vec2) -> Vec2 {
        let bounds = self.bounds();
        position.clamp(bounds.min.to_vec2(), bounds.max.to_vec2())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::backend::{RawEdge, RawGraph, RawNode};
    use crate::engine::store::ingest;

    fn graph(nodes: usize, edges: &[(usize, usize)]) -> GraphSnapshot {
        let raw = RawGraph {
            nodes: (0..nodes)
                .map(|i| RawNode {
                    id: format!("n{i}"),
                    label: String::new(),
                    kind: "concept".to_owned(),
                    color: None,
                    size: 1.0,
                    metadata: Default::default(),
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(a, b)| RawEdge {
                    id: String::new(),
                    source: format!("n{a}"),
                    target: format!("n{b}"),
                    label: String::new(),
                    strength: 0.8,
                    dashed: false,
                })
                .collect(),
            clusters: vec![],
        };
        ingest(raw, 1, 25)
    }

    fn seeded(snapshot: &GraphSnapshot) -> LayoutEngine {
        let mut layout = LayoutEngine::new(LayoutConfig::default());
        layout.seed(snapshot, &mut StdRng::seed_from_u64(42));
        layout
    }

    #[test]
    fn seed_places_tiers_on_their_shells() {
        let edges = (1..30).map(|i| (0, i)).collect::<Vec<_>>();
        let snapshot = graph(40, &edges);
        let layout = seeded(&snapshot);
        let config = LayoutConfig::default();

        for (node, body) in snapshot.nodes.iter().zip(layout.bodies()) {
            let r = (body.position.length_sq() + body.depth * body.depth).sqrt();
            match node.tier {
                Tier::Primary => assert!((r - config.outer_shell_radius).abs() < 0.1),
                Tier::Secondary => assert!(r <= config.inner_shell_max_radius + 0.1),
            }
            assert!(layout.bounds().contains(body.position.to_pos2()));
        }
        assert!(layout.is_running());
    }

    #[test]
    fn simulation_halts_after_time_budget() {
        let snapshot = graph(12, &[(0, 1), (1, 2), (2, 3)]);
        let mut layout = seeded(&snapshot);
        let mut ticks = 0;
        while layout.is_running() {
            layout.tick(&snapshot, 1.0 / 60.0);
            ticks += 1;
            assert!(ticks < 400, "simulation did not halt");
        }
        assert!(layout.elapsed() >= 5.0);
        assert!(!layout.tick(&snapshot, 1.0 / 60.0));
        assert!(layout.bodies().iter().all(|body| body.velocity == Vec2::ZERO));
    }

    #[test]
    fn bodies_stay_inside_bounds() {
        let snapshot = graph(60, &[(0, 1), (2, 3), (4, 5)]);
        let mut layout = seeded(&snapshot);
        for _ in 0..120 {
            layout.tick(&snapshot, 1.0 / 30.0);
        }
        let bounds = layout.bounds();
        for body in layout.bodies() {
            assert!(bounds.contains(body.position.to_pos2()));
        }
    }

    #[test]
    fn pinned_bodies_do_not_move() {
        let snapshot = graph(6, &[(0, 1), (0, 2)]);
        let mut layout = seeded(&snapshot);
        layout.set_pinned(0, true);
        let before = layout.bodies()[0].position;
        for _ in 0..30 {
            layout.tick(&snapshot, 1.0 / 60.0);
        }
        assert_eq!(layout.bodies()[0].position, before);

        layout.unpin_all();
        assert!(!layout.bodies()[0].pinned);
    }

    #[test]
    fn overlapping_bodies_separate() {
        let snapshot = graph(2, &[]);
        let mut layout = seeded(&snapshot);
        layout.place(0, vec2(1.0, 0.0), 0.0);
        layout.place(1, vec2(-1.0, 0.0), 0.0);
        for _ in 0..20 {
            layout.tick(&snapshot, 1.0 / 60.0);
        }
        let gap = (layout.bodies()[0].position - layout.bodies()[1].position).length();
        assert!(gap > 2.0);
    }

    #[test]
    fn empty_snapshot_is_idle() {
        let snapshot = GraphSnapshot::default();
        let mut layout = seeded(&snapshot);
        assert!(!layout.is_running());
        assert!(!layout.tick(&snapshot, 0.016));
    }
}
