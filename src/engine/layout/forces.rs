use eframe::egui::Vec2;

use super::placement::fallback_direction;
use crate::engine::model::Edge;

#[derive(Clone, Copy, Debug)]
pub(super) struct ForceParams {
    pub(super) repulsion: f32,
    pub(super) softening: f32,
    pub(super) centering: f32,
    pub(super) spring: f32,
    pub(super) spring_length: f32,
}

fn repulsion_between(
    a: usize,
    b: usize,
    point_a: Vec2,
    point_b: Vec2,
    params: ForceParams,
) -> Vec2 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_sq();
    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        fallback_direction(a, b)
    };
    direction * (params.repulsion / (distance_sq + params.softening))
}

/// Inverse-square repulsion over every pair.
pub(super) fn accumulate_repulsion(positions: &[Vec2], params: ForceParams, forces: &mut [Vec2]) {
    for a in 0..positions.len() {
        for b in (a + 1)..positions.len() {
            let push = repulsion_between(a, b, positions[a], positions[b], params);
            forces[a] += push;
            forces[b] -= push;
        }
    }
}

/// Hooke springs along edges, scaled by edge strength.
pub(super) fn accumulate_springs(
    edges: &[Edge],
    positions: &[Vec2],
    params: ForceParams,
    forces: &mut [Vec2],
) {
    let node_count = positions.len();
    for edge in edges {
        let (from, to) = (edge.source, edge.target);
        if from >= node_count || to >= node_count || from == to {
            continue;
        }

        let delta = positions[from] - positions[to];
        let distance = delta.length();
        if distance <= 0.0001 {
            continue;
        }

        let direction = delta / distance;
        let stretch = (distance - params.spring_length) * params.spring * edge.strength;
        let correction = direction * stretch;
        forces[from] -= correction;
        forces[to] += correction;
    }
}

/// Weak pull toward the origin, which is the viewport center in world space.
pub(super) fn accumulate_centering(positions: &[Vec2], params: ForceParams, forces: &mut [Vec2]) {
    for (force, position) in forces.iter_mut().zip(positions) {
        *force -= *position * params.centering;
    }
}
