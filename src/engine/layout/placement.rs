use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

/// `π(3 - √5)`
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Point `i` of `n` spread evenly over a sphere of `radius`, split into the screen plane
/// and the remaining depth component.
pub(super) fn shell_point(i: usize, n: usize, radius: f32) -> (Vec2, f32) {
    let n = n.max(1) as f32;
    let cos_phi = (-1.0 + ((2.0 * i as f32) + 1.0) / (n + 1.0)).clamp(-1.0, 1.0);
    let phi = cos_phi.acos();
    let theta = GOLDEN_ANGLE * i as f32;
    project(radius, phi, theta)
}

/// Random point inside the spherical band between `min_radius` and `max_radius`.
pub(super) fn inner_point(rng: &mut impl Rng, min_radius: f32, max_radius: f32) -> (Vec2, f32) {
    let (low, high) = if min_radius <= max_radius {
        (min_radius, max_radius)
    } else {
        (max_radius, min_radius)
    };
    let radius = rng.gen_range(low..=high);
    let cos_phi: f32 = rng.gen_range(-1.0..=1.0);
    let theta = rng.gen_range(0.0..TAU);
    project(radius, cos_phi.clamp(-1.0, 1.0).acos(), theta)
}

fn project(radius: f32, phi: f32, theta: f32) -> (Vec2, f32) {
    let ring = radius * phi.sin();
    (
        vec2(ring * theta.cos(), radius * phi.cos()),
        ring * theta.sin(),
    )
}

/// Unit direction for coincident points, stable for a given pair.
pub(super) fn fallback_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin())
}
