use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::config::FocusConfig;
use crate::engine::model::GraphSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewDistance {
    Near,
    Medium,
    Far,
}

impl ViewDistance {
    pub fn for_connected(count: usize) -> Self {
        if count > 30 {
            Self::Far
        } else if count > 15 {
            Self::Medium
        } else {
            Self::Near
        }
    }

    pub fn zoom(self, config: &FocusConfig) -> f32 {
        match self {
            Self::Near => config.zoom_near,
            Self::Medium => config.zoom_medium,
            Self::Far => config.zoom_far,
        }
    }
}

/// How many of the best-connected neighbors keep their label.
pub fn labeled_count(connected: usize) -> usize {
    if connected <= 15 {
        connected
    } else if connected <= 30 {
        15
    } else {
        12
    }
}

pub fn ring_size(connected: usize, min_ring_size: usize) -> usize {
    min_ring_size.max(connected.div_ceil(3)).max(1)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSlot {
    pub node: usize,
    pub ring_index: usize,
    pub position_in_ring: usize,
    pub ring_total: usize,
    pub angle: f32,
    pub radius: f32,
}

impl RingSlot {
    pub fn offset(&self) -> Vec2 {
        vec2(self.angle.cos(), self.angle.sin()) * self.radius
    }

    /// Depth around the focus plane; outer rings are flattened.
    pub fn depth(&self, spread: f32) -> f32 {
        let ring_spread = spread / (self.ring_index as f32 + 1.0);
        self.angle.sin() * ring_spread
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RingLayout {
    pub ring_size: usize,
    pub slots: Vec<RingSlot>,
}

/// Sorts by connection count, descending; ties keep node order.
pub fn sort_by_connections(snapshot: &GraphSnapshot, nodes: &mut [usize]) {
    nodes.sort_by(|&a, &b| {
        snapshot.nodes[b]
            .connection_count
            .cmp(&snapshot.nodes[a].connection_count)
            .then(a.cmp(&b))
    });
}

/// Places `connected` (already sorted) on concentric rings around the focus.
pub fn assign_rings(connected: &[usize], config: &FocusConfig) -> RingLayout {
    let ring_size = ring_size(connected.len(), config.min_ring_size);
    let slots = connected
        .iter()
        .enumerate()
        .map(|(i, &node)| {
            let ring_index = i / ring_size;
            let ring_start = ring_index * ring_size;
            let ring_total = (connected.len() - ring_start).min(ring_size);
            let position_in_ring = i - ring_start;
            let angle = TAU * position_in_ring as f32 / ring_total as f32
                + ring_index as f32 * config.ring_angle_offset;
            let radius =
                config.ring_base_radius * (1.0 + ring_index as f32 * config.ring_radius_growth);
            RingSlot {
                node,
                ring_index,
                position_in_ring,
                ring_total,
                angle,
                radius,
            }
        })
        .collect();

    RingLayout { ring_size, slots }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ring_size_has_floor() {
        assert_eq!(ring_size(0, 8), 8);
        assert_eq!(ring_size(2, 8), 8);
        assert_eq!(ring_size(24, 8), 8);
        assert_eq!(ring_size(25, 8), 9);
        assert_eq!(ring_size(90, 8), 30);
    }

    #[test]
    fn empty_connected_gives_empty_rings() {
        let layout = assign_rings(&[], &FocusConfig::default());
        assert!(layout.slots.is_empty());
        assert_eq!(layout.ring_size, 8);
    }

    #[test]
    fn rings_fill_in_order() {
        let config = FocusConfig::default();
        let connected = (0..20).collect::<Vec<_>>();
        let layout = assign_rings(&connected, &config);

        let per_ring = layout
            .slots
            .iter()
            .fold([0usize; 3], |mut acc, slot| {
                acc[slot.ring_index] += 1;
                acc
            });
        assert_eq!(per_ring, [8, 8, 4]);

        let last = layout.slots[19];
        assert_eq!(last.ring_index, 2);
        assert_eq!(last.ring_total, 4);
        assert_eq!(last.position_in_ring, 3);
        assert!((last.radius - config.ring_base_radius * 2.2).abs() < 1e-3);
        assert!(layout.slots[8].radius > layout.slots[7].radius);
    }

    #[test]
    fn first_slot_angles() {
        let config = FocusConfig::default();
        let connected = (0..9).collect::<Vec<_>>();
        let layout = assign_rings(&connected, &config);
        assert_eq!(layout.slots[0].angle, 0.0);
        assert!((layout.slots[8].angle - config.ring_angle_offset).abs() < 1e-6);
    }

    #[test]
    fn depth_spread_flattens_outward() {
        let slot = |ring_index| RingSlot {
            node: 0,
            ring_index,
            position_in_ring: 0,
            ring_total: 8,
            angle: 1.0,
            radius: 100.0,
        };
        assert!(slot(0).depth(48.0).abs() > slot(2).depth(48.0).abs());
    }

    #[test]
    fn label_and_distance_buckets() {
        assert_eq!(labeled_count(10), 10);
        assert_eq!(labeled_count(15), 15);
        assert_eq!(labeled_count(25), 15);
        assert_eq!(labeled_count(31), 12);
        assert_eq!(ViewDistance::for_connected(15), ViewDistance::Near);
        assert_eq!(ViewDistance::for_connected(16), ViewDistance::Medium);
        assert_eq!(ViewDistance::for_connected(31), ViewDistance::Far);
    }
}
