use eframe::egui::Pos2;

use super::frame::{NodeVisual, ViewTransform};
use super::model::GraphSnapshot;
use crate::config::PickingConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerOutcome {
    Click(Pos2),
    Drag,
}

#[derive(Clone, Copy, Debug)]
struct Press {
    origin: Pos2,
    started: f64,
    dragging: bool,
}

/// Resolves pointer input to nodes and separates clicks from drags.
pub struct PickingIndex {
    config: PickingConfig,
    press: Option<Press>,
}

impl PickingIndex {
    pub fn new(config: PickingConfig) -> Self {
        Self {
            config,
            press: None,
        }
    }

    pub fn pointer_down(&mut self, position: Pos2, now: f64) {
        self.press = Some(Press {
            origin: position,
            started: now,
            dragging: false,
        });
    }

    /// Returns whether the current press has turned into a drag.
    pub fn pointer_moved(&mut self, position: Pos2) -> bool {
        let threshold = self.config.drag_threshold_px;
        match &mut self.press {
            Some(press) => {
                if press.origin.distance(position) > threshold {
                    press.dragging = true;
                }
                press.dragging
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self, position: Pos2, now: f64) -> Option<PointerOutcome> {
        let press = self.press.take()?;
        let held = now - press.started;
        let moved = press.origin.distance(position) > self.config.drag_threshold_px;
        if press.dragging || moved || held > self.config.click_max_secs {
            Some(PointerOutcome::Drag)
        } else {
            Some(PointerOutcome::Click(position))
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|press| press.dragging)
    }

    /// World-space pick radius of node `index`.
    pub fn radius(&self, snapshot: &GraphSnapshot, visual: &NodeVisual, index: usize) -> f32 {
        node_radius(&self.config, snapshot.importance(index), visual.scale)
    }

    /// Node under `pointer` (screen space). Overlaps prefer `preferred` in order, then the
    /// closest center, then the lowest index.
    pub fn hit_test(
        &self,
        pointer: Pos2,
        transform: &ViewTransform,
        snapshot: &GraphSnapshot,
        visuals: &[NodeVisual],
        preferred: &[usize],
    ) -> Option<usize> {
        let world = transform.screen_to_world(pointer);
        let rank = |index: usize| {
            preferred
                .iter()
                .position(|&candidate| candidate == index)
                .unwrap_or(usize::MAX)
        };

        visuals
            .iter()
            .enumerate()
            .filter_map(|(index, visual)| {
                let distance = (visual.position - world).length();
                (distance <= self.radius(snapshot, visual, index)).then_some((index, distance))
            })
            .min_by(|a, b| {
                rank(a.0)
                    .cmp(&rank(b.0))
                    .then(a.1.total_cmp(&b.1))
                    .then(a.0.cmp(&b.0))
            })
            .map(|(index, _)| index)
    }
}

pub fn node_radius(config: &PickingConfig, importance: f32, scale: f32) -> f32 {
    (config.base_radius + importance.clamp(0.0, 1.0) * config.importance_scale) * scale
}
