use eframe::egui::emath::Rot2;
use eframe::egui::{Color32, Pos2, Vec2};

use super::model::{GraphSnapshot, Tier};
use super::tween::Lerp;

/// Per-node render state, indexed like `GraphSnapshot::nodes`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeVisual {
    pub position: Vec2,
    pub depth: f32,
    pub tier: Tier,
    pub opacity: f32,
    pub scale: f32,
    pub label_visible: bool,
    pub color: Color32,
}

impl NodeVisual {
    pub fn pose(&self) -> NodePose {
        NodePose {
            position: self.position,
            depth: self.depth,
            opacity: self.opacity,
            scale: self.scale,
        }
    }

    pub fn apply(&mut self, pose: &NodePose) {
        self.position = pose.position;
        self.depth = pose.depth;
        self.opacity = pose.opacity;
        self.scale = pose.scale;
    }
}

/// The animatable subset of [`NodeVisual`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePose {
    pub position: Vec2,
    pub depth: f32,
    pub opacity: f32,
    pub scale: f32,
}

impl Lerp for NodePose {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            position: Lerp::lerp(&self.position, &to.position, t),
            depth: Lerp::lerp(&self.depth, &to.depth, t),
            opacity: Lerp::lerp(&self.opacity, &to.opacity, t),
            scale: Lerp::lerp(&self.scale, &to.scale, t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVisual {
    pub edge: usize,
    pub from: Vec2,
    pub to: Vec2,
    pub opacity: f32,
    pub color: Color32,
    pub visible: bool,
    pub dashed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub center: Vec2,
    pub zoom: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Lerp for CameraPose {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            center: Lerp::lerp(&self.center, &to.center, t),
            zoom: Lerp::lerp(&self.zoom, &to.zoom, t),
        }
    }
}

/// World to screen mapping: translate by the camera, rotate, zoom, then offset to the
/// viewport center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub screen_center: Pos2,
    pub camera: CameraPose,
    pub rotation: f32,
}

impl ViewTransform {
    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        let rotated = Rot2::from_angle(self.rotation) * (world - self.camera.center);
        self.screen_center + rotated * self.camera.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        let zoom = self.camera.zoom.max(f32::EPSILON);
        let local = (screen - self.screen_center) / zoom;
        Rot2::from_angle(self.rotation).inverse() * local + self.camera.center
    }

    /// Converts a screen-space displacement into world space.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        let zoom = self.camera.zoom.max(f32::EPSILON);
        Rot2::from_angle(self.rotation).inverse() * (delta / zoom)
    }
}

pub struct Frame<'a> {
    pub snapshot: &'a GraphSnapshot,
    pub nodes: &'a [NodeVisual],
    pub edges: Vec<EdgeVisual>,
    pub transform: ViewTransform,
    pub focused: Option<usize>,
    pub hovered: Option<usize>,
}

/// Drawing backend for the constellation.
pub trait RenderAdapter {
    /// Screen-space center of the drawing surface.
    fn viewport_center(&self) -> Pos2;

    fn draw_frame(&mut self, frame: &Frame<'_>);

    /// Called when the surface is hidden or shown; hidden surfaces are not drawn.
    fn set_visible(&mut self, visible: bool);
}
