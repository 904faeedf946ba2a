use eframe::egui::{
    self, Align2, Color32, CursorIcon, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui,
    vec2,
};

use crate::config::PickingConfig;
use crate::engine::{Frame, RenderAdapter, node_radius};
use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::render_utils::{circle_visible, draw_background, edge_visible};

const LABEL_MAX_CHARS: usize = 32;
const LABEL_COLOR: Color32 = Color32::from_gray(238);

/// egui painter behind the engine's [`RenderAdapter`]. Re-targeted every frame at the
/// central panel's rect.
pub(in crate::app) struct EguiCanvas {
    picking: PickingConfig,
    painter: Option<Painter>,
    rect: Rect,
    visible: bool,
}

impl EguiCanvas {
    pub(in crate::app) fn new(picking: PickingConfig) -> Self {
        Self {
            picking,
            painter: None,
            rect: Rect::NOTHING,
            visible: true,
        }
    }

    fn attach(&mut self, painter: Painter, rect: Rect) {
        self.painter = Some(painter);
        self.rect = rect;
    }
}

impl RenderAdapter for EguiCanvas {
    fn viewport_center(&self) -> Pos2 {
        self.rect.center()
    }

    fn draw_frame(&mut self, frame: &Frame<'_>) {
        let Some(painter) = self.painter.as_ref().filter(|_| self.visible) else {
            return;
        };
        let rect = self.rect;
        let transform = frame.transform;
        let zoom = transform.camera.zoom;

        draw_background(painter, rect, transform.world_to_screen(egui::Vec2::ZERO), zoom);

        for edge in frame.edges.iter().filter(|edge| edge.visible) {
            let start = transform.world_to_screen(edge.from);
            let end = transform.world_to_screen(edge.to);
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }
            let stroke = Stroke::new(1.2, edge.color.gamma_multiply(edge.opacity));
            if edge.dashed {
                painter.extend(Shape::dashed_line(&[start, end], stroke, 6.0, 4.0));
            } else {
                painter.line_segment([start, end], stroke);
            }
        }

        // Far nodes first so nearer ones overlap them.
        let mut order = (0..frame.nodes.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| frame.nodes[a].depth.total_cmp(&frame.nodes[b].depth));

        for index in order {
            let visual = &frame.nodes[index];
            let Some(node) = frame.snapshot.nodes.get(index) else {
                continue;
            };
            let position = transform.world_to_screen(visual.position);
            let radius =
                node_radius(&self.picking, frame.snapshot.importance(index), visual.scale) * zoom;
            if !circle_visible(rect, position, radius + 1.0) || visual.opacity <= 0.01 {
                continue;
            }

            let focused = frame.focused == Some(index);
            let hovered = frame.hovered == Some(index);

            painter.circle_filled(position, radius, visual.color.gamma_multiply(visual.opacity));
            let outline = if focused {
                Stroke::new(2.5, Color32::WHITE)
            } else if hovered {
                Stroke::new(2.0, Color32::from_rgb(255, 198, 102))
            } else {
                Stroke::new(
                    1.0,
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190).gamma_multiply(visual.opacity),
                )
            };
            painter.circle_stroke(position, radius, outline);

            if visual.label_visible || focused || hovered {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(&node.label, LABEL_MAX_CHARS),
                    FontId::proportional(if focused { 14.0 } else { 12.0 }),
                    LABEL_COLOR.gamma_multiply(visual.opacity.max(0.5)),
                );
            }
        }

        if let Some(node) = frame.hovered.and_then(|index| frame.snapshot.nodes.get(index)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{} | {} | {} connection(s)",
                    node.label, node.kind, node.connection_count
                ),
                FontId::monospace(12.0),
                LABEL_COLOR,
            );
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.painter = None;
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.engine.snapshot().is_empty() {
            draw_background(&painter, rect, rect.center(), 1.0);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No concepts yet. Add sources to the collection or build the graph.",
                FontId::proportional(15.0),
                Color32::from_gray(160),
            );
            return;
        }
        self.canvas.attach(painter, rect);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response, rect.center());
        self.handle_graph_pointer(ui, rect, &response);
        self.handle_graph_keys(ui);

        self.engine.render(&mut self.canvas);

        if self.engine.picking().is_dragging() {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        } else if self.engine.hovered().is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }
    }
}
