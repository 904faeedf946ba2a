use eframe::egui::{self, Key, Pos2, Rect, Ui};
use tracing::{debug, info};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.engine.zoom_at(zoom_factor, pointer, rect.center());
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response, center: Pos2) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.engine.pan_by(response.drag_delta(), center);
        }
    }

    /// Routes the primary button through the engine, which decides between click and drag.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let center = rect.center();
        let (position, delta, pressed, released) = ui.input(|input| {
            (
                input.pointer.latest_pos(),
                input.pointer.delta(),
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
            )
        });
        let Some(position) = position else {
            self.engine.pointer_left();
            return;
        };

        if pressed && response.hovered() {
            self.pressing = true;
            self.engine.pointer_down(position);
        }

        if self.pressing || rect.contains(position) {
            self.engine.pointer_moved(position, delta, center);
        } else {
            self.engine.pointer_left();
        }

        if released && self.pressing {
            self.pressing = false;
            if let Some(index) = self.engine.pointer_up(position, center)
                && let Some(node) = self.engine.snapshot().nodes.get(index)
            {
                info!(id = %node.id, "focused from canvas");
            }
        }
    }

    pub(in crate::app) fn handle_graph_keys(&mut self, ui: &Ui) {
        if ui.ctx().wants_keyboard_input() {
            return;
        }
        let (back, reset) = ui.input(|input| {
            (
                input.key_pressed(Key::Backspace),
                input.key_pressed(Key::Escape),
            )
        });

        if back && let Err(error) = self.engine.back() {
            debug!(%error, "back navigation failed");
        }
        if reset {
            self.engine.reset_to_full_view();
        }
    }
}
