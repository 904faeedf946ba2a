use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, StrokeKind};

const BACKGROUND: Color32 = Color32::from_rgb(12, 14, 24);

/// Fills `rect` and scatters a faint star grid anchored at `origin` (the screen position
/// of the world origin) so panning and zooming read as camera motion.
pub(super) fn draw_background(painter: &Painter, rect: Rect, origin: Pos2, zoom: f32) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let dot = Color32::from_rgba_unmultiplied(120, 130, 170, 40);

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
        while y < rect.bottom() {
            painter.circle_filled(Pos2::new(x, y), 0.8, dot);
            y += step;
        }
        x += step;
    }

    painter.rect_stroke(
        rect,
        0.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 90, 80)),
        StrokeKind::Inside,
    );
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

/// Conservative cull: keeps any segment whose padded bounding box touches `rect`.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    Rect::from_two_pos(start, end)
        .expand(padding)
        .intersects(rect)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    #[test]
    fn circles_partly_inside_are_visible() {
        assert!(circle_visible(viewport(), pos2(-5.0, 300.0), 10.0));
        assert!(!circle_visible(viewport(), pos2(-50.0, 300.0), 10.0));
    }

    #[test]
    fn edges_crossing_the_viewport_are_kept() {
        assert!(edge_visible(viewport(), pos2(-100.0, 300.0), pos2(900.0, 300.0), 1.0));
        assert!(!edge_visible(viewport(), pos2(-100.0, -50.0), pos2(-10.0, -5.0), 1.0));
    }
}
