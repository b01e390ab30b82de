//! Map canvas: background imagery, price-pill markers and pointer input.

use map_core::{
    provider::{MARKER_HEIGHT, MARKER_WIDTH},
    MapError, MarkerSelectionController, MarkerStyle, ScreenPoint,
};

use super::app::LoadedBackground;

const LAND: egui::Color32 = egui::Color32::from_rgb(0xE8, 0xE4, 0xD8);

pub struct CanvasOutput {
    pub rect: egui::Rect,
    /// A drag is in progress; imagery is refetched once it settles.
    pub interacting: bool,
    pub error: Option<MapError>,
}

pub fn show(
    ui: &mut egui::Ui,
    controller: &mut MarkerSelectionController,
    background: &[LoadedBackground],
) -> CanvasOutput {
    let (rect, response) =
        ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
    controller.resize(rect.width(), rect.height());

    let mut error = None;
    if response.dragged() {
        let delta = response.drag_delta();
        let center = controller.viewport().dragged_center(delta.x, delta.y);
        controller.pan_to(center);
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        let zoom = controller.viewport().zoom;
        if scroll > 0.0 {
            controller.set_zoom(zoom.saturating_add(1));
        } else if scroll < 0.0 {
            controller.set_zoom(zoom.saturating_sub(1));
        }
    }
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let local = pos - rect.min;
            if let Err(err) = controller.click(ScreenPoint::new(local.x, local.y)) {
                error = Some(err);
            }
        }
    }

    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, egui::CornerRadius::ZERO, LAND);

    let viewport = controller.viewport();
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    for bg in background.iter().filter(|bg| bg.image.zoom == viewport.zoom) {
        let (wx, wy) = bg.image.world_origin;
        let top_left = viewport.world_to_screen(wx, wy);
        let image_rect = egui::Rect::from_min_size(
            rect.min + egui::vec2(top_left.x, top_left.y),
            egui::vec2(bg.image.width as f32, bg.image.height as f32),
        );
        painter.image(bg.texture.id(), image_rect, uv, egui::Color32::WHITE);
    }

    // Paint order mirrors hit-test order: selected on top, then newest.
    let mut markers = controller.markers();
    markers.sort_by_key(|marker| marker.style == MarkerStyle::Selected);
    for marker in markers {
        let at = viewport.project(marker.position);
        paint_marker(&painter, rect.min + egui::vec2(at.x, at.y), &marker.label, marker.style);
    }

    paint_count_badge(&painter, rect, controller.marker_count());

    painter.text(
        rect.right_bottom() - egui::vec2(6.0, 4.0),
        egui::Align2::RIGHT_BOTTOM,
        controller.provider().attribution(),
        egui::FontId::proportional(11.0),
        egui::Color32::from_gray(60),
    );

    let zoom = controller.viewport().zoom;
    let zoom_in = egui::Rect::from_min_size(
        rect.right_top() + egui::vec2(-40.0, 12.0),
        egui::vec2(28.0, 28.0),
    );
    let zoom_out = zoom_in.translate(egui::vec2(0.0, 32.0));
    if ui.put(zoom_in, egui::Button::new("+")).clicked() {
        controller.set_zoom(zoom.saturating_add(1));
    }
    if ui.put(zoom_out, egui::Button::new("−")).clicked() {
        controller.set_zoom(zoom.saturating_sub(1));
    }

    CanvasOutput {
        rect,
        interacting: response.dragged(),
        error,
    }
}

fn count_label(count: usize) -> String {
    match count {
        1 => "1 property".to_string(),
        n => format!("{n} properties"),
    }
}

fn paint_count_badge(painter: &egui::Painter, map_rect: egui::Rect, count: usize) {
    let galley = painter.layout_no_wrap(
        count_label(count),
        egui::FontId::proportional(13.0),
        egui::Color32::from_gray(30),
    );
    let badge = egui::Rect::from_min_size(
        map_rect.left_bottom() + egui::vec2(12.0, -(galley.size().y + 24.0)),
        galley.size() + egui::vec2(20.0, 12.0),
    );
    painter.rect_filled(badge, egui::CornerRadius::same(8), egui::Color32::WHITE);
    painter.galley(
        badge.min + egui::vec2(10.0, 6.0),
        galley,
        egui::Color32::from_gray(30),
    );
}

fn paint_marker(painter: &egui::Painter, center: egui::Pos2, label: &str, style: MarkerStyle) {
    let scale = style.scale();
    let rect = egui::Rect::from_center_size(
        center,
        egui::vec2(MARKER_WIDTH * scale, MARKER_HEIGHT * scale),
    );
    let (fill, text) = match style {
        MarkerStyle::Default => (egui::Color32::WHITE, egui::Color32::from_gray(30)),
        MarkerStyle::Selected => (egui::Color32::from_gray(34), egui::Color32::WHITE),
    };
    let radius = egui::CornerRadius::same(15);
    painter.rect_filled(rect, radius, fill);
    painter.rect_stroke(
        rect,
        radius,
        egui::Stroke::new(1.0, egui::Color32::from_gray(120)),
        egui::StrokeKind::Middle,
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        label,
        egui::FontId::proportional(12.0 * scale),
        text,
    );
}
