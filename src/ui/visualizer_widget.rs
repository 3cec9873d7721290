use crate::ops::visualizer::{Rgb, VisualizerBar};
use eframe::egui;

const BAR_WIDTH: f32 = 15.0;
const BAR_MARGIN: f32 = 2.0;
const BAR_RADIUS: f32 = 3.0;

fn to_color32(Rgb(r, g, b): Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

/// Draws the bars bottom-aligned in a strip `area_height` tall.
/// Bars taller than the strip are clipped.
pub fn visualizer_widget(ui: &mut egui::Ui, bars: &[VisualizerBar], area_height: f32) {
    let width = bars.len() as f32 * (BAR_WIDTH + 2.0 * BAR_MARGIN);
    let (rect, _response) =
        ui.allocate_exact_size(egui::vec2(width, area_height), egui::Sense::hover());
    let painter = ui.painter_at(rect);

    for (i, bar) in bars.iter().enumerate() {
        let x = rect.min.x + BAR_MARGIN + i as f32 * (BAR_WIDTH + 2.0 * BAR_MARGIN);
        let height = (bar.current_height as f32).clamp(0.0, area_height);
        let bar_rect = egui::Rect::from_min_max(
            egui::pos2(x, rect.max.y - height),
            egui::pos2(x + BAR_WIDTH, rect.max.y),
        );
        painter.rect_filled(bar_rect, BAR_RADIUS, to_color32(bar.color));
    }
}
