use listings::ListSummary;
use shared::domain::{Property, PropertyId};

use super::popup::rating_line;

/// Card list of the current results. Returns the property whose
/// "Show on map" button was clicked.
pub fn show(
    ui: &mut egui::Ui,
    properties: &[Property],
    summary: Option<&ListSummary>,
    selected: Option<PropertyId>,
) -> Option<PropertyId> {
    match summary {
        None => {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return None;
        }
        Some(summary) if summary.is_empty() => {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new(summary.headline()).size(16.0).weak());
            });
            return None;
        }
        Some(_) => {}
    }

    let mut picked = None;
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for property in properties {
                let fill = if selected == Some(property.id) {
                    ui.visuals().selection.bg_fill
                } else {
                    ui.visuals().panel_fill
                };
                egui::Frame::group(ui.style()).fill(fill).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&property.name).strong().size(15.0));
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                ui.label(egui::RichText::new(&property.price).strong());
                            },
                        );
                    });
                    ui.label(&property.address);
                    ui.label(format!(
                        "{} · {}",
                        property.kind,
                        rating_line(property.rating, property.review_count)
                    ));
                    if !property.highlights.is_empty() {
                        ui.weak(property.highlights.join(" · "));
                    }
                    if ui.button("Show on map").clicked() {
                        picked = Some(property.id);
                    }
                });
                ui.add_space(6.0);
            }
        });
    picked
}
