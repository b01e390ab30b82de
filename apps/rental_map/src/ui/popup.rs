use map_core::PropertyPopup;

const PHOTO_WIDTH: f32 = 240.0;

/// Listing photo as fetched by the backend worker.
pub enum PhotoState {
    Loading,
    Ready(egui::TextureHandle),
    Unavailable,
}

/// Detail window for the selected property. Returns true when the user
/// asked to close it.
pub fn show(ctx: &egui::Context, popup: &PropertyPopup, photo: Option<&PhotoState>) -> bool {
    let mut open = true;
    let mut close_clicked = false;
    egui::Window::new(popup.name.as_str())
        .id(egui::Id::new("property_popup"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-16.0, 56.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.set_min_width(PHOTO_WIDTH);
            match photo {
                Some(PhotoState::Ready(texture)) => {
                    ui.add(egui::Image::new(texture).max_width(PHOTO_WIDTH));
                }
                Some(PhotoState::Loading) => {
                    ui.add_sized([PHOTO_WIDTH, 120.0], egui::Spinner::new());
                }
                Some(PhotoState::Unavailable) => {
                    ui.weak("Photo unavailable");
                }
                None => {}
            }
            ui.label(egui::RichText::new(&popup.price).strong().size(18.0));
            ui.label(&popup.address);
            ui.label(format!(
                "{} · {}",
                popup.kind,
                rating_line(popup.rating, popup.review_count)
            ));
            ui.add_space(6.0);
            if ui.button("Close").clicked() {
                close_clicked = true;
            }
        });
    close_clicked || !open
}

pub fn rating_line(rating: f32, review_count: u32) -> String {
    let noun = if review_count == 1 { "review" } else { "reviews" };
    format!("★ {rating:.1} ({review_count} {noun})")
}

#[cfg(test)]
mod tests {
    use super::rating_line;

    #[test]
    fn formats_rating_with_review_count() {
        assert_eq!(rating_line(4.8, 127), "★ 4.8 (127 reviews)");
        assert_eq!(rating_line(5.0, 1), "★ 5.0 (1 review)");
    }
}
