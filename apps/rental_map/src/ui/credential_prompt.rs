use map_core::{CredentialPrompt, ProviderKind};
use shared::error::ErrorCode;

/// Stand-in for the map while the provider cannot start. Returns the typed
/// token when the user submits it.
pub fn show(ui: &mut egui::Ui, prompt: &CredentialPrompt, input: &mut String) -> Option<String> {
    let mut submitted = None;
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.2);
        egui::Frame::group(ui.style())
            .inner_margin(egui::Margin::same(16))
            .show(ui, |ui| {
                ui.set_max_width(420.0);
                ui.heading(heading(prompt));
                ui.add_space(4.0);
                ui.colored_label(ui.visuals().warn_fg_color, prompt.reason());
                ui.label(hint_for(prompt.provider()));
                if !accepts_token(prompt) {
                    return;
                }
                ui.add_space(8.0);

                let response = ui.add(
                    egui::TextEdit::singleline(input)
                        .password(true)
                        .hint_text("Paste token")
                        .desired_width(320.0),
                );
                let entered =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Load map").clicked() || entered {
                    submitted = Some(input.clone());
                }
            });
    });
    submitted
}

fn heading(prompt: &CredentialPrompt) -> String {
    let provider = prompt.provider();
    match prompt.code() {
        ErrorCode::MissingCredential => format!("{provider} needs an access token"),
        ErrorCode::InvalidCredential => format!("{provider} did not accept the access token"),
        _ => format!("{provider} map could not start"),
    }
}

/// A typed token can only help providers that take one.
fn accepts_token(prompt: &CredentialPrompt) -> bool {
    prompt.provider().requires_credential()
}

fn hint_for(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Leaflet => "Check the tile URL template in rental_map.toml.",
        ProviderKind::Mapbox => {
            "Use a public token (pk.…) from your Mapbox account. It is kept for this session only."
        }
        ProviderKind::Google => {
            "Use a Maps Static API key from Google Cloud. It is kept for this session only."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_core::{Credential, MapSession, MapSettings};

    fn prompt_for(settings: MapSettings) -> CredentialPrompt {
        MapSession::open(settings, Vec::new())
            .prompt()
            .cloned()
            .expect("prompt")
    }

    #[test]
    fn broken_tile_template_does_not_ask_for_a_token() {
        let prompt = prompt_for(MapSettings {
            tile_url_template: "https://tiles.example.test/tile.png".to_string(),
            ..MapSettings::default()
        });
        assert_eq!(prompt.code(), ErrorCode::ProviderInit);
        assert_eq!(heading(&prompt), "OpenStreetMap map could not start");
        assert!(!accepts_token(&prompt));
    }

    #[test]
    fn token_headings_follow_the_failure() {
        let missing = prompt_for(MapSettings::default().with_provider(ProviderKind::Mapbox, None));
        assert_eq!(heading(&missing), "Mapbox needs an access token");
        assert!(accepts_token(&missing));

        let rejected = prompt_for(
            MapSettings::default()
                .with_provider(ProviderKind::Mapbox, Credential::from_input("sk.secret")),
        );
        assert_eq!(heading(&rejected), "Mapbox did not accept the access token");
    }
}
