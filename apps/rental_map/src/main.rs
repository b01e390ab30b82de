use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use map_core::{load_settings, Credential, MapSettings, ProviderKind};
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::RentalMapApp;

#[derive(Parser, Debug)]
#[command(about = "Browse rental listings on an interactive map")]
struct Args {
    /// Map backend: leaflet, mapbox or google.
    #[arg(long)]
    provider: Option<ProviderKind>,
    /// Access token or API key for the selected provider.
    #[arg(long)]
    token: Option<String>,
    /// JSON catalog to load instead of the built-in listings.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut settings: MapSettings) -> MapSettings {
        if let Some(provider) = self.provider {
            settings.provider = provider;
        }
        if let Some(token) = self.token.as_deref() {
            settings.credential = Credential::from_input(token);
        }
        if let Some(catalog) = self.catalog {
            settings.catalog_path = Some(catalog);
        }
        settings
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Args::parse().apply(load_settings());
    tracing::info!(provider = %settings.provider, "starting rental map");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings.clone(), cmd_rx, ui_tx)
        .context("failed to spawn backend worker thread")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Rental Map")
            .with_inner_size([1180.0, 780.0])
            .with_min_inner_size([720.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Rental Map",
        options,
        Box::new(move |_cc| Ok(Box::new(RentalMapApp::new(settings, cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("map window failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_loaded_settings() {
        let args = Args::try_parse_from([
            "rental_map",
            "--provider",
            "mapbox",
            "--token",
            " pk.flag ",
            "--catalog",
            "listings.json",
        ])
        .expect("parse args");
        let settings = args.apply(MapSettings::default());
        assert_eq!(settings.provider, ProviderKind::Mapbox);
        assert_eq!(
            settings.credential.as_ref().map(Credential::expose),
            Some("pk.flag")
        );
        assert_eq!(settings.catalog_path, Some(PathBuf::from("listings.json")));
    }

    #[test]
    fn provider_flag_uses_the_environment_token() {
        let loaded = MapSettings {
            mapbox_token: Credential::from_input("pk.fromenv"),
            ..MapSettings::default()
        };
        let args = Args::try_parse_from(["rental_map", "--provider", "mapbox"]).expect("parse args");
        let settings = args.apply(loaded);
        assert_eq!(
            settings.active_credential().map(Credential::expose),
            Some("pk.fromenv")
        );
    }

    #[test]
    fn no_flags_keep_loaded_settings() {
        let args = Args::try_parse_from(["rental_map"]).expect("parse args");
        let settings = args.apply(MapSettings::default());
        assert_eq!(settings.provider, ProviderKind::Leaflet);
        assert!(settings.credential.is_none());
    }
}
