use std::{fs, path::PathBuf, time::Duration};

use serde::Deserialize;
use shared::domain::LatLng;
use tracing::warn;

use crate::{
    provider::{Credential, ProviderKind},
    providers::{DEFAULT_MAPBOX_STYLE, OSM_TILE_TEMPLATE},
};

pub const DEFAULT_CONFIG_PATH: &str = "rental_map.toml";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Map and search configuration, passed explicitly to whatever needs it.
#[derive(Debug, Clone)]
pub struct MapSettings {
    pub provider: ProviderKind,
    /// Explicit token: config file, `APP__MAP_TOKEN`, a flag or the prompt.
    pub credential: Option<Credential>,
    pub mapbox_token: Option<Credential>,
    pub google_key: Option<Credential>,
    pub initial_center: LatLng,
    pub initial_zoom: u8,
    pub tile_url_template: String,
    pub mapbox_style: String,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocode_debounce: Duration,
    pub geocode_min_chars: usize,
    pub geocode_max_suggestions: usize,
    pub catalog_path: Option<PathBuf>,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Leaflet,
            credential: None,
            mapbox_token: None,
            google_key: None,
            initial_center: LatLng::new(40.7128, -74.006),
            initial_zoom: 12,
            tile_url_template: OSM_TILE_TEMPLATE.into(),
            mapbox_style: DEFAULT_MAPBOX_STYLE.into(),
            geocoder_url: DEFAULT_GEOCODER_URL.into(),
            geocoder_user_agent: concat!("rental-map/", env!("CARGO_PKG_VERSION")).into(),
            geocode_debounce: Duration::from_millis(300),
            geocode_min_chars: 3,
            geocode_max_suggestions: 5,
            catalog_path: None,
        }
    }
}

impl MapSettings {
    pub fn with_provider(mut self, provider: ProviderKind, credential: Option<Credential>) -> Self {
        self.provider = provider;
        self.credential = credential;
        self
    }

    /// The token handed to the provider. Resolved on use so a provider
    /// chosen after loading still picks up `MAPBOX_TOKEN` or `GOOGLE_MAPS_KEY`.
    pub fn active_credential(&self) -> Option<&Credential> {
        self.credential.as_ref().or(match self.provider {
            ProviderKind::Mapbox => self.mapbox_token.as_ref(),
            ProviderKind::Google => self.google_key.as_ref(),
            ProviderKind::Leaflet => None,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    provider: Option<String>,
    token: Option<String>,
    center_lat: Option<f64>,
    center_lng: Option<f64>,
    zoom: Option<u8>,
    tile_url_template: Option<String>,
    mapbox_style: Option<String>,
    geocoder_url: Option<String>,
    geocoder_user_agent: Option<String>,
    geocode_debounce_ms: Option<u64>,
    geocode_min_chars: Option<usize>,
    geocode_max_suggestions: Option<usize>,
    catalog_path: Option<PathBuf>,
}

/// Defaults, then `rental_map.toml` (or `$RENTAL_MAP_CONFIG`), then the
/// environment.
pub fn load_settings() -> MapSettings {
    let path = std::env::var("RENTAL_MAP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let raw = fs::read_to_string(&path).ok();
    load_settings_with(raw.as_deref(), |name| std::env::var(name).ok())
}

pub fn load_settings_with(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> MapSettings {
    let mut settings = MapSettings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!("ignoring malformed map settings file: {err}"),
        }
    }

    let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = env("APP__MAP_PROVIDER") {
        apply_provider(&mut settings, &v);
    }
    if let Some(v) = env("MAPBOX_TOKEN") {
        settings.mapbox_token = Credential::from_input(&v);
    }
    if let Some(v) = env("GOOGLE_MAPS_KEY") {
        settings.google_key = Credential::from_input(&v);
    }
    if let Some(v) = env("APP__MAP_TOKEN") {
        settings.credential = Credential::from_input(&v);
    }
    if let Some(v) = env("APP__GEOCODER_URL") {
        settings.geocoder_url = v;
    }
    if let Some(v) = env("APP__GEOCODE_DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.geocode_debounce = Duration::from_millis(parsed);
        }
    }
    if let Some(v) = env("APP__GEOCODE_MIN_CHARS") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.geocode_min_chars = parsed.max(1);
        }
    }
    if let Some(v) = env("APP__GEOCODE_MAX_SUGGESTIONS") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.geocode_max_suggestions = clamp_suggestions(parsed);
        }
    }
    if let Some(v) = env("APP__CATALOG_PATH") {
        settings.catalog_path = Some(PathBuf::from(v));
    }

    settings
}

fn apply_file_settings(settings: &mut MapSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.provider {
        apply_provider(settings, &v);
    }
    if let Some(v) = file_cfg.token {
        settings.credential = Credential::from_input(&v);
    }
    if let (Some(lat), Some(lng)) = (file_cfg.center_lat, file_cfg.center_lng) {
        let center = LatLng::new(lat, lng);
        if center.is_valid() {
            settings.initial_center = center;
        } else {
            warn!(%center, "ignoring out-of-range initial map centre");
        }
    }
    if let Some(v) = file_cfg.zoom {
        settings.initial_zoom = v.clamp(1, 22);
    }
    if let Some(v) = file_cfg.tile_url_template {
        settings.tile_url_template = v;
    }
    if let Some(v) = file_cfg.mapbox_style {
        settings.mapbox_style = v;
    }
    if let Some(v) = file_cfg.geocoder_url {
        settings.geocoder_url = v;
    }
    if let Some(v) = file_cfg.geocoder_user_agent {
        settings.geocoder_user_agent = v;
    }
    if let Some(v) = file_cfg.geocode_debounce_ms {
        settings.geocode_debounce = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.geocode_min_chars {
        settings.geocode_min_chars = v.max(1);
    }
    if let Some(v) = file_cfg.geocode_max_suggestions {
        settings.geocode_max_suggestions = clamp_suggestions(v);
    }
    if let Some(v) = file_cfg.catalog_path {
        settings.catalog_path = Some(v);
    }
}

fn apply_provider(settings: &mut MapSettings, raw: &str) {
    match raw.parse::<ProviderKind>() {
        Ok(kind) => settings.provider = kind,
        Err(err) => warn!("{err}; keeping {}", settings.provider),
    }
}

/// Suggestion lists show between three and five entries.
pub fn clamp_suggestions(n: usize) -> usize {
    n.clamp(3, 5)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
