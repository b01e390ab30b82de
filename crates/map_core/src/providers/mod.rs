//! One [`MapProvider`](crate::provider::MapProvider) implementation per
//! mapping backend.

mod google;
pub mod layer;
mod leaflet;
mod mapbox;

pub use google::GoogleMapsProvider;
pub use leaflet::{LeafletProvider, OSM_TILE_TEMPLATE};
pub use mapbox::{MapboxProvider, DEFAULT_MAPBOX_STYLE};

use crate::{
    config::MapSettings,
    provider::{MapProvider, ProviderKind},
};

/// Picks the backend named by configuration. This is the only place that
/// looks at the provider kind.
pub fn build_provider(settings: &MapSettings) -> Box<dyn MapProvider> {
    match settings.provider {
        ProviderKind::Leaflet => Box::new(LeafletProvider::new(settings.tile_url_template.clone())),
        ProviderKind::Mapbox => Box::new(MapboxProvider::new(settings.mapbox_style.clone())),
        ProviderKind::Google => Box::new(GoogleMapsProvider::new()),
    }
}

#[cfg(test)]
#[path = "../tests/providers_tests.rs"]
mod tests;
