use super::*;

use shared::domain::LatLng;

use crate::{
    error::MapError,
    projection::{ScreenPoint, Viewport, TILE_SIZE},
    provider::{Credential, MarkerSpec, MarkerStyle},
};

fn nyc() -> Viewport {
    Viewport::new(LatLng::new(40.7128, -74.006), 12, 800.0, 600.0)
}

fn cred(raw: &str) -> Credential {
    Credential::from_input(raw).expect("non-blank credential")
}

fn spec(label: &str) -> MarkerSpec {
    MarkerSpec {
        position: LatLng::new(40.7128, -74.006),
        label: label.to_string(),
        style: MarkerStyle::Default,
    }
}

#[test]
fn blank_input_is_not_a_credential() {
    assert!(Credential::from_input("   ").is_none());
    assert_eq!(cred("  pk.abc \n").expose(), "pk.abc");
    assert_eq!(format!("{:?}", cred("pk.secret")), "Credential(<redacted>)");
}

#[test]
fn leaflet_starts_without_a_credential() {
    let mut provider = LeafletProvider::default();
    assert!(!provider.is_initialized());
    provider.initialize(None, nyc()).expect("leaflet init");
    assert!(provider.is_initialized());

    let tiles = provider.background();
    let centre = tiles
        .iter()
        .find(|tile| tile.url.as_str() == "https://tile.openstreetmap.org/12/1205/1540.png")
        .expect("centre tile");
    assert_eq!(centre.world_origin, (1205.0 * TILE_SIZE, 1540.0 * TILE_SIZE));
    assert_eq!((centre.width, centre.height), (256, 256));
}

#[test]
fn leaflet_tiles_cover_the_whole_viewport() {
    let mut provider = LeafletProvider::default();
    provider.initialize(None, nyc()).expect("leaflet init");
    let viewport = provider.viewport();

    let tiles = provider.background();
    assert_eq!(tiles.len(), 16);
    assert!(tiles.iter().all(|tile| tile.zoom == 12));

    // Every corner and the middle of the window lands on some tile.
    let corners = [
        ScreenPoint::new(0.0, 0.0),
        ScreenPoint::new(799.0, 0.0),
        ScreenPoint::new(0.0, 599.0),
        ScreenPoint::new(799.0, 599.0),
        ScreenPoint::new(400.0, 300.0),
    ];
    for point in corners {
        let covered = tiles.iter().any(|tile| {
            let top_left = viewport.world_to_screen(tile.world_origin.0, tile.world_origin.1);
            (top_left.x..top_left.x + tile.width as f32).contains(&point.x)
                && (top_left.y..top_left.y + tile.height as f32).contains(&point.y)
        });
        assert!(covered, "{point:?} has no tile");
    }
}

#[test]
fn leaflet_rejects_template_without_placeholders() {
    let mut provider = LeafletProvider::new("https://tiles.example.test/{z}/tile.png");
    let err = provider.initialize(None, nyc()).expect_err("bad template");
    assert!(matches!(err, MapError::InitFailed { provider: ProviderKind::Leaflet, .. }));
    assert!(!provider.is_initialized());
}

#[test]
fn mapbox_needs_a_public_token() {
    let mut provider = MapboxProvider::new(DEFAULT_MAPBOX_STYLE);
    assert_eq!(
        provider.initialize(None, nyc()),
        Err(MapError::MissingCredential { provider: ProviderKind::Mapbox })
    );
    assert!(matches!(
        provider.initialize(Some(&cred("sk.secret")), nyc()),
        Err(MapError::InvalidCredential { provider: ProviderKind::Mapbox, .. })
    ));
    assert!(provider.background().is_empty());

    provider
        .initialize(Some(&cred("pk.test-token")), nyc())
        .expect("mapbox init");
    let images = provider.background();
    assert_eq!(images.len(), 1);
    let background = &images[0];
    let url = background.url.as_str();
    assert!(url.starts_with(
        "https://api.mapbox.com/styles/v1/mapbox/streets-v12/static/-74.006000,40.712800,12/800x600"
    ));
    assert!(url.contains("access_token=pk.test-token"));
}

#[test]
fn google_key_may_not_contain_whitespace() {
    let mut provider = GoogleMapsProvider::new();
    assert_eq!(
        provider.initialize(None, nyc()),
        Err(MapError::MissingCredential { provider: ProviderKind::Google })
    );
    assert!(matches!(
        provider.initialize(Some(&cred("AIza bad key")), nyc()),
        Err(MapError::InvalidCredential { provider: ProviderKind::Google, .. })
    ));

    provider
        .initialize(Some(&cred("AIzaTestKey")), nyc())
        .expect("google init");
    let images = provider.background();
    let background = images.first().expect("static map");
    let pairs: Vec<(String, String)> = background.url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("key".to_string(), "AIzaTestKey".to_string())));
    assert!(pairs.contains(&("zoom".to_string(), "12".to_string())));
    // Google caps static maps at 640 pixels per side.
    assert!(pairs.contains(&("size".to_string(), "640x600".to_string())));
    assert_eq!((background.width, background.height), (640, 600));
}

#[test]
fn markers_require_initialization() {
    let mut provider = LeafletProvider::default();
    assert_eq!(
        provider.place_marker(spec("$2,400")),
        Err(MapError::NotInitialized { provider: ProviderKind::Leaflet })
    );
}

#[test]
fn marker_lifecycle_and_teardown() {
    let mut provider = MapboxProvider::new(DEFAULT_MAPBOX_STYLE);
    provider
        .initialize(Some(&cred("pk.token")), nyc())
        .expect("init");

    let first = provider.place_marker(spec("$2,400")).expect("place");
    let second = provider.place_marker(spec("$3,200")).expect("place");
    assert_ne!(first, second);
    assert_eq!(provider.markers().len(), 2);

    provider
        .set_marker_style(second, MarkerStyle::Selected)
        .expect("restyle");
    provider.remove_marker(first).expect("remove");
    assert_eq!(provider.remove_marker(first), Err(MapError::UnknownMarker(first)));

    provider.teardown();
    assert!(!provider.is_initialized());
    assert!(provider.markers().is_empty());
    assert!(provider.background().is_empty());
}

#[test]
fn zoom_is_clamped_to_provider_range() {
    let mut provider = LeafletProvider::default();
    provider.initialize(None, nyc()).expect("init");
    provider.set_zoom(30);
    assert_eq!(provider.viewport().zoom, 19);
    provider.set_zoom(0);
    assert_eq!(provider.viewport().zoom, 1);
}

#[test]
fn build_provider_follows_settings() {
    let settings = MapSettings::default();
    assert_eq!(build_provider(&settings).kind(), ProviderKind::Leaflet);

    let settings = MapSettings::default().with_provider(ProviderKind::Mapbox, None);
    assert_eq!(build_provider(&settings).kind(), ProviderKind::Mapbox);

    let settings = MapSettings::default().with_provider(ProviderKind::Google, None);
    let provider = build_provider(&settings);
    assert_eq!(provider.kind(), ProviderKind::Google);
    assert!(provider.kind().requires_credential());
    assert_eq!(provider.attribution(), "Map data © Google");
}

#[test]
fn provider_names_parse_case_insensitively() {
    assert_eq!("OSM".parse::<ProviderKind>(), Ok(ProviderKind::Leaflet));
    assert_eq!(" Mapbox ".parse::<ProviderKind>(), Ok(ProviderKind::Mapbox));
    assert_eq!("google_maps".parse::<ProviderKind>(), Ok(ProviderKind::Google));
    assert!("bing".parse::<ProviderKind>().is_err());
}
