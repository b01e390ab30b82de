use super::*;

use shared::domain::{LatLng, PropertyId};

use crate::{projection::ScreenPoint, selection::Selection};

fn property(id: i64, price: &str) -> Property {
    Property {
        id: PropertyId(id),
        name: format!("Listing {id}"),
        address: format!("{id} Broadway"),
        position: LatLng::new(40.71 + id as f64 * 0.01, -74.0),
        rating: 4.0,
        review_count: 10,
        price: price.to_string(),
        kind: "Loft".to_string(),
        image: None,
        highlights: Vec::new(),
    }
}

fn mapbox_settings(token: Option<&str>) -> MapSettings {
    MapSettings::default().with_provider(ProviderKind::Mapbox, token.and_then(Credential::from_input))
}

#[test]
fn leaflet_session_goes_live_and_renders_markers() {
    let session = MapSession::open(MapSettings::default(), vec![property(1, "$1"), property(2, "$2")]);
    assert!(session.is_live());
    let controller = session.controller().expect("live");
    assert_eq!(controller.marker_count(), 2);
    assert_eq!(controller.provider().kind(), ProviderKind::Leaflet);
}

#[test]
fn missing_token_presents_credential_prompt() {
    let session = MapSession::open(mapbox_settings(None), vec![property(1, "$1")]);
    assert!(!session.is_live());
    let prompt = session.prompt().expect("prompt");
    assert_eq!(prompt.provider(), ProviderKind::Mapbox);
    assert_eq!(prompt.code(), ErrorCode::MissingCredential);
    assert!(prompt.reason().contains("Mapbox"));
}

#[test]
fn environment_token_is_used_when_provider_is_picked_later() {
    let mut settings = MapSettings {
        mapbox_token: Credential::from_input("pk.fromenv"),
        ..MapSettings::default()
    };
    settings.provider = ProviderKind::Mapbox;

    let session = MapSession::open(settings, vec![property(1, "$1")]);
    assert!(session.prompt().is_none());
    let controller = session.controller().expect("live");
    assert_eq!(controller.provider().kind(), ProviderKind::Mapbox);
}

#[test]
fn invalid_token_is_reported_and_can_be_re_entered() {
    let mut session = MapSession::open(mapbox_settings(Some("sk.secret")), vec![property(1, "$1")]);
    assert_eq!(
        session.prompt().expect("prompt").code(),
        ErrorCode::InvalidCredential
    );

    assert!(!session.submit_credential("   "));
    assert_eq!(
        session.prompt().expect("still prompting").code(),
        ErrorCode::MissingCredential
    );

    assert!(session.submit_credential("pk.valid-token"));
    let controller = session.controller().expect("live");
    assert_eq!(controller.marker_count(), 1);
    assert!(!controller.provider().background().is_empty());
}

#[test]
fn provider_failure_after_start_degrades_to_prompt_and_resumes_view() {
    let mut session = MapSession::open(mapbox_settings(Some("pk.first")), vec![property(1, "$1")]);
    let moved = LatLng::new(40.75, -73.98);
    session.controller_mut().expect("live").pan_to(moved);

    session.report_provider_failure(MapError::InvalidCredential {
        provider: ProviderKind::Mapbox,
        reason: "HTTP 401".to_string(),
    });
    assert!(session.controller().is_none());
    assert!(session.prompt().expect("prompt").reason().contains("HTTP 401"));

    assert!(session.submit_credential("pk.second"));
    assert_eq!(session.controller().expect("live").viewport().center, moved);
}

#[test]
fn refresh_while_prompting_is_kept_for_when_the_map_starts() {
    let mut session = MapSession::open(mapbox_settings(None), Vec::new());
    session
        .refresh_properties(vec![property(1, "$1"), property(2, "$2"), property(3, "$3")])
        .expect("refresh");
    assert!(session.submit_credential("pk.token"));
    assert_eq!(session.controller().expect("live").marker_count(), 3);
}

#[test]
fn refresh_while_live_rerenders_without_duplicates() {
    let mut session = MapSession::open(MapSettings::default(), vec![property(1, "$1")]);
    session
        .refresh_properties(vec![property(1, "$1"), property(2, "$2")])
        .expect("refresh");
    session
        .refresh_properties(vec![property(2, "$2")])
        .expect("refresh again");
    let controller = session.controller().expect("live");
    assert_eq!(controller.markers().len(), 1);
    assert_eq!(controller.markers()[0].label, "$2");
}

#[test]
fn custom_factory_is_used_for_provider_selection() {
    let settings = MapSettings::default().with_provider(ProviderKind::Google, None);
    let session = MapSession::with_factory(
        settings,
        vec![property(1, "$1")],
        Box::new(|_settings: &MapSettings| -> Box<dyn MapProvider> {
            Box::new(crate::providers::LeafletProvider::default())
        }),
    );
    assert!(session.is_live());
    assert_eq!(
        session.controller().expect("live").provider().kind(),
        ProviderKind::Leaflet
    );
}

#[test]
fn session_click_flow_selects_and_clears() {
    let mut session = MapSession::open(MapSettings::default(), vec![property(1, "$1")]);
    let controller = session.controller_mut().expect("live");
    let at = controller.viewport().project(LatLng::new(40.72, -74.0));
    controller.click(at).expect("marker click");
    assert_eq!(controller.selection(), Selection::Selected(PropertyId(1)));
    controller
        .click(ScreenPoint::new(1.0, 1.0))
        .expect("background click");
    assert_eq!(controller.selection(), Selection::Unselected);
}
