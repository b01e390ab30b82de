use super::*;

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn search(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if agent != "rental-map-tests" {
        return Err(StatusCode::FORBIDDEN);
    }
    if params.get("format").map(String::as_str) != Some("jsonv2") {
        return Err(StatusCode::BAD_REQUEST);
    }
    match params.get("q").map(String::as_str) {
        Some("Brooklyn") => Ok(Json(json!([
            {"display_name": "Brooklyn, Kings County, New York", "lat": "40.6526006", "lon": "-73.9497211"},
            {"display_name": "Brooklyn Heights, New York", "lat": "40.6959", "lon": "-73.9951"},
            {"display_name": "Brooklyn Navy Yard, New York", "lat": "40.7003", "lon": "-73.9719"}
        ]))),
        Some("broken") => Ok(Json(json!([
            {"display_name": "Nowhere", "lat": "north-ish", "lon": "0"}
        ]))),
        Some("down") => Err(StatusCode::SERVICE_UNAVAILABLE),
        _ => Ok(Json(json!([]))),
    }
}

async fn spawn_geocoder() -> String {
    let app = Router::new().route("/search", get(search));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}/search")
}

#[tokio::test]
async fn parses_candidates_and_respects_limit() {
    let endpoint = spawn_geocoder().await;
    let geocoder = NominatimGeocoder::new(&endpoint, "rental-map-tests").expect("geocoder");

    let results = geocoder.lookup("Brooklyn", 2).await.expect("lookup");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label, "Brooklyn, Kings County, New York");
    assert!((results[0].position.lat - 40.6526006).abs() < 1e-9);
    assert!((results[0].position.lng + 73.9497211).abs() < 1e-9);
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    let endpoint = spawn_geocoder().await;
    let geocoder = NominatimGeocoder::new(&endpoint, "rental-map-tests").expect("geocoder");
    assert!(geocoder.lookup("Atlantis", 5).await.expect("lookup").is_empty());
}

#[tokio::test]
async fn http_failures_and_bad_payloads_are_typed() {
    let endpoint = spawn_geocoder().await;
    let geocoder = NominatimGeocoder::new(&endpoint, "rental-map-tests").expect("geocoder");

    assert!(matches!(
        geocoder.lookup("down", 5).await,
        Err(GeocodeError::Status(503))
    ));
    assert!(matches!(
        geocoder.lookup("broken", 5).await,
        Err(GeocodeError::Malformed(_))
    ));

    let wrong_agent = NominatimGeocoder::new(&endpoint, "someone-else").expect("geocoder");
    assert!(matches!(
        wrong_agent.lookup("Brooklyn", 5).await,
        Err(GeocodeError::Status(403))
    ));
}

#[test]
fn rejects_unparseable_endpoint() {
    assert!(matches!(
        NominatimGeocoder::new("not a url", "ua"),
        Err(GeocodeError::InvalidEndpoint(_))
    ));
}

#[test]
fn search_url_carries_query_format_and_limit() {
    let geocoder =
        NominatimGeocoder::new("https://geo.example.test/search", "ua").expect("geocoder");
    let url = geocoder.search_url("5th Ave & 42nd", 3);
    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs.get("q").map(String::as_str), Some("5th Ave & 42nd"));
    assert_eq!(pairs.get("format").map(String::as_str), Some("jsonv2"));
    assert_eq!(pairs.get("limit").map(String::as_str), Some("3"));
}
