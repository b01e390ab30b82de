use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{domain::LatLng, protocol::GeoCandidate};
use tracing::debug;
use url::Url;

use crate::{config::MapSettings, error::GeocodeError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Free-text location lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<GeoCandidate>, GeocodeError>;
}

/// Client for a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    http: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn into_candidate(self) -> Result<GeoCandidate, GeocodeError> {
        let parse = |raw: &str, axis: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|err| GeocodeError::Malformed(format!("{axis} '{raw}': {err}")))
        };
        let position = LatLng::new(parse(&self.lat, "lat")?, parse(&self.lon, "lon")?);
        if !position.is_valid() {
            return Err(GeocodeError::Malformed(format!(
                "position out of range for '{}'",
                self.display_name
            )));
        }
        Ok(GeoCandidate {
            label: self.display_name,
            position,
        })
    }
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str) -> Result<Self, GeocodeError> {
        let endpoint = Url::parse(endpoint)?;
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, endpoint })
    }

    pub fn from_settings(settings: &MapSettings) -> Result<Self, GeocodeError> {
        Self::new(&settings.geocoder_url, &settings.geocoder_user_agent)
    }

    fn search_url(&self, query: &str, limit: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "jsonv2")
            .append_pair("limit", &limit.to_string());
        url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<GeoCandidate>, GeocodeError> {
        let url = self.search_url(query, limit);
        debug!(query, limit, "geocoding lookup");
        let res = self.http.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }
        let places: Vec<NominatimPlace> = res
            .json()
            .await
            .map_err(|err| GeocodeError::Malformed(err.to_string()))?;
        places
            .into_iter()
            .take(limit)
            .map(NominatimPlace::into_candidate)
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/geocode_tests.rs"]
mod tests;
