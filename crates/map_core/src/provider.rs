use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::domain::LatLng;
use url::Url;

use crate::{
    error::MapError,
    projection::{ScreenPoint, Viewport},
    providers::layer::ProviderCore,
};

/// Price-pill icon geometry, anchored at its centre.
pub const MARKER_WIDTH: f32 = 60.0;
pub const MARKER_HEIGHT: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Leaflet,
    Mapbox,
    Google,
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Leaflet => "OpenStreetMap",
            ProviderKind::Mapbox => "Mapbox",
            ProviderKind::Google => "Google Maps",
        }
    }

    pub fn requires_credential(self) -> bool {
        !matches!(self, ProviderKind::Leaflet)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leaflet" | "osm" | "openstreetmap" => Ok(ProviderKind::Leaflet),
            "mapbox" => Ok(ProviderKind::Mapbox),
            "google" | "google_maps" | "googlemaps" => Ok(ProviderKind::Google),
            other => Err(format!("unknown map provider '{other}'")),
        }
    }
}

/// User-supplied access token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trims prompt or config input; blank input is no credential at all.
    pub fn from_input(secret: &str) -> Option<Self> {
        let secret = secret.trim();
        (!secret.is_empty()).then(|| Self(secret.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    #[default]
    Default,
    Selected,
}

impl MarkerStyle {
    pub fn scale(self) -> f32 {
        match self {
            MarkerStyle::Default => 1.0,
            MarkerStyle::Selected => 1.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub label: String,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub handle: MarkerHandle,
    pub position: LatLng,
    pub label: String,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    MarkerClicked(MarkerHandle),
    BackgroundClicked,
}

/// One raster image to fetch for the current viewport: a map tile or a whole
/// static map. `world_origin` is the absolute pixel position of the image's
/// top-left corner at `zoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    pub url: Url,
    pub world_origin: (f64, f64),
    pub width: u32,
    pub height: u32,
    pub zoom: u8,
}

/// Capability set every mapping backend offers. Marker bookkeeping and the
/// viewport live in a [`ProviderCore`]; implementations supply credential
/// handling and imagery.
pub trait MapProvider: Send {
    fn kind(&self) -> ProviderKind;

    fn core(&self) -> &ProviderCore;

    fn core_mut(&mut self) -> &mut ProviderCore;

    fn initialize(
        &mut self,
        credential: Option<&Credential>,
        viewport: Viewport,
    ) -> Result<(), MapError>;

    /// Images that together cover the viewport; empty until initialized.
    fn background(&self) -> Vec<BackgroundImage>;

    fn attribution(&self) -> &'static str;

    fn is_initialized(&self) -> bool {
        self.core().is_initialized()
    }

    fn place_marker(&mut self, spec: MarkerSpec) -> Result<MarkerHandle, MapError> {
        let kind = self.kind();
        self.core_mut().place(kind, spec)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> Result<(), MapError> {
        let kind = self.kind();
        self.core_mut().remove(kind, handle)
    }

    fn set_marker_style(&mut self, handle: MarkerHandle, style: MarkerStyle) -> Result<(), MapError> {
        let kind = self.kind();
        self.core_mut().restyle(kind, handle, style)
    }

    fn markers(&self) -> Vec<&PlacedMarker> {
        self.core().markers()
    }

    /// Translates a pointer click into the marker-click or background-click
    /// callback the provider would fire.
    fn hit_test(&self, point: ScreenPoint) -> MapEvent {
        match self.core().marker_at(point) {
            Some(handle) => MapEvent::MarkerClicked(handle),
            None => MapEvent::BackgroundClicked,
        }
    }

    fn viewport(&self) -> Viewport {
        self.core().viewport()
    }

    fn pan_to(&mut self, center: LatLng) {
        self.core_mut().pan_to(center);
    }

    fn set_zoom(&mut self, zoom: u8) {
        self.core_mut().set_zoom(zoom);
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.core_mut().resize(width, height);
    }

    fn teardown(&mut self) {
        self.core_mut().teardown();
    }
}
