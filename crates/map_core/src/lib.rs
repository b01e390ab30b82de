//! Map state for the rental explorer: provider abstraction, marker selection,
//! credential fallback and debounced geocoding suggestions.

pub mod config;
pub mod error;
pub mod geocode;
pub mod projection;
pub mod provider;
pub mod providers;
pub mod selection;
pub mod session;
pub mod suggestions;

pub use config::{load_settings, load_settings_with, MapSettings};
pub use error::{GeocodeError, MapError};
pub use geocode::{Geocoder, NominatimGeocoder};
pub use projection::{ScreenPoint, Viewport};
pub use provider::{
    BackgroundImage, Credential, MapEvent, MapProvider, MarkerHandle, MarkerSpec, MarkerStyle,
    PlacedMarker, ProviderKind,
};
pub use providers::{build_provider, GoogleMapsProvider, LeafletProvider, MapboxProvider};
pub use selection::{MarkerSelectionController, PropertyPopup, Selection};
pub use session::{CredentialPrompt, MapSession, MapSurface};
pub use suggestions::{GeocodeRequest, SuggestionSearch};
