//! Backend commands queued from UI to backend worker.

use listings::ListingQuery;
use map_core::{BackgroundImage, GeocodeRequest};
use shared::domain::PropertyId;
use url::Url;

#[derive(Debug, Clone)]
pub enum BackendCommand {
    LoadProperties {
        query: ListingQuery,
    },
    LoadKinds,
    Geocode(GeocodeRequest),
    FetchBackground {
        generation: u64,
        image: BackgroundImage,
    },
    FetchPhoto {
        id: PropertyId,
        url: Url,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadProperties { .. } => "load_properties",
            BackendCommand::LoadKinds => "load_kinds",
            BackendCommand::Geocode(_) => "geocode",
            BackendCommand::FetchBackground { .. } => "fetch_background",
            BackendCommand::FetchPhoto { .. } => "fetch_photo",
        }
    }
}
