use serde::{Deserialize, Serialize};

use crate::domain::{LatLng, Property};

/// One geocoding suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCandidate {
    pub label: String,
    pub position: LatLng,
}

/// On-disk catalog format. A bare JSON array of properties is accepted too.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogDocument {
    Versioned {
        version: u8,
        properties: Vec<Property>,
    },
    Bare(Vec<Property>),
}

impl CatalogDocument {
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn into_properties(self) -> Vec<Property> {
        match self {
            CatalogDocument::Versioned { properties, .. } => properties,
            CatalogDocument::Bare(properties) => properties,
        }
    }
}
