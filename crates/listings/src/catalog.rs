use std::{collections::HashSet, fs, path::Path};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{LatLng, Property, PropertyId},
    protocol::CatalogDocument,
};
use thiserror::Error;
use tracing::info;

use crate::{ListingQuery, PropertySource};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate property id {0}")]
    DuplicateId(PropertyId),
    #[error("property {id} has an out-of-range position ({position})")]
    InvalidPosition { id: PropertyId, position: LatLng },
    #[error("property {id} has rating {rating} outside 0-5")]
    InvalidRating { id: PropertyId, rating: f32 },
    #[error("property {0} has an empty price label")]
    MissingPrice(PropertyId),
}

/// In-memory, read-only property source.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    properties: Vec<Property>,
}

impl StaticCatalog {
    pub fn new(properties: Vec<Property>) -> Result<Self, CatalogError> {
        validate(&properties)?;
        Ok(Self { properties })
    }

    pub fn builtin() -> Self {
        Self {
            properties: builtin_properties(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document = CatalogDocument::from_json_str(raw)?;
        Self::new(document.into_properties())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            count = catalog.properties.len(),
            "loaded property catalog"
        );
        Ok(catalog)
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

fn validate(properties: &[Property]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for property in properties {
        if !seen.insert(property.id) {
            return Err(CatalogError::DuplicateId(property.id));
        }
        if !property.position.is_valid() {
            return Err(CatalogError::InvalidPosition {
                id: property.id,
                position: property.position,
            });
        }
        if !property.has_valid_rating() {
            return Err(CatalogError::InvalidRating {
                id: property.id,
                rating: property.rating,
            });
        }
        if property.price.trim().is_empty() {
            return Err(CatalogError::MissingPrice(property.id));
        }
    }
    Ok(())
}

#[async_trait]
impl PropertySource for StaticCatalog {
    async fn list(&self, query: &ListingQuery) -> Result<Vec<Property>> {
        Ok(query.apply(&self.properties).cloned().collect())
    }

    async fn get(&self, id: PropertyId) -> Result<Option<Property>> {
        Ok(self.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn kinds(&self) -> Result<Vec<String>> {
        let mut kinds: Vec<String> = Vec::new();
        for property in &self.properties {
            if !kinds.iter().any(|k| k == &property.kind) {
                kinds.push(property.kind.clone());
            }
        }
        Ok(kinds)
    }
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: i64,
    name: &str,
    address: &str,
    position: LatLng,
    rating: f32,
    review_count: u32,
    price: &str,
    kind: &str,
    image: &str,
    highlights: &[&str],
) -> Property {
    Property {
        id: PropertyId(id),
        name: name.to_string(),
        address: address.to_string(),
        position,
        rating,
        review_count,
        price: price.to_string(),
        kind: kind.to_string(),
        image: Some(image.to_string()),
        highlights: highlights.iter().map(|h| h.to_string()).collect(),
    }
}

/// Demo listings around lower and midtown Manhattan.
pub fn builtin_properties() -> Vec<Property> {
    vec![
        listing(
            1,
            "Downtown Apartment",
            "123 Main St, Manhattan",
            LatLng::new(40.7128, -74.006),
            4.2,
            15,
            "$2,400",
            "Apartment",
            "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=300&h=200&fit=crop",
            &["Great location", "Responsive landlord"],
        ),
        listing(
            2,
            "Suburban House",
            "456 Oak Ave, Brooklyn",
            LatLng::new(40.7228, -74.016),
            3.8,
            8,
            "$3,200",
            "House",
            "https://images.unsplash.com/photo-1568605114967-8130f3a36994?w=300&h=200&fit=crop",
            &["Quiet neighborhood", "Pet-friendly"],
        ),
        listing(
            3,
            "Cozy Studio",
            "789 Pine St, East Village",
            LatLng::new(40.7028, -73.996),
            4.5,
            23,
            "$1,800",
            "Studio",
            "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=300&h=200&fit=crop",
            &["Newly renovated", "Good value"],
        ),
        listing(
            4,
            "Modern Loft",
            "321 Broadway, SoHo",
            LatLng::new(40.7208, -74.003),
            4.7,
            31,
            "$4,100",
            "Loft",
            "https://images.unsplash.com/photo-1484154218962-a197022b5858?w=300&h=200&fit=crop",
            &["Great amenities", "Clean building"],
        ),
        listing(
            5,
            "Charming Brownstone",
            "654 Park Ave, Upper East Side",
            LatLng::new(40.7489, -73.976),
            4.1,
            12,
            "$5,500",
            "Townhouse",
            "https://images.unsplash.com/photo-1449844908441-8829872d2607?w=300&h=200&fit=crop",
            &["Period features"],
        ),
        listing(
            6,
            "Riverside Apartment",
            "987 West End Ave, Upper West Side",
            LatLng::new(40.7831, -73.985),
            3.9,
            19,
            "$2,800",
            "Apartment",
            "https://images.unsplash.com/photo-1545324418-cc1a3fa10c00?w=300&h=200&fit=crop",
            &["River views", "Excellent management"],
        ),
    ]
}
