use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(PropertyId);

/// Geographic position in degrees.
///
/// Catalogs encode positions either as a GeoJSON-ordered `[lng, lat]` pair or
/// as a named `{ "lat": .., "lng": .. }` object; both deserialize here. The
/// named form is always written back out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PositionRepr")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    LngLat([f64; 2]),
    Named {
        lat: f64,
        #[serde(alias = "lon")]
        lng: f64,
    },
}

impl From<PositionRepr> for LatLng {
    fn from(value: PositionRepr) -> Self {
        match value {
            PositionRepr::LngLat([lng, lat]) => Self { lat, lng },
            PositionRepr::Named { lat, lng } => Self { lat, lng },
        }
    }
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

pub const MAX_RATING: f32 = 5.0;

/// A rental listing as supplied by a property source. Records are read-only
/// once loaded; the price stays a display string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    #[serde(alias = "coordinates")]
    pub position: LatLng,
    pub rating: f32,
    pub review_count: u32,
    pub price: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

impl Property {
    pub fn has_valid_rating(&self) -> bool {
        self.rating.is_finite() && (0.0..=MAX_RATING).contains(&self.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_accepts_geojson_pair_in_lng_lat_order() {
        let pos: LatLng = serde_json::from_str("[-74.006, 40.7128]").expect("pair");
        assert_eq!(pos, LatLng::new(40.7128, -74.006));
    }

    #[test]
    fn position_accepts_named_fields_and_lon_alias() {
        let named: LatLng = serde_json::from_str(r#"{"lat": 40.7, "lng": -73.9}"#).expect("named");
        let aliased: LatLng = serde_json::from_str(r#"{"lat": 40.7, "lon": -73.9}"#).expect("lon");
        assert_eq!(named, aliased);
        assert_eq!(
            serde_json::to_value(named).expect("serialize"),
            serde_json::json!({"lat": 40.7, "lng": -73.9})
        );
    }

    #[test]
    fn property_reads_camel_case_catalog_record() {
        let raw = r#"{
            "id": 3,
            "name": "Cozy Studio",
            "address": "789 Pine St, East Village",
            "coordinates": [-73.996, 40.7028],
            "rating": 4.5,
            "reviewCount": 23,
            "price": "$1,800",
            "type": "Studio"
        }"#;
        let property: Property = serde_json::from_str(raw).expect("property");
        assert_eq!(property.id, PropertyId(3));
        assert_eq!(property.kind, "Studio");
        assert_eq!(property.review_count, 23);
        assert!(property.image.is_none());
        assert!(property.highlights.is_empty());
        assert!(property.position.is_valid());
    }

    #[test]
    fn out_of_range_values_are_flagged() {
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, -181.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }
}
