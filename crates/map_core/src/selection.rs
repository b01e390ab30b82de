use std::collections::HashSet;

use shared::domain::{LatLng, Property, PropertyId};
use tracing::{debug, warn};

use crate::{
    error::MapError,
    projection::{ScreenPoint, Viewport},
    provider::{MapEvent, MapProvider, MarkerHandle, MarkerSpec, MarkerStyle, PlacedMarker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(PropertyId),
}

impl Selection {
    pub fn property_id(self) -> Option<PropertyId> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(id) => Some(id),
        }
    }

    fn style_for(self, id: PropertyId) -> MarkerStyle {
        if self == Selection::Selected(id) {
            MarkerStyle::Selected
        } else {
            MarkerStyle::Default
        }
    }
}

/// Detail card shown for the selected property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPopup {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    pub rating: f32,
    pub review_count: u32,
    pub kind: String,
    pub price: String,
    pub image: Option<String>,
}

impl From<&Property> for PropertyPopup {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            name: property.name.clone(),
            address: property.address.clone(),
            rating: property.rating,
            review_count: property.review_count,
            kind: property.kind.clone(),
            price: property.price.clone(),
            image: property.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OwnedMarker {
    property_id: PropertyId,
    handle: MarkerHandle,
}

/// Places one price marker per property on a provider and keeps a single
/// selection over them.
///
/// Invariant: the marker of the selected property is the only one styled
/// [`MarkerStyle::Selected`]. Every marker handle placed is recorded in
/// `owned` and released before the next render and when the controller is
/// dropped.
pub struct MarkerSelectionController {
    provider: Box<dyn MapProvider>,
    properties: Vec<Property>,
    owned: Vec<OwnedMarker>,
    selection: Selection,
}

impl MarkerSelectionController {
    /// Takes ownership of an initialized provider.
    pub fn new(provider: Box<dyn MapProvider>) -> Self {
        Self {
            provider,
            properties: Vec::new(),
            owned: Vec::new(),
            selection: Selection::Unselected,
        }
    }

    pub fn render_markers(&mut self, properties: Vec<Property>) -> Result<(), MapError> {
        let mut seen = HashSet::with_capacity(properties.len());
        if let Some(dup) = properties.iter().find(|p| !seen.insert(p.id)) {
            return Err(MapError::DuplicateProperty(dup.id));
        }

        self.release_markers();

        if let Selection::Selected(id) = self.selection {
            if !properties.iter().any(|p| p.id == id) {
                debug!(property_id = %id, "selected property left the result set");
                self.selection = Selection::Unselected;
            }
        }

        let mut failure = None;
        for property in &properties {
            let placed = self.provider.place_marker(MarkerSpec {
                position: property.position,
                label: property.price.clone(),
                style: self.selection.style_for(property.id),
            });
            match placed {
                Ok(handle) => self.owned.push(OwnedMarker {
                    property_id: property.id,
                    handle,
                }),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        // A partial render leaves nothing behind: no markers, no properties.
        if let Some(err) = failure {
            warn!(provider = %self.provider.kind(), "marker placement failed: {err}");
            self.release_markers();
            self.properties.clear();
            self.selection = Selection::Unselected;
            return Err(err);
        }
        debug!(
            provider = %self.provider.kind(),
            markers = self.owned.len(),
            "rendered property markers"
        );
        self.properties = properties;
        Ok(())
    }

    pub fn select_marker(&mut self, property_id: PropertyId) -> Result<(), MapError> {
        if self.selection == Selection::Selected(property_id) {
            return Ok(());
        }
        if !self.owned.iter().any(|m| m.property_id == property_id) {
            return Err(MapError::UnknownProperty(property_id));
        }
        debug!(from = ?self.selection, to = %property_id, "marker selected");
        self.selection = Selection::Selected(property_id);
        self.refresh_styles()
    }

    pub fn clear_selection(&mut self) -> Result<(), MapError> {
        if self.selection == Selection::Unselected {
            return Ok(());
        }
        debug!(from = ?self.selection, "selection cleared");
        self.selection = Selection::Unselected;
        self.refresh_styles()
    }

    pub fn handle_event(&mut self, event: MapEvent) -> Result<(), MapError> {
        match event {
            MapEvent::MarkerClicked(handle) => {
                let property_id = self
                    .owned
                    .iter()
                    .find(|m| m.handle == handle)
                    .map(|m| m.property_id)
                    .ok_or(MapError::UnknownMarker(handle))?;
                self.select_marker(property_id)
            }
            MapEvent::BackgroundClicked => self.clear_selection(),
        }
    }

    /// Routes a pointer click (viewport coordinates) through the provider.
    pub fn click(&mut self, point: ScreenPoint) -> Result<MapEvent, MapError> {
        let event = self.provider.hit_test(point);
        self.handle_event(event)?;
        Ok(event)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn popup(&self) -> Option<PropertyPopup> {
        let id = self.selection.property_id()?;
        self.properties
            .iter()
            .find(|p| p.id == id)
            .map(PropertyPopup::from)
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn marker_count(&self) -> usize {
        self.owned.len()
    }

    pub fn marker_for(&self, property_id: PropertyId) -> Option<MarkerHandle> {
        self.owned
            .iter()
            .find(|m| m.property_id == property_id)
            .map(|m| m.handle)
    }

    pub fn markers(&self) -> Vec<&PlacedMarker> {
        self.provider.markers()
    }

    pub fn provider(&self) -> &dyn MapProvider {
        self.provider.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.provider.viewport()
    }

    pub fn pan_to(&mut self, center: LatLng) {
        self.provider.pan_to(center);
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.provider.set_zoom(zoom);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.provider.resize(width, height);
    }

    fn refresh_styles(&mut self) -> Result<(), MapError> {
        for marker in &self.owned {
            self.provider
                .set_marker_style(marker.handle, self.selection.style_for(marker.property_id))?;
        }
        Ok(())
    }

    fn release_markers(&mut self) {
        for marker in self.owned.drain(..) {
            if let Err(err) = self.provider.remove_marker(marker.handle) {
                warn!(property_id = %marker.property_id, "failed to release marker: {err}");
            }
        }
    }
}

impl Drop for MarkerSelectionController {
    fn drop(&mut self) {
        self.release_markers();
        self.provider.teardown();
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
