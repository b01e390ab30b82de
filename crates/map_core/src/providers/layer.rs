use std::collections::BTreeMap;

use shared::domain::LatLng;
use tracing::debug;

use crate::{
    error::MapError,
    projection::{to_world, ScreenPoint, Viewport},
    provider::{
        MarkerHandle, MarkerSpec, MarkerStyle, PlacedMarker, ProviderKind, MARKER_HEIGHT,
        MARKER_WIDTH,
    },
};

/// Marker layer and viewport state common to every provider.
#[derive(Debug)]
pub struct ProviderCore {
    viewport: Viewport,
    max_zoom: u8,
    initialized: bool,
    markers: BTreeMap<MarkerHandle, PlacedMarker>,
    next_handle: u64,
}

impl ProviderCore {
    pub fn new(max_zoom: u8) -> Self {
        Self {
            viewport: Viewport::new(LatLng::new(0.0, 0.0), 0, 1.0, 1.0),
            max_zoom,
            initialized: false,
            markers: BTreeMap::new(),
            next_handle: 1,
        }
    }

    pub fn start(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.viewport.zoom = viewport.zoom.min(self.max_zoom);
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn ensure_initialized(&self, provider: ProviderKind) -> Result<(), MapError> {
        if self.initialized {
            Ok(())
        } else {
            Err(MapError::NotInitialized { provider })
        }
    }

    pub fn place(&mut self, provider: ProviderKind, spec: MarkerSpec) -> Result<MarkerHandle, MapError> {
        self.ensure_initialized(provider)?;
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.insert(
            handle,
            PlacedMarker {
                handle,
                position: spec.position,
                label: spec.label,
                style: spec.style,
            },
        );
        Ok(handle)
    }

    pub fn remove(&mut self, provider: ProviderKind, handle: MarkerHandle) -> Result<(), MapError> {
        self.ensure_initialized(provider)?;
        self.markers
            .remove(&handle)
            .map(|_| ())
            .ok_or(MapError::UnknownMarker(handle))
    }

    pub fn restyle(
        &mut self,
        provider: ProviderKind,
        handle: MarkerHandle,
        style: MarkerStyle,
    ) -> Result<(), MapError> {
        self.ensure_initialized(provider)?;
        let marker = self
            .markers
            .get_mut(&handle)
            .ok_or(MapError::UnknownMarker(handle))?;
        marker.style = style;
        Ok(())
    }

    /// Markers in placement order.
    pub fn markers(&self) -> Vec<&PlacedMarker> {
        self.markers.values().collect()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Topmost marker under `point`. Selected markers are drawn above the
    /// rest, so they win; otherwise the most recently placed marker does.
    pub fn marker_at(&self, point: ScreenPoint) -> Option<MarkerHandle> {
        let hit = |marker: &&PlacedMarker| {
            let center = self.viewport.project(marker.position);
            let half_w = MARKER_WIDTH * marker.style.scale() / 2.0;
            let half_h = MARKER_HEIGHT * marker.style.scale() / 2.0;
            (point.x - center.x).abs() <= half_w && (point.y - center.y).abs() <= half_h
        };
        self.markers
            .values()
            .rev()
            .filter(|m| m.style == MarkerStyle::Selected)
            .find(hit)
            .or_else(|| self.markers.values().rev().find(hit))
            .map(|m| m.handle)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pan_to(&mut self, center: LatLng) {
        self.viewport.center = center;
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.viewport.zoom = zoom.clamp(1, self.max_zoom);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.width = width.max(1.0);
        self.viewport.height = height.max(1.0);
    }

    pub fn teardown(&mut self) {
        debug!(released = self.markers.len(), "tearing down map provider");
        self.markers.clear();
        self.initialized = false;
    }

    /// World origin of a `width`x`height` image centred on the viewport.
    pub fn centered_origin(&self, width: u32, height: u32) -> (f64, f64) {
        let (cx, cy) = to_world(self.viewport.center, self.viewport.zoom);
        (cx - f64::from(width) / 2.0, cy - f64::from(height) / 2.0)
    }

    /// Viewport size clamped to what a static-image API will render.
    pub fn clamped_size(&self, max_side: u32) -> (u32, u32) {
        let clamp = |v: f32| (v.round() as u32).clamp(1, max_side);
        (clamp(self.viewport.width), clamp(self.viewport.height))
    }
}
