//! Spherical Web-Mercator math shared by every raster provider.

use std::{f64::consts::PI, ops::RangeInclusive};

use shared::domain::LatLng;

pub const TILE_SIZE: f64 = 256.0;
/// Latitude where the Mercator square ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1u32 << zoom.min(30))
}

/// Absolute pixel coordinates of `pos` at `zoom`.
pub fn to_world(pos: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let x = (pos.lng + 180.0) / 360.0 * size;
    let lat = pos.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

pub fn from_world(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Tile indices overlapping the world pixel range `lo..hi` at `zoom`.
fn tile_span(lo: f64, hi: f64, zoom: u8) -> Option<RangeInclusive<u32>> {
    let last = f64::from((1u32 << zoom.min(30)) - 1);
    let first = (lo / TILE_SIZE).floor().max(0.0);
    let end = ((hi / TILE_SIZE).ceil() - 1.0).min(last);
    (first <= end).then(|| first as u32..=end as u32)
}

/// The visible map window: a centre, an integer zoom and a size in screen
/// pixels. Screen coordinates are relative to the window's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: u8, width: f32, height: f32) -> Self {
        Self {
            center,
            zoom,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    fn center_world(&self) -> (f64, f64) {
        to_world(self.center, self.zoom)
    }

    pub fn world_to_screen(&self, x: f64, y: f64) -> ScreenPoint {
        let (cx, cy) = self.center_world();
        ScreenPoint::new(
            (x - cx + f64::from(self.width) / 2.0) as f32,
            (y - cy + f64::from(self.height) / 2.0) as f32,
        )
    }

    pub fn project(&self, pos: LatLng) -> ScreenPoint {
        let (x, y) = to_world(pos, self.zoom);
        self.world_to_screen(x, y)
    }

    pub fn unproject(&self, point: ScreenPoint) -> LatLng {
        let (cx, cy) = self.center_world();
        from_world(
            cx + f64::from(point.x) - f64::from(self.width) / 2.0,
            cy + f64::from(point.y) - f64::from(self.height) / 2.0,
            self.zoom,
        )
    }

    /// Centre after dragging the map content by (`dx`, `dy`) screen pixels.
    pub fn dragged_center(&self, dx: f32, dy: f32) -> LatLng {
        self.unproject(ScreenPoint::new(
            self.width / 2.0 - dx,
            self.height / 2.0 - dy,
        ))
    }

    /// Column/row of every tile overlapping the window, row by row. Tiles
    /// past the edge of the world are left out.
    pub fn covering_tiles(&self) -> Vec<(u32, u32)> {
        let (cx, cy) = self.center_world();
        let half_w = f64::from(self.width) / 2.0;
        let half_h = f64::from(self.height) / 2.0;
        let (Some(cols), Some(rows)) = (
            tile_span(cx - half_w, cx + half_w, self.zoom),
            tile_span(cy - half_h, cy + half_h, self.zoom),
        ) else {
            return Vec::new();
        };
        rows.flat_map(|row| cols.clone().map(move |col| (col, row)))
            .collect()
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}
