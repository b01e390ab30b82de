use url::Url;

use crate::{
    error::MapError,
    projection::{Viewport, TILE_SIZE},
    provider::{BackgroundImage, Credential, MapProvider, ProviderKind},
    providers::layer::ProviderCore,
};

pub const OSM_TILE_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const MAX_ZOOM: u8 = 19;

/// Open raster tiles in the Leaflet style; needs no credential.
pub struct LeafletProvider {
    core: ProviderCore,
    tile_template: String,
}

impl LeafletProvider {
    pub fn new(tile_template: impl Into<String>) -> Self {
        Self {
            core: ProviderCore::new(MAX_ZOOM),
            tile_template: tile_template.into(),
        }
    }

    fn tile_url(&self, zoom: u8, col: u32, row: u32) -> Result<Url, url::ParseError> {
        Url::parse(
            &self
                .tile_template
                .replace("{z}", &zoom.to_string())
                .replace("{x}", &col.to_string())
                .replace("{y}", &row.to_string()),
        )
    }
}

impl Default for LeafletProvider {
    fn default() -> Self {
        Self::new(OSM_TILE_TEMPLATE)
    }
}

impl MapProvider for LeafletProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Leaflet
    }

    fn core(&self) -> &ProviderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProviderCore {
        &mut self.core
    }

    fn initialize(
        &mut self,
        _credential: Option<&Credential>,
        viewport: Viewport,
    ) -> Result<(), MapError> {
        let placeholders = ["{z}", "{x}", "{y}"];
        if !placeholders.iter().all(|p| self.tile_template.contains(p)) {
            return Err(MapError::InitFailed {
                provider: self.kind(),
                reason: format!(
                    "tile template '{}' must contain {{z}}, {{x}} and {{y}}",
                    self.tile_template
                ),
            });
        }
        self.tile_url(0, 0, 0).map_err(|err| MapError::InitFailed {
            provider: ProviderKind::Leaflet,
            reason: format!("invalid tile template: {err}"),
        })?;
        self.core.start(viewport);
        Ok(())
    }

    fn background(&self) -> Vec<BackgroundImage> {
        if !self.core.is_initialized() {
            return Vec::new();
        }
        let viewport = self.core.viewport();
        viewport
            .covering_tiles()
            .into_iter()
            .filter_map(|(col, row)| {
                let url = self.tile_url(viewport.zoom, col, row).ok()?;
                Some(BackgroundImage {
                    url,
                    world_origin: (f64::from(col) * TILE_SIZE, f64::from(row) * TILE_SIZE),
                    width: TILE_SIZE as u32,
                    height: TILE_SIZE as u32,
                    zoom: viewport.zoom,
                })
            })
            .collect()
    }

    fn attribution(&self) -> &'static str {
        "© OpenStreetMap contributors"
    }
}
