use url::Url;

use crate::{
    error::MapError,
    projection::Viewport,
    provider::{BackgroundImage, Credential, MapProvider, ProviderKind},
    providers::layer::ProviderCore,
};

pub const DEFAULT_MAPBOX_STYLE: &str = "mapbox/streets-v12";
const STATIC_API_BASE: &str = "https://api.mapbox.com/styles/v1";
const MAX_ZOOM: u8 = 22;
const MAX_IMAGE_SIDE: u32 = 1280;

/// Hosted Mapbox imagery through the Static Images API.
pub struct MapboxProvider {
    core: ProviderCore,
    style: String,
    token: Option<Credential>,
}

impl MapboxProvider {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            core: ProviderCore::new(MAX_ZOOM),
            style: style.into(),
            token: None,
        }
    }

    fn static_image(&self) -> Option<BackgroundImage> {
        let token = self.token.as_ref()?;
        if !self.core.is_initialized() {
            return None;
        }
        let viewport = self.core.viewport();
        let (width, height) = self.core.clamped_size(MAX_IMAGE_SIDE);
        let mut url = Url::parse(&format!(
            "{STATIC_API_BASE}/{}/static/{:.6},{:.6},{}/{width}x{height}",
            self.style, viewport.center.lng, viewport.center.lat, viewport.zoom
        ))
        .ok()?;
        url.query_pairs_mut()
            .append_pair("access_token", token.expose());
        Some(BackgroundImage {
            url,
            world_origin: self.core.centered_origin(width, height),
            width,
            height,
            zoom: viewport.zoom,
        })
    }
}

impl MapProvider for MapboxProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mapbox
    }

    fn core(&self) -> &ProviderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProviderCore {
        &mut self.core
    }

    fn initialize(
        &mut self,
        credential: Option<&Credential>,
        viewport: Viewport,
    ) -> Result<(), MapError> {
        let token = credential.ok_or(MapError::MissingCredential {
            provider: self.kind(),
        })?;
        if !token.expose().starts_with("pk.") {
            return Err(MapError::InvalidCredential {
                provider: self.kind(),
                reason: "expected a public access token starting with 'pk.'".to_string(),
            });
        }
        self.token = Some(token.clone());
        self.core.start(viewport);
        Ok(())
    }

    fn background(&self) -> Vec<BackgroundImage> {
        self.static_image().into_iter().collect()
    }

    fn attribution(&self) -> &'static str {
        "© Mapbox © OpenStreetMap"
    }

    fn teardown(&mut self) {
        self.token = None;
        self.core.teardown();
    }
}
