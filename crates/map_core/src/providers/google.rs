use url::Url;

use crate::{
    error::MapError,
    projection::Viewport,
    provider::{BackgroundImage, Credential, MapProvider, ProviderKind},
    providers::layer::ProviderCore,
};

const STATIC_API_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";
const MAX_ZOOM: u8 = 21;
const MAX_IMAGE_SIDE: u32 = 640;

pub struct GoogleMapsProvider {
    core: ProviderCore,
    key: Option<Credential>,
}

impl GoogleMapsProvider {
    pub fn new() -> Self {
        Self {
            core: ProviderCore::new(MAX_ZOOM),
            key: None,
        }
    }

    fn static_image(&self) -> Option<BackgroundImage> {
        let key = self.key.as_ref()?;
        if !self.core.is_initialized() {
            return None;
        }
        let viewport = self.core.viewport();
        let (width, height) = self.core.clamped_size(MAX_IMAGE_SIDE);
        let url = Url::parse_with_params(
            STATIC_API_URL,
            &[
                (
                    "center",
                    format!("{:.6},{:.6}", viewport.center.lat, viewport.center.lng),
                ),
                ("zoom", viewport.zoom.to_string()),
                ("size", format!("{width}x{height}")),
                ("key", key.expose().to_string()),
            ],
        )
        .ok()?;
        Some(BackgroundImage {
            url,
            world_origin: self.core.centered_origin(width, height),
            width,
            height,
            zoom: viewport.zoom,
        })
    }
}

impl Default for GoogleMapsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MapProvider for GoogleMapsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
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
        let key = credential.ok_or(MapError::MissingCredential {
            provider: self.kind(),
        })?;
        if key.expose().chars().any(char::is_whitespace) {
            return Err(MapError::InvalidCredential {
                provider: self.kind(),
                reason: "API keys cannot contain whitespace".to_string(),
            });
        }
        self.key = Some(key.clone());
        self.core.start(viewport);
        Ok(())
    }

    fn background(&self) -> Vec<BackgroundImage> {
        self.static_image().into_iter().collect()
    }

    fn attribution(&self) -> &'static str {
        "Map data © Google"
    }

    fn teardown(&mut self) {
        self.key = None;
        self.core.teardown();
    }
}
