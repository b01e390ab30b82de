use shared::{
    domain::Property,
    error::{ErrorCode, ReportedError},
};
use tracing::{info, warn};

use crate::{
    config::MapSettings,
    error::MapError,
    projection::Viewport,
    provider::{Credential, MapProvider, ProviderKind},
    providers::build_provider,
    selection::MarkerSelectionController,
};

pub type ProviderFactory = Box<dyn Fn(&MapSettings) -> Box<dyn MapProvider> + Send>;

const DEFAULT_VIEW_SIZE: (f32, f32) = (800.0, 600.0);

/// Shown instead of the map while the provider cannot start.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialPrompt {
    provider: ProviderKind,
    error: ReportedError,
}

impl CredentialPrompt {
    fn from_error(provider: ProviderKind, err: &MapError) -> Self {
        Self {
            provider,
            error: ReportedError::from(err),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn code(&self) -> ErrorCode {
        self.error.code
    }

    pub fn reason(&self) -> &str {
        &self.error.message
    }
}

pub enum MapSurface {
    Live(MarkerSelectionController),
    CredentialPrompt(CredentialPrompt),
}

/// Owns the map for the lifetime of a view: a live controller when the
/// configured provider starts, otherwise a re-enterable credential prompt.
pub struct MapSession {
    settings: MapSettings,
    factory: ProviderFactory,
    properties: Vec<Property>,
    resume_viewport: Option<Viewport>,
    surface: MapSurface,
}

impl MapSession {
    pub fn open(settings: MapSettings, properties: Vec<Property>) -> Self {
        Self::with_factory(settings, properties, Box::new(build_provider))
    }

    pub fn with_factory(
        settings: MapSettings,
        properties: Vec<Property>,
        factory: ProviderFactory,
    ) -> Self {
        let surface = start_surface(&settings, &factory, &properties, None);
        Self {
            settings,
            factory,
            properties,
            resume_viewport: None,
            surface,
        }
    }

    /// Retries the provider with a token typed into the prompt. Returns true
    /// when the map is live afterwards.
    pub fn submit_credential(&mut self, input: &str) -> bool {
        if self.is_live() {
            return true;
        }
        self.settings.credential = Credential::from_input(input);
        self.surface = start_surface(
            &self.settings,
            &self.factory,
            &self.properties,
            self.resume_viewport,
        );
        self.is_live()
    }

    /// A live provider failed later on (for example its imagery endpoint
    /// refused the token). Degrades to the prompt; nothing else is lost.
    pub fn report_provider_failure(&mut self, err: MapError) {
        let provider = self.settings.provider;
        warn!(%provider, "map provider failure: {err}");
        if let MapSurface::Live(controller) = &self.surface {
            self.resume_viewport = Some(controller.viewport());
        }
        self.surface = MapSurface::CredentialPrompt(CredentialPrompt::from_error(provider, &err));
    }

    pub fn refresh_properties(&mut self, properties: Vec<Property>) -> Result<(), MapError> {
        self.properties = properties;
        match &mut self.surface {
            MapSurface::Live(controller) => controller.render_markers(self.properties.clone()),
            MapSurface::CredentialPrompt(_) => Ok(()),
        }
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    pub fn is_live(&self) -> bool {
        matches!(self.surface, MapSurface::Live(_))
    }

    pub fn controller(&self) -> Option<&MarkerSelectionController> {
        match &self.surface {
            MapSurface::Live(controller) => Some(controller),
            MapSurface::CredentialPrompt(_) => None,
        }
    }

    pub fn controller_mut(&mut self) -> Option<&mut MarkerSelectionController> {
        match &mut self.surface {
            MapSurface::Live(controller) => Some(controller),
            MapSurface::CredentialPrompt(_) => None,
        }
    }

    pub fn prompt(&self) -> Option<&CredentialPrompt> {
        match &self.surface {
            MapSurface::Live(_) => None,
            MapSurface::CredentialPrompt(prompt) => Some(prompt),
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }
}

fn start_surface(
    settings: &MapSettings,
    factory: &ProviderFactory,
    properties: &[Property],
    resume: Option<Viewport>,
) -> MapSurface {
    let mut provider = factory(settings);
    let kind = provider.kind();
    let viewport = resume.unwrap_or_else(|| {
        Viewport::new(
            settings.initial_center,
            settings.initial_zoom,
            DEFAULT_VIEW_SIZE.0,
            DEFAULT_VIEW_SIZE.1,
        )
    });

    if let Err(err) = provider.initialize(settings.active_credential(), viewport) {
        warn!(provider = %kind, "map provider failed to initialize: {err}");
        return MapSurface::CredentialPrompt(CredentialPrompt::from_error(kind, &err));
    }
    info!(provider = %kind, zoom = viewport.zoom, "map provider initialized");

    let mut controller = MarkerSelectionController::new(provider);
    if let Err(err) = controller.render_markers(properties.to_vec()) {
        warn!(provider = %kind, "failed to render property markers: {err}");
    }
    MapSurface::Live(controller)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
