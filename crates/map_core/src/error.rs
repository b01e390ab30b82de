use shared::{
    domain::PropertyId,
    error::{ErrorCode, ReportedError},
};
use thiserror::Error;

use crate::provider::{MarkerHandle, ProviderKind};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MapError {
    #[error("{provider} requires an access token")]
    MissingCredential { provider: ProviderKind },
    #[error("{provider} rejected the access token: {reason}")]
    InvalidCredential {
        provider: ProviderKind,
        reason: String,
    },
    #[error("{provider} failed to initialize: {reason}")]
    InitFailed {
        provider: ProviderKind,
        reason: String,
    },
    #[error("{provider} used before initialization")]
    NotInitialized { provider: ProviderKind },
    #[error("no marker with handle {0:?}")]
    UnknownMarker(MarkerHandle),
    #[error("no marker rendered for property {0}")]
    UnknownProperty(PropertyId),
    #[error("property {0} appears more than once")]
    DuplicateProperty(PropertyId),
}

impl MapError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MapError::MissingCredential { .. } => ErrorCode::MissingCredential,
            MapError::InvalidCredential { .. } => ErrorCode::InvalidCredential,
            MapError::InitFailed { .. } | MapError::NotInitialized { .. } => {
                ErrorCode::ProviderInit
            }
            MapError::UnknownMarker(_) | MapError::UnknownProperty(_) => ErrorCode::NotFound,
            MapError::DuplicateProperty(_) => ErrorCode::Validation,
        }
    }
}

impl From<&MapError> for ReportedError {
    fn from(value: &MapError) -> Self {
        ReportedError::new(value.code(), value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("invalid geocoder endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("geocoder responded with HTTP {0}")]
    Status(u16),
    #[error("malformed geocoder response: {0}")]
    Malformed(String),
}

impl From<&GeocodeError> for ReportedError {
    fn from(value: &GeocodeError) -> Self {
        ReportedError::new(ErrorCode::Geocoding, value.to_string())
    }
}
