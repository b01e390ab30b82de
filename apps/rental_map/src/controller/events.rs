//! UI/backend events and error modeling for the map GUI.

use listings::ListingQuery;
use map_core::{BackgroundImage, GeocodeError, MapError};
use shared::{
    domain::{Property, PropertyId},
    error::{ErrorCode, ReportedError},
    protocol::GeoCandidate,
};

/// RGBA pixels decoded off the UI thread, ready for texture upload.
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub enum UiEvent {
    Info(String),
    Error(UiError),
    PropertiesLoaded {
        query: ListingQuery,
        properties: Vec<Property>,
    },
    KindsLoaded(Vec<String>),
    GeocodeCompleted {
        seq: u64,
        result: Result<Vec<GeoCandidate>, GeocodeError>,
    },
    BackgroundLoaded {
        generation: u64,
        image: BackgroundImage,
        pixels: DecodedImage,
    },
    BackgroundFailed {
        generation: u64,
        image: BackgroundImage,
        failure: ImageryFailure,
    },
    PhotoLoaded {
        id: PropertyId,
        pixels: DecodedImage,
    },
    PhotoFailed {
        id: PropertyId,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageryFailure {
    /// The imagery endpoint refused the configured credential.
    CredentialRejected { status: u16 },
    Unavailable(String),
}

impl ImageryFailure {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ImageryFailure::CredentialRejected { status },
            other => ImageryFailure::Unavailable(format!("imagery request failed with HTTP {other}")),
        }
    }

    pub fn reason(&self) -> String {
        match self {
            ImageryFailure::CredentialRejected { status } => {
                format!("image request refused with HTTP {status}")
            }
            ImageryFailure::Unavailable(reason) => reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Credential,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Catalog,
    Geocode,
    Imagery,
    Map,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
            || lower.contains("access token")
            || lower.contains("api key")
            || lower.contains("credential")
        {
            UiErrorCategory::Credential
        } else if lower.contains("invalid")
            || lower.contains("missing")
            || lower.contains("malformed")
            || lower.contains("duplicate")
            || lower.contains("out of range")
        {
            UiErrorCategory::Validation
        } else if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection")
            || lower.contains("network")
            || lower.contains("unavailable")
            || lower.contains("disconnected")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_reported(context: UiErrorContext, reported: &ReportedError) -> Self {
        let category = match reported.code {
            code if code.prompts_for_credential() => UiErrorCategory::Credential,
            ErrorCode::Validation | ErrorCode::NotFound => UiErrorCategory::Validation,
            ErrorCode::Geocoding => UiErrorCategory::Transport,
            _ => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context,
            message: reported.message.clone(),
        }
    }

    pub fn from_map_error(err: &MapError) -> Self {
        Self::from_reported(UiErrorContext::Map, &ReportedError::from(err))
    }

    pub fn requires_credential(&self) -> bool {
        self.category == UiErrorCategory::Credential
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_core::ProviderKind;
    use shared::domain::PropertyId;

    #[test]
    fn classifies_rejected_tokens_as_credential_errors() {
        let err = UiError::from_message(
            UiErrorContext::Imagery,
            "Mapbox rejected the access token (HTTP 401)",
        );
        assert_eq!(err.category(), UiErrorCategory::Credential);
        assert!(err.requires_credential());
        assert_eq!(err.context(), UiErrorContext::Imagery);
    }

    #[test]
    fn imagery_failures_describe_themselves() {
        assert_eq!(
            ImageryFailure::from_status(403).reason(),
            "image request refused with HTTP 403"
        );
        assert_eq!(
            ImageryFailure::from_status(502).reason(),
            "imagery request failed with HTTP 502"
        );
    }

    #[test]
    fn classifies_backend_disconnect_as_transport_error() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "Backend command processor disconnected",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(!err.requires_credential());
    }

    #[test]
    fn classifies_catalog_problems_as_validation() {
        let err = UiError::from_message(
            UiErrorContext::Catalog,
            "duplicate property id 3 in catalog",
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert_eq!(
            UiError::from_message(UiErrorContext::General, "something odd").category(),
            UiErrorCategory::Unknown
        );
    }

    #[test]
    fn map_errors_follow_their_error_code() {
        let missing = UiError::from_map_error(&MapError::MissingCredential {
            provider: ProviderKind::Google,
        });
        assert!(missing.requires_credential());
        assert_eq!(missing.context(), UiErrorContext::Map);

        let unknown = UiError::from_map_error(&MapError::UnknownProperty(PropertyId(9)));
        assert_eq!(unknown.category(), UiErrorCategory::Validation);
    }

    #[test]
    fn only_auth_statuses_reject_the_credential() {
        assert_eq!(
            ImageryFailure::from_status(401),
            ImageryFailure::CredentialRejected { status: 401 }
        );
        assert_eq!(
            ImageryFailure::from_status(403),
            ImageryFailure::CredentialRejected { status: 403 }
        );
        assert!(matches!(
            ImageryFailure::from_status(503),
            ImageryFailure::Unavailable(_)
        ));
    }
}
