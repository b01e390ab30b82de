use serde::{Deserialize, Serialize};

/// Failure classes a front-end can degrade to. None of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MissingCredential,
    InvalidCredential,
    ProviderInit,
    Geocoding,
    NotFound,
    Validation,
}

impl ErrorCode {
    /// Credential and provider failures are answered with the credential
    /// prompt rather than a plain status message.
    pub fn prompts_for_credential(self) -> bool {
        matches!(
            self,
            ErrorCode::MissingCredential | ErrorCode::InvalidCredential | ErrorCode::ProviderInit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedError {
    pub code: ErrorCode,
    pub message: String,
}

impl ReportedError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_credential_and_provider_failures_prompt() {
        let prompting = [
            ErrorCode::MissingCredential,
            ErrorCode::InvalidCredential,
            ErrorCode::ProviderInit,
        ];
        let plain = [ErrorCode::Geocoding, ErrorCode::NotFound, ErrorCode::Validation];
        assert!(prompting.iter().all(|code| code.prompts_for_credential()));
        assert!(plain.iter().all(|code| !code.prompts_for_credential()));
    }

    #[test]
    fn reported_errors_use_snake_case_codes() {
        let err = ReportedError::new(ErrorCode::MissingCredential, "Mapbox requires an access token");
        assert_eq!(
            serde_json::to_value(&err).expect("serialize"),
            serde_json::json!({
                "code": "missing_credential",
                "message": "Mapbox requires an access token",
            })
        );
    }
}
