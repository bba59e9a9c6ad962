use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    Unavailable,
    Internal,
}

impl ErrorCode {
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 | 410 => ErrorCode::NotFound,
            409 | 412 => ErrorCode::Conflict,
            400 | 405 | 415 | 422 => ErrorCode::Validation,
            502..=504 => ErrorCode::Unavailable,
            _ => ErrorCode::Internal,
        }
    }
}

/// Error body some identity providers return from the registration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{name}: {message}")]
pub struct ProviderError {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ProviderError {
    pub fn from_response(body: &serde_json::Value) -> Option<Self> {
        let error = serde_json::from_value::<ProviderError>(body.clone()).ok()?;
        if error.message.is_empty() {
            return None;
        }
        Some(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_pod_statuses() {
        assert_eq!(ErrorCode::from_http_status(404), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from_http_status(403), ErrorCode::Forbidden);
        assert_eq!(ErrorCode::from_http_status(412), ErrorCode::Conflict);
        assert_eq!(ErrorCode::from_http_status(500), ErrorCode::Internal);
    }

    #[test]
    fn provider_error_requires_message() {
        let body = serde_json::json!({ "name": "BadRequestHttpError", "message": "Email taken", "statusCode": 400 });
        let error = ProviderError::from_response(&body).expect("provider error");
        assert_eq!(error.status_code, Some(400));
        assert_eq!(error.to_string(), "BadRequestHttpError: Email taken");

        assert!(ProviderError::from_response(&serde_json::json!({ "webId": "x" })).is_none());
    }
}
