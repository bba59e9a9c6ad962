use shared::error::ErrorCode;
use thiserror::Error;

use crate::barcode::BarcodeError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} {url} returned status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid dataset: {0}")]
    Dataset(String),
    #[error("{0}")]
    Validation(String),
    #[error("current user pod cannot change permissions to itself")]
    SelfTarget,
    #[error("{what} not found at {url}")]
    Missing { what: &'static str, url: String },
    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },
    #[error(transparent)]
    Barcode(#[from] BarcodeError),
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Status { status, .. } => ErrorCode::from_http_status(*status),
            ClientError::Http(err) => err
                .status()
                .map(|status| ErrorCode::from_http_status(status.as_u16()))
                .unwrap_or(ErrorCode::Unavailable),
            ClientError::Missing { .. } => ErrorCode::NotFound,
            ClientError::Validation(_) | ClientError::SelfTarget | ClientError::Url(_) => {
                ErrorCode::Validation
            }
            ClientError::Barcode(_) => ErrorCode::Validation,
            ClientError::Json(_) | ClientError::Dataset(_) | ClientError::ChecksumMismatch { .. } => {
                ErrorCode::Internal
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::NotFound
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
