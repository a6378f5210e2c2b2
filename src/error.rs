//! Error and result types shared across the crate.
//!
//! `ApiError` covers every failed request against the remote API, `ValidationError`
//! is raised by the form layer before anything is sent. `ErrorKind` folds both into
//! the three categories the screen reports on.
use thiserror::Error;

use crate::model::RecordId;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure talking to the API (or reading a file to upload).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("record {0} not found")]
    NotFound(RecordId),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("cannot read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Classify a non-2xx status, mapping 404 on a known id to `NotFound`.
    pub fn from_status(status: u16, body: String, id: Option<&RecordId>) -> Self {
        match (status, id) {
            (404, Some(id)) => Self::NotFound(id.clone()),
            _ => Self::Status { status, body },
        }
    }
}

/// A draft rejected before submission.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} must be a date (YYYY-MM-DD), got '{value}'")]
    InvalidDate { field: &'static str, value: String },
}

/// Coarse error categories surfaced to the user.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkOrServer,
    Validation,
    NotFoundOnEdit,
}

impl From<&ValidationError> for ErrorKind {
    fn from(_: &ValidationError) -> Self {
        ErrorKind::Validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_404_with_id_becomes_not_found() {
        let id = RecordId::from("u1");
        let err = ApiError::from_status(404, String::new(), Some(&id));
        assert!(matches!(err, ApiError::NotFound(ref got) if got == &id));
    }

    #[test]
    fn other_statuses_stay_server_errors() {
        let err = ApiError::from_status(500, "boom".into(), None);
        assert_eq!(err.to_string(), "server answered 500: boom");
        assert!(!matches!(err, ApiError::NotFound(_)));
    }
}
