//! Error taxonomy surfaced by model operations.

use thiserror::Error;

use crate::client::TransportError;

/// Server error code signalling that a conditional write carried a stale ref.
pub const VERSION_MISMATCH_CODE: &str = "item_version_mismatch";

/// Error type for model, collection and parsing operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The ref supplied on a conditional write no longer matches the server.
    #[error("version conflict: {message}")]
    VersionConflict { message: String },

    /// Any other error code reported by the server, message kept verbatim.
    #[error("server error ({code}): {message}")]
    Server { code: String, message: String },

    /// The validation hook rejected the document. No write was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transport call itself failed.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// A response body or document did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A location header that does not carry a key segment.
    #[error("invalid location header: {0}")]
    InvalidLocation(String),

    /// The operation needs a key and none is available.
    #[error("missing key")]
    MissingKey,

    /// A record that was just written could not be read back.
    #[error("not found: {collection}/{key}")]
    NotFound { collection: String, key: String },
}

impl ModelError {
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, ModelError::VersionConflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound { .. })
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Decode(err.to_string())
    }
}

/// Rejection produced by a validation hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {message}")]
pub struct ValidationError {
    pub message: String,
    /// Per-field details, in the order the validator reported them.
    pub details: Vec<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}
