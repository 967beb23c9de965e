//! Error handling for catalog operations.
//!
//! Only conditions a caller cannot route around are errors.
//! "Not found", conflicts and the like are regular [crate::Outcome]s and are
//! reported through the [crate::ResourceEnvelope] instead.

use http::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Common error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog rejected the configured credentials (401).
    ///
    /// Never suppressed, regardless of [crate::ErrorPolicy].
    #[error("not authorized to access '{path}'")]
    AuthFailure { path: String },

    /// A response body did not have the expected shape.
    ///
    /// Signals an incompatible catalog rather than a business state,
    /// hence never suppressed.
    #[error("malformed response payload from '{path}'")]
    MalformedPayload {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The catalog answered outside of the protocol.
    #[error("protocol violation (status {status}) for '{path}'")]
    ProtocolViolation {
        status: StatusCode,
        path: String,
        #[source]
        cause: ProtocolViolation,
    },

    /// The name can't be used as a path segment.
    #[error("'{name}' is not a valid resource name")]
    InvalidName { name: String },

    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(TransportError),

    /// The cancellation token fired before the exchange completed.
    #[error("request was cancelled")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CatalogError {
    /// Status code of the response that caused this error, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogError::AuthFailure { .. } => Some(StatusCode::UNAUTHORIZED),
            CatalogError::ProtocolViolation { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for CatalogError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => CatalogError::Cancelled,
            other => CatalogError::Transport(other),
        }
    }
}

/// The ways in which a response can violate the catalog protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("status code not in {}", fmt_status_codes(.expected))]
    UnexpectedStatus { expected: Vec<StatusCode> },

    /// The body of a `201 Created` did not echo the submitted name.
    #[error("expected created resource '{expected}', catalog reported '{actual}'")]
    NameMismatch { expected: String, actual: String },

    #[error("created resource has no location")]
    MissingLocation,

    #[error("created resource has an invalid location: {0}")]
    InvalidLocation(String),
}

fn fmt_status_codes(codes: &[StatusCode]) -> String {
    let codes = codes
        .iter()
        .map(|code| code.as_u16().to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{codes}}}")
}
