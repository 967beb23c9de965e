//! Turning classified responses into envelopes or errors.
//!
//! Business outcomes always become envelopes.
//! Authorization failures and malformed payloads always become errors.
//! Unexpected status codes are subject to [ErrorPolicy::suppress_server_errors].

use std::fmt::Debug;
use std::sync::Arc;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::envelope::ResourceEnvelope;
use crate::error::{CatalogError, ProtocolViolation};
use crate::outcome::{classify, Operation, Outcome};

/// How the client reacts to responses outside of an operation's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPolicy {
    /// Report unexpected status codes as an empty envelope (and a warning)
    /// instead of a [CatalogError::ProtocolViolation].
    pub suppress_server_errors: bool,
    /// Sent to the catalog as `quietOnNotFound` on single resource lookups.
    pub quiet_if_absent: bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            suppress_server_errors: true,
            quiet_if_absent: true,
        }
    }
}

/// Receiver of errors that were suppressed by the [ErrorPolicy].
pub trait WarningSink: Debug + Send + Sync {
    fn suppressed(&self, operation: Operation, error: &CatalogError);
}

/// Forwards suppressed errors to `tracing` at `WARN` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn suppressed(&self, operation: Operation, error: &CatalogError) {
        warn!(%operation, %error, cause = ?std::error::Error::source(error), "suppressed catalog error");
    }
}

/// Applies an [ErrorPolicy] to responses.
#[derive(Debug, Clone)]
pub struct PolicyGate {
    policy: ErrorPolicy,
    sink: Arc<dyn WarningSink>,
}

impl PolicyGate {
    pub fn new(policy: ErrorPolicy, sink: Arc<dyn WarningSink>) -> Self {
        Self { policy, sink }
    }

    pub fn policy(&self) -> &ErrorPolicy {
        &self.policy
    }

    /// Classify `status` and settle the result of `operation` on `path`.
    ///
    /// `on_success` decodes the payload of a successful response,
    /// errors it returns are passed on unchanged.
    /// `rejected` is the payload reported for business outcomes other than
    /// success.
    pub fn resolve<T>(
        &self,
        operation: Operation,
        path: &str,
        status: StatusCode,
        on_success: impl FnOnce() -> Result<T, CatalogError>,
        rejected: Option<T>,
    ) -> Result<ResourceEnvelope<T>, CatalogError> {
        let outcome = classify(operation, status);
        match outcome {
            Outcome::Success => {
                let payload = on_success()?;
                info!(%operation, path, %status, "catalog request succeeded");
                Ok(ResourceEnvelope::new(status, Some(payload)))
            },
            Outcome::Absent
            | Outcome::Conflict
            | Outcome::Forbidden
            | Outcome::MethodNotAllowed
            | Outcome::ServerRejected => {
                info!(%operation, path, %status, ?outcome, "catalog request rejected");
                Ok(ResourceEnvelope::new(status, rejected))
            },
            Outcome::Unauthorized => {
                let err = CatalogError::AuthFailure {
                    path: path.to_string(),
                };
                error!(%operation, %err, "catalog request unauthorized");
                Err(err)
            },
            Outcome::Unexpected(status) => {
                let err = CatalogError::ProtocolViolation {
                    status,
                    path: path.to_string(),
                    cause: ProtocolViolation::UnexpectedStatus {
                        expected: operation.expected_status_codes(),
                    },
                };
                self.suppress(operation, err)
            },
        }
    }

    fn suppress<T>(
        &self,
        operation: Operation,
        err: CatalogError,
    ) -> Result<ResourceEnvelope<T>, CatalogError> {
        match err.status() {
            Some(status) if self.policy.suppress_server_errors => {
                self.sink.suppressed(operation, &err);
                Ok(ResourceEnvelope::empty(status))
            },
            _ => {
                error!(%operation, %err, "catalog request failed");
                Err(err)
            },
        }
    }
}

impl Default for PolicyGate {
    fn default() -> Self {
        Self::new(ErrorPolicy::default(), Arc::new(TracingWarningSink))
    }
}
