use std::borrow::Cow;
use std::sync::Arc;

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::config::GeoServerConfig;
use crate::envelope::ResourceEnvelope;
use crate::error::{CatalogError, ProtocolViolation};
use crate::outcome::Operation;
use crate::policy::{ErrorPolicy, PolicyGate, TracingWarningSink, WarningSink};
use crate::transport::{HttpTransport, Transport, TransportRequest, TransportResponse};

/// Query flag asking the catalog not to log absent resources.
pub(crate) const QUIET_ON_NOT_FOUND: &str = "quietOnNotFound";
pub(crate) const RECURSE: &str = "recurse";
pub(crate) const DEFAULT: &str = "default";

/// Client for the workspace and data store endpoints of a GeoServer catalog.
///
/// Operations are provided by [crate::WorkspaceApi] and
/// [crate::DataStoreApi].
/// The client keeps no state between calls and can be shared between tasks.
#[derive(Debug, Clone)]
pub struct GeoServerClient<T = HttpTransport> {
    transport: T,
    gate: PolicyGate,
}

impl GeoServerClient<HttpTransport> {
    /// Validate `config` and create a client talking HTTP.
    pub fn new(config: &GeoServerConfig) -> Result<Self, CatalogError> {
        let transport = HttpTransport::new(config)?;
        debug!(base_url = %transport.base_url(), "created catalog client");
        Ok(Self::with_transport(transport, config.policy()))
    }
}

impl<T: Transport> GeoServerClient<T> {
    pub fn with_transport(transport: T, policy: ErrorPolicy) -> Self {
        Self {
            transport,
            gate: PolicyGate::new(policy, Arc::new(TracingWarningSink)),
        }
    }

    /// Report suppressed errors to `sink` instead of the log.
    pub fn with_warning_sink(self, sink: Arc<dyn WarningSink>) -> Self {
        let policy = *self.gate.policy();
        Self {
            transport: self.transport,
            gate: PolicyGate::new(policy, sink),
        }
    }

    pub fn policy(&self) -> &ErrorPolicy {
        self.gate.policy()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(
        &self,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, CatalogError> {
        debug!(method = %request.method, path = %request.path, "sending catalog request");
        Ok(self.transport.send(request, cancel).await?)
    }

    /// GET `path` and decode the payload on success.
    pub(crate) async fn fetch<D, U>(
        &self,
        operation: Operation,
        path: String,
        cancel: &CancellationToken,
        extract: impl FnOnce(D) -> U,
    ) -> Result<ResourceEnvelope<U>, CatalogError>
    where
        D: DeserializeOwned,
    {
        let mut request = TransportRequest::new(Method::GET, path.as_str());
        if matches!(operation, Operation::Get(_)) {
            request = request.query(QUIET_ON_NOT_FOUND, self.policy().quiet_if_absent);
        }

        let response = self.send(request, cancel).await?;
        self.gate.resolve(
            operation,
            &path,
            response.status,
            || decode::<D>(&path, &response.body).map(extract),
            None,
        )
    }

    /// POST `body` to `path` and return the location of the new resource.
    pub(crate) async fn create(
        &self,
        operation: Operation,
        request: TransportRequest,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Url>, CatalogError> {
        let path = request.path.clone();
        let response = self.send(request, cancel).await?;
        self.gate.resolve(
            operation,
            &path,
            response.status,
            || created_location(&path, name, &response),
            None,
        )
    }

    /// Send an update or delete, reporting whether it took effect.
    pub(crate) async fn modify(
        &self,
        operation: Operation,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError> {
        let path = request.path.clone();
        let response = self.send(request, cancel).await?;
        self.gate
            .resolve(operation, &path, response.status, || Ok(true), Some(false))
    }
}

/// Percent-encode a resource name for use as a single path segment.
///
/// Empty names and dot segments are rejected, URL resolution would turn
/// them into a reference to the parent resource.
pub(crate) fn segment(name: &str) -> Result<Cow<'_, str>, CatalogError> {
    if matches!(name, "" | "." | "..") {
        return Err(CatalogError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(url_escape::encode_component(name))
}

pub(crate) fn encode_body(body: &impl Serialize) -> Result<Vec<u8>, CatalogError> {
    serde_json::to_vec(body).map_err(CatalogError::Encode)
}

fn decode<D: DeserializeOwned>(path: &str, body: &[u8]) -> Result<D, CatalogError> {
    serde_json::from_slice(body).map_err(|source| CatalogError::MalformedPayload {
        path: path.to_string(),
        source,
    })
}

/// Check that a `201 Created` echoes `expected_name` and points to the new
/// resource.
///
/// The echo is compared byte for byte. A relative `Location` resolves
/// against the URL the response came from.
fn created_location(
    path: &str,
    expected_name: &str,
    response: &TransportResponse,
) -> Result<Url, CatalogError> {
    let violation = |cause| CatalogError::ProtocolViolation {
        status: StatusCode::CREATED,
        path: path.to_string(),
        cause,
    };

    let actual = String::from_utf8_lossy(&response.body);
    if !actual.is_empty() && actual != expected_name {
        return Err(violation(ProtocolViolation::NameMismatch {
            expected: expected_name.to_string(),
            actual: actual.to_string(),
        }));
    }

    let location = match response.location() {
        None => return Err(violation(ProtocolViolation::MissingLocation)),
        Some(Err(_)) => {
            let raw = response
                .headers
                .get(http::header::LOCATION)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .unwrap_or_default();
            return Err(violation(ProtocolViolation::InvalidLocation(raw)));
        },
        Some(Ok(location)) => location,
    };

    match &response.url {
        Some(base) => base.join(location),
        None => Url::parse(location),
    }
    .map_err(|_| violation(ProtocolViolation::InvalidLocation(location.to_string())))
}
