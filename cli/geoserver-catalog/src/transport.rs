//! HTTP exchange with the catalog.
//!
//! [Transport] is the seam between the catalog operations and the network.
//! [HttpTransport] talks to a catalog over `reqwest`,
//! tests substitute `MockTransport`.

use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, StatusCode};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{normalize_authorization, ConfigError, GeoServerConfig};

/// A request relative to the catalog's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    /// Path relative to the base URL, with segments already percent-encoded.
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    /// JSON encoded request body.
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn json_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response as received from the catalog.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// URL the response was received from, relative references in headers
    /// resolve against it.
    pub url: Option<Url>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            url: None,
        }
    }

    /// The `Location` header, if present and valid UTF-8.
    pub fn location(&self) -> Option<Result<&str, header::ToStrError>> {
        self.headers.get(header::LOCATION).map(|value| value.to_str())
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request path '{path}'")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to '{url}' failed")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("request was cancelled")]
    Cancelled,
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

/// Performs a single HTTP exchange.
///
/// Implementations must return [TransportError::Cancelled] once `cancel`
/// fires and must not retry on their own.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// [Transport] backed by a [reqwest::Client].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Validate `config` and build a client sending JSON and the configured
    /// credentials with every request.
    pub fn new(config: &GeoServerConfig) -> Result<Self, ConfigError> {
        let base_url = config.network_base_url()?;
        let client = build_http_client(config)?;
        Ok(Self { client, base_url })
    }

    /// Use a preconfigured client.
    ///
    /// The client is used as is, neither headers nor credentials are added.
    pub fn from_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, request: &TransportRequest) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|source| TransportError::InvalidPath {
                path: request.path.clone(),
                source,
            })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    async fn send(
        &self,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        let url = self.url(&request)?;

        let mut builder = self.client.request(request.method, url.clone());
        if let Some(body) = request.body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let response_url = response.url().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(TransportResponse {
                status,
                headers,
                body: body.to_vec(),
                url: Some(response_url),
            })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%url, "request cancelled");
                Err(TransportError::Cancelled)
            },
            response = exchange => {
                let response = response.map_err(|source| TransportError::Request { url: url.clone(), source })?;
                debug!(%url, status = %response.status, "received response");
                Ok(response)
            },
        }
    }
}

/// Build an HTTP client with JSON and optional authorization headers.
///
/// No timeouts are set, requests are only aborted through cancellation.
fn build_http_client(config: &GeoServerConfig) -> Result<reqwest::Client, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(authorization) = &config.authorization {
        let mut value = HeaderValue::from_str(&normalize_authorization(authorization)?)
            .map_err(ConfigError::InvalidHeader)?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }

    let client_builder = reqwest::Client::builder().default_headers(headers);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder.build().map_err(ConfigError::HttpClient)
}
