//! Configuration types for catalog client construction.

use std::path::Path;

use config::{Config as HierarchicalConfig, Environment, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::policy::ErrorPolicy;

/// Prefix of environment variables read by [GeoServerConfig::load].
pub const GEOSERVER_ENV_PREFIX: &str = "GEOSERVER";

/// Configuration for catalog client construction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeoServerConfig {
    /// Base URL of the REST API, e.g. `http://localhost:8080/geoserver/rest/`.
    pub base_url: Option<Url>,
    /// Full value of the `Authorization` header, e.g. `Basic YWRtaW46Z2Vvc2VydmVy`.
    pub authorization: Option<String>,
    /// Report unexpected responses as empty envelopes instead of errors.
    #[serde(default = "default_true")]
    pub suppress_server_errors: bool,
    /// Ask the catalog not to log an exception when a resource is absent.
    #[serde(default = "default_true")]
    pub quiet_if_absent: bool,
    /// Overrides the default `User-Agent` of the HTTP client.
    pub user_agent: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base URL of the catalog is not set")]
    MissingBaseUrl,
    #[error("base URL '{0}' is not a network address")]
    NotANetworkAddress(Url),
    #[error("authorization header value must contain at least an authentication scheme")]
    InvalidAuthorization,
    #[error("invalid header value")]
    InvalidHeader(#[source] http::header::InvalidHeaderValue),
    #[error("could not read catalog configuration")]
    Read(#[source] config::ConfigError),
    #[error("could not build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

impl GeoServerConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
            authorization: None,
            suppress_server_errors: true,
            quiet_if_absent: true,
            user_agent: None,
        }
    }

    /// Read the configuration from an optional TOML file,
    /// overridden by `GEOSERVER_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = HierarchicalConfig::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "reading catalog configuration file");
            builder = builder
                .add_source(config::File::from(path.to_path_buf()).format(FileFormat::Toml));
        }
        builder = builder.add_source(
            Environment::with_prefix(GEOSERVER_ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: GeoServerConfig = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(ConfigError::Read)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used to build an HTTP transport.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.network_base_url()?;
        if let Some(authorization) = &self.authorization {
            normalize_authorization(authorization)?;
        }
        Ok(())
    }

    pub fn policy(&self) -> ErrorPolicy {
        ErrorPolicy {
            suppress_server_errors: self.suppress_server_errors,
            quiet_if_absent: self.quiet_if_absent,
        }
    }

    /// The base URL, checked to be an `http(s)` address and ending in `/`
    /// so that relative paths are joined below it.
    pub(crate) fn network_base_url(&self) -> Result<Url, ConfigError> {
        let base_url = self.base_url.clone().ok_or(ConfigError::MissingBaseUrl)?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.host_str().is_none() {
            return Err(ConfigError::NotANetworkAddress(base_url));
        }

        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(base_url)
    }
}

/// Split an `Authorization` value into scheme and parameters and join them
/// with a single space.
pub(crate) fn normalize_authorization(value: &str) -> Result<String, ConfigError> {
    let mut tokens = value.split_whitespace();
    let scheme = tokens.next().ok_or(ConfigError::InvalidAuthorization)?;
    let parameter = tokens.collect::<Vec<_>>().join(" ");
    if parameter.is_empty() {
        Ok(scheme.to_string())
    } else {
        Ok(format!("{scheme} {parameter}"))
    }
}
