//! Client for the workspace and data store endpoints of the GeoServer REST
//! catalog.
//!
//! This crate provides:
//! - typed access to workspaces ([WorkspaceApi]) and data stores
//!   ([DataStoreApi]) through [GeoServerClient]
//! - classification of catalog responses into business [Outcome]s
//! - a configurable [ErrorPolicy] deciding which failures are raised
//! - the strict `{"entry": [...]}` encoding of [ConnectionParameters]
//! - an in-memory [MockTransport] for tests (feature-gated)
//!
//! ## Usage
//!
//! ```ignore
//! use geoserver_catalog::{GeoServerClient, GeoServerConfig, WorkspaceApi};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = GeoServerConfig::load(None)?;
//! let client = GeoServerClient::new(&config)?;
//!
//! let envelope = client.get_workspace("topp", &CancellationToken::new()).await?;
//! match envelope.payload() {
//!     Some(workspace) => println!("{}", workspace.name),
//!     None => println!("no such workspace ({})", envelope.status()),
//! }
//! ```

mod client;
mod config;
mod connection_parameters;
mod datastores;
mod envelope;
mod error;
mod outcome;
mod policy;
mod transport;
mod types;
mod workspaces;

#[cfg(any(test, feature = "tests"))]
mod mock;

pub use client::GeoServerClient;
pub use config::{ConfigError, GeoServerConfig, GEOSERVER_ENV_PREFIX};
pub use connection_parameters::{ConnectionParameter, ConnectionParameters};
pub use datastores::DataStoreApi;
pub use envelope::ResourceEnvelope;
pub use error::{CatalogError, ProtocolViolation};
#[cfg(any(test, feature = "tests"))]
pub use mock::MockTransport;
pub use outcome::{classify, Operation, Outcome, ResourceKind};
pub use policy::{ErrorPolicy, PolicyGate, TracingWarningSink, WarningSink};
pub use transport::{
    HttpTransport,
    Transport,
    TransportError,
    TransportRequest,
    TransportResponse,
};
pub use types::{
    DataStoreInfo,
    DataStoreSummary,
    NamedLink,
    WorkspaceInfo,
    WorkspaceSummary,
};
pub use workspaces::WorkspaceApi;
