//! Data store operations.
//!
//! Data stores live inside a workspace and describe how to connect to a
//! source of vector data, see [crate::ConnectionParameters].

use http::Method;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

use crate::client::{encode_body, segment, GeoServerClient, RECURSE};
use crate::envelope::ResourceEnvelope;
use crate::error::CatalogError;
use crate::outcome::{Operation, ResourceKind};
use crate::transport::{Transport, TransportRequest};
use crate::types::{
    DataStoreBody,
    DataStoreInfo,
    DataStoreSummary,
    DataStoresResponse,
    GetDataStoreResponse,
    NamedLink,
};
use crate::workspaces::workspace_path;

const DATA_STORE: ResourceKind = ResourceKind::DataStore;

fn datastores_path(workspace: &str) -> Result<String, CatalogError> {
    Ok(format!("{}/datastores", workspace_path(workspace)?))
}

fn datastore_path(workspace: &str, name: &str) -> Result<String, CatalogError> {
    Ok(format!("{}/{}", datastores_path(workspace)?, segment(name)?))
}

#[allow(async_fn_in_trait)]
pub trait DataStoreApi {
    /// List the data stores of a workspace.
    async fn get_datastores(
        &self,
        workspace: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Vec<NamedLink>>, CatalogError>;

    async fn get_datastore(
        &self,
        workspace: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<DataStoreSummary>, CatalogError>;

    /// Create a data store in `workspace` and return its location.
    ///
    /// A `500` means the catalog could not set up the store, e.g. because
    /// the connection parameters point nowhere.
    /// It is reported as an empty envelope.
    async fn create_datastore(
        &self,
        workspace: &str,
        data_store: &DataStoreInfo,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Url>, CatalogError>;

    /// Replace the data store named `data_store.name`.
    async fn update_datastore(
        &self,
        workspace: &str,
        data_store: &DataStoreInfo,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError>;

    /// Delete a data store, along with its layers if `recurse` is set.
    async fn delete_datastore(
        &self,
        workspace: &str,
        name: &str,
        recurse: Option<bool>,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError>;
}

impl<T: Transport> DataStoreApi for GeoServerClient<T> {
    #[instrument(skip_all, fields(workspace = workspace))]
    async fn get_datastores(
        &self,
        workspace: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Vec<NamedLink>>, CatalogError> {
        self.fetch(
            Operation::List(DATA_STORE),
            datastores_path(workspace)?,
            cancel,
            |response: DataStoresResponse| response.data_stores.data_store,
        )
        .await
    }

    #[instrument(skip_all, fields(workspace = workspace, datastore = name))]
    async fn get_datastore(
        &self,
        workspace: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<DataStoreSummary>, CatalogError> {
        self.fetch(
            Operation::Get(DATA_STORE),
            datastore_path(workspace, name)?,
            cancel,
            |response: GetDataStoreResponse| response.data_store,
        )
        .await
    }

    #[instrument(skip_all, fields(workspace = workspace, datastore = %data_store.name))]
    async fn create_datastore(
        &self,
        workspace: &str,
        data_store: &DataStoreInfo,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Url>, CatalogError> {
        let body = encode_body(&DataStoreBody { data_store })?;
        let request =
            TransportRequest::new(Method::POST, datastores_path(workspace)?).json_body(body);
        self.create(Operation::Create(DATA_STORE), request, &data_store.name, cancel)
            .await
    }

    #[instrument(skip_all, fields(workspace = workspace, datastore = %data_store.name))]
    async fn update_datastore(
        &self,
        workspace: &str,
        data_store: &DataStoreInfo,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError> {
        let body = encode_body(&DataStoreBody { data_store })?;
        let request = TransportRequest::new(
            Method::PUT,
            datastore_path(workspace, &data_store.name)?,
        )
        .json_body(body);
        self.modify(Operation::Update(DATA_STORE), request, cancel)
            .await
    }

    #[instrument(skip_all, fields(workspace = workspace, datastore = name, ?recurse))]
    async fn delete_datastore(
        &self,
        workspace: &str,
        name: &str,
        recurse: Option<bool>,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError> {
        let mut request = TransportRequest::new(Method::DELETE, datastore_path(workspace, name)?);
        if let Some(recurse) = recurse {
            request = request.query(RECURSE, recurse);
        }
        self.modify(Operation::Delete(DATA_STORE), request, cancel)
            .await
    }
}
