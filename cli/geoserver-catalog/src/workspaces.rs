//! Workspace operations.

use http::Method;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

use crate::client::{encode_body, segment, GeoServerClient, DEFAULT, RECURSE};
use crate::envelope::ResourceEnvelope;
use crate::error::CatalogError;
use crate::outcome::{Operation, ResourceKind};
use crate::transport::{Transport, TransportRequest};
use crate::types::{
    GetWorkspaceResponse,
    NamedLink,
    WorkspaceBody,
    WorkspaceInfo,
    WorkspaceSummary,
    WorkspacesResponse,
};

const WORKSPACE: ResourceKind = ResourceKind::Workspace;

pub(crate) fn workspaces_path() -> String {
    "workspaces".to_string()
}

pub(crate) fn workspace_path(name: &str) -> Result<String, CatalogError> {
    Ok(format!("workspaces/{}", segment(name)?))
}

/// Management of workspaces, the top level containers of the catalog.
#[allow(async_fn_in_trait)]
pub trait WorkspaceApi {
    /// List all workspaces.
    async fn get_workspaces(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Vec<NamedLink>>, CatalogError>;

    /// Get a single workspace, the payload is empty if it does not exist.
    async fn get_workspace(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<WorkspaceSummary>, CatalogError>;

    /// Create a workspace and return its location.
    ///
    /// `default` makes the new workspace the default workspace,
    /// the flag is only sent when set.
    async fn create_workspace(
        &self,
        workspace: &WorkspaceInfo,
        default: Option<bool>,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Url>, CatalogError>;

    /// Replace the workspace `name` with `workspace`.
    ///
    /// The catalog refuses renames with `405 Method Not Allowed`.
    async fn update_workspace(
        &self,
        name: &str,
        workspace: &WorkspaceInfo,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError>;

    /// Delete a workspace.
    ///
    /// Non-empty workspaces are only deleted with `recurse` set,
    /// the default workspace can't be deleted at all.
    async fn delete_workspace(
        &self,
        name: &str,
        recurse: Option<bool>,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError>;
}

impl<T: Transport> WorkspaceApi for GeoServerClient<T> {
    #[instrument(skip_all)]
    async fn get_workspaces(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Vec<NamedLink>>, CatalogError> {
        self.fetch(
            Operation::List(WORKSPACE),
            workspaces_path(),
            cancel,
            |response: WorkspacesResponse| response.workspaces.workspace,
        )
        .await
    }

    #[instrument(skip_all, fields(workspace = name))]
    async fn get_workspace(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<WorkspaceSummary>, CatalogError> {
        self.fetch(
            Operation::Get(WORKSPACE),
            workspace_path(name)?,
            cancel,
            |response: GetWorkspaceResponse| response.workspace,
        )
        .await
    }

    #[instrument(skip_all, fields(workspace = %workspace.name, ?default))]
    async fn create_workspace(
        &self,
        workspace: &WorkspaceInfo,
        default: Option<bool>,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<Url>, CatalogError> {
        let body = encode_body(&WorkspaceBody { workspace })?;
        let mut request = TransportRequest::new(Method::POST, workspaces_path()).json_body(body);
        if let Some(default) = default {
            request = request.query(DEFAULT, default);
        }

        self.create(Operation::Create(WORKSPACE), request, &workspace.name, cancel)
            .await
    }

    #[instrument(skip_all, fields(workspace = name))]
    async fn update_workspace(
        &self,
        name: &str,
        workspace: &WorkspaceInfo,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError> {
        let body = encode_body(&WorkspaceBody { workspace })?;
        let request = TransportRequest::new(Method::PUT, workspace_path(name)?).json_body(body);
        self.modify(Operation::Update(WORKSPACE), request, cancel)
            .await
    }

    #[instrument(skip_all, fields(workspace = name, ?recurse))]
    async fn delete_workspace(
        &self,
        name: &str,
        recurse: Option<bool>,
        cancel: &CancellationToken,
    ) -> Result<ResourceEnvelope<bool>, CatalogError> {
        let mut request = TransportRequest::new(Method::DELETE, workspace_path(name)?);
        if let Some(recurse) = recurse {
            request = request.query(RECURSE, recurse);
        }
        self.modify(Operation::Delete(WORKSPACE), request, cancel)
            .await
    }
}
