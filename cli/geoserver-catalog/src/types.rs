//! Catalog resource types.
//!
//! These mirror the JSON shapes of the GeoServer REST API.
//! Request bodies and list responses are wrapped one level deep under the
//! name of the resource; the wrappers are private to the crate.

use serde::{Deserialize, Deserializer, Serialize};
use serde_with::skip_serializing_none;
use url::Url;

use crate::connection_parameters::ConnectionParameters;

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Reference to a catalog resource, as returned by list operations.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedLink {
    pub name: String,
    pub href: String,
    pub class: Option<String>,
    pub link: Option<String>,
}

// ---------------------------------------------------------------------------
// Workspaces
// ---------------------------------------------------------------------------

/// A workspace as submitted to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub name: String,
    /// Isolated workspaces are only visible through virtual services.
    #[serde(default)]
    pub isolated: bool,
}

impl WorkspaceInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            isolated: false,
        }
    }
}

/// A workspace as reported by the catalog, including links to its stores.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSummary {
    pub name: String,
    #[serde(default)]
    pub isolated: bool,
    pub data_stores: Option<String>,
    pub coverage_stores: Option<String>,
    pub wms_stores: Option<String>,
    pub wmts_stores: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WorkspaceBody<'a> {
    pub(crate) workspace: &'a WorkspaceInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetWorkspaceResponse {
    pub(crate) workspace: WorkspaceSummary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkspacesResponse {
    #[serde(deserialize_with = "empty_string_as_default")]
    pub(crate) workspaces: WorkspaceLinks,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorkspaceLinks {
    #[serde(default)]
    pub(crate) workspace: Vec<NamedLink>,
}

// ---------------------------------------------------------------------------
// Data stores
// ---------------------------------------------------------------------------

/// A data store as submitted to the catalog.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStoreInfo {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub connection_parameters: ConnectionParameters,
    #[serde(default)]
    pub disable_on_conn_failure: bool,
}

impl DataStoreInfo {
    pub fn new(name: impl Into<String>, connection_parameters: ConnectionParameters) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            connection_parameters,
            disable_on_conn_failure: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

fn enabled_default() -> bool {
    true
}

/// A data store as reported by the catalog.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStoreSummary {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub connection_parameters: ConnectionParameters,
    /// The workspace the data store belongs to.
    pub workspace: Option<NamedLink>,
    /// Whether this is the default store of its workspace.
    #[serde(rename = "_default", default)]
    pub default: bool,
    #[serde(default)]
    pub disable_on_conn_failure: bool,
    pub feature_types: Option<Url>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DataStoreBody<'a> {
    #[serde(rename = "dataStore")]
    pub(crate) data_store: &'a DataStoreInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetDataStoreResponse {
    #[serde(rename = "dataStore")]
    pub(crate) data_store: DataStoreSummary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataStoresResponse {
    #[serde(rename = "dataStores", deserialize_with = "empty_string_as_default")]
    pub(crate) data_stores: DataStoreLinks,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DataStoreLinks {
    #[serde(rename = "dataStore", default)]
    pub(crate) data_store: Vec<NamedLink>,
}

/// GeoServer renders empty collections as `""` instead of an empty object.
fn empty_string_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeEmpty<T> {
        Value(T),
        Empty(String),
    }

    match MaybeEmpty::<T>::deserialize(deserializer)? {
        MaybeEmpty::Value(value) => Ok(value),
        MaybeEmpty::Empty(s) if s.is_empty() => Ok(T::default()),
        MaybeEmpty::Empty(s) => Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&s),
            &"an object or an empty string",
        )),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn workspace_body_is_wrapped() {
        let workspace = WorkspaceInfo::new("topp");
        let body = serde_json::to_value(WorkspaceBody {
            workspace: &workspace,
        })
        .unwrap();
        assert_eq!(body, json!({ "workspace": { "name": "topp", "isolated": false } }));
    }

    #[test]
    fn data_store_body_is_wrapped() {
        let data_store = DataStoreInfo::new(
            "states1",
            [("url", "file:///data/shapefiles/states.shp")]
                .into_iter()
                .collect(),
        )
        .with_description("MyDesc");

        let body = serde_json::to_value(DataStoreBody {
            data_store: &data_store,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "dataStore": {
                    "name": "states1",
                    "description": "MyDesc",
                    "enabled": true,
                    "connectionParameters": {
                        "entry": [ { "@key": "url", "$": "file:///data/shapefiles/states.shp" } ]
                    },
                    "disableOnConnFailure": false,
                }
            })
        );
    }

    #[test]
    fn parse_workspace_summary() {
        let response: GetWorkspaceResponse = serde_json::from_value(json!({
            "workspace": {
                "name": "topp",
                "isolated": false,
                "dataStores": "http://localhost:8080/geoserver/rest/workspaces/topp/datastores.json",
                "coverageStores": "http://localhost:8080/geoserver/rest/workspaces/topp/coveragestores.json",
                "wmsStores": "http://localhost:8080/geoserver/rest/workspaces/topp/wmsstores.json",
                "wmtsStores": "http://localhost:8080/geoserver/rest/workspaces/topp/wmtsstores.json"
            }
        }))
        .unwrap();

        assert_eq!(response.workspace.name, "topp");
        assert!(response.workspace.data_stores.is_some());
        assert!(response.workspace.wmts_stores.is_some());
    }

    #[test]
    fn parse_data_store_summary() {
        let response: GetDataStoreResponse = serde_json::from_value(json!({
            "dataStore": {
                "name": "states_shapefile",
                "type": "Shapefile",
                "enabled": true,
                "workspace": {
                    "name": "topp",
                    "href": "http://localhost:8080/geoserver/rest/workspaces/topp.json"
                },
                "connectionParameters": {
                    "entry": [
                        { "@key": "url", "$": "file:data/shapefiles/states.shp" },
                        { "@key": "namespace", "$": "http://www.openplans.org/topp" }
                    ]
                },
                "_default": false,
                "disableOnConnFailure": false,
                "featureTypes": "http://localhost:8080/geoserver/rest/workspaces/topp/datastores/states_shapefile/featuretypes.json"
            }
        }))
        .unwrap();

        let data_store = response.data_store;
        assert_eq!(data_store.name, "states_shapefile");
        assert_eq!(data_store.workspace.unwrap().name, "topp");
        assert_eq!(
            data_store.connection_parameters.get("namespace"),
            Some("http://www.openplans.org/topp")
        );
        assert!(!data_store.default);
        assert!(data_store.feature_types.is_some());
    }

    #[test]
    fn malformed_connection_parameters_fail_summary() {
        serde_json::from_value::<GetDataStoreResponse>(json!({
            "dataStore": {
                "name": "states_shapefile",
                "connectionParameters": { "entry": [ { "key": "url", "value": "x" } ] }
            }
        }))
        .unwrap_err();
    }

    #[test]
    fn parse_link_lists() {
        let workspaces: WorkspacesResponse = serde_json::from_value(json!({
            "workspaces": {
                "workspace": [
                    { "name": "topp", "href": "http://localhost:8080/geoserver/rest/workspaces/topp.json" },
                    { "name": "sf", "href": "http://localhost:8080/geoserver/rest/workspaces/sf.json" }
                ]
            }
        }))
        .unwrap();
        let names = workspaces
            .workspaces
            .workspace
            .iter()
            .map(|link| link.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["topp", "sf"]);

        let data_stores: DataStoresResponse = serde_json::from_value(json!({
            "dataStores": {
                "dataStore": [
                    { "name": "states_shapefile", "href": "http://localhost/ds.json", "class": "dataStore" }
                ]
            }
        }))
        .unwrap();
        assert_eq!(
            data_stores.data_stores.data_store[0].class.as_deref(),
            Some("dataStore")
        );
    }

    #[test]
    fn empty_link_lists() {
        let workspaces: WorkspacesResponse =
            serde_json::from_value(json!({ "workspaces": "" })).unwrap();
        assert!(workspaces.workspaces.workspace.is_empty());

        let data_stores: DataStoresResponse =
            serde_json::from_value(json!({ "dataStores": "" })).unwrap();
        assert!(data_stores.data_stores.data_store.is_empty());

        serde_json::from_value::<WorkspacesResponse>(json!({ "workspaces": "nope" }))
            .unwrap_err();
    }
}
