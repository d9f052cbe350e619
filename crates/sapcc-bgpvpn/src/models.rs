//! Data models for the interconnection extension.

use sapcc_core::body::{build_request_body, ToRequestBody};
use sapcc_core::pagination::{extract_field, Extract, IdMarkerPage, MarkerExtract};
use sapcc_core::query::{QueryPairs, QueryParams, ToQuery};
use sapcc_core::uuid::InterconnectionId;
use sapcc_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Projects allowed on one side of an interconnection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameters {
    /// Keystone project IDs.
    #[serde(default)]
    pub project_id: Vec<String>,
}

/// A BGPVPN interconnection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interconnection {
    /// Interconnection UUID.
    pub id: InterconnectionId,
    /// Owning project.
    #[serde(default)]
    pub project_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Interconnection type, `bgpvpn`.
    #[serde(rename = "type", default)]
    pub interconnection_type: String,
    /// Lifecycle state, e.g. `WAITING_REMOTE` or `ACTIVE`.
    #[serde(default)]
    pub state: String,
    /// Local BGPVPN ID.
    #[serde(default)]
    pub local_resource_id: String,
    /// BGPVPN ID in the remote region.
    #[serde(default)]
    pub remote_resource_id: String,
    /// Remote region name.
    #[serde(default)]
    pub remote_region: String,
    /// Matching interconnection in the remote region, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_interconnection_id: Option<String>,
    /// Local side parameters.
    #[serde(default)]
    pub local_parameters: Parameters,
    /// Remote side parameters.
    #[serde(default)]
    pub remote_parameters: Parameters,
}

impl Extract for Interconnection {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_field(body, "interconnections")
    }
}

impl MarkerExtract for Interconnection {
    fn marker(item: &Self) -> String {
        item.id.to_string()
    }
}

/// Pages of interconnections.
pub type InterconnectionPage = IdMarkerPage<Interconnection>;

/// Sort direction for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// Filters and paging for listing interconnections.
///
/// Paging continues past the first page only when `limit` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListInterconnectionsOpts {
    /// Attributes to return; all when empty.
    pub fields: Vec<String>,
    /// Owning project.
    pub project_id: String,
    /// Display name.
    pub name: String,
    /// Interconnection type.
    pub interconnection_type: String,
    /// Lifecycle state.
    pub state: String,
    /// Local BGPVPN ID.
    pub local_resource_id: String,
    /// Remote BGPVPN ID.
    pub remote_resource_id: String,
    /// Remote region.
    pub remote_region: String,
    /// Remote interconnection ID.
    pub remote_interconnection_id: String,
    /// Page size.
    pub limit: u32,
    /// Start after this interconnection ID.
    pub marker: String,
    /// Sort attributes, paired with `sort_dir` by position.
    pub sort_key: Vec<String>,
    /// Sort directions.
    pub sort_dir: Vec<SortDir>,
}

impl ToQuery for ListInterconnectionsOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_all("fields", &self.fields);
        params.push_nonzero("project_id", &self.project_id);
        params.push_nonzero("name", &self.name);
        params.push_nonzero("type", &self.interconnection_type);
        params.push_nonzero("state", &self.state);
        params.push_nonzero("local_resource_id", &self.local_resource_id);
        params.push_nonzero("remote_resource_id", &self.remote_resource_id);
        params.push_nonzero("remote_region", &self.remote_region);
        params.push_nonzero("remote_interconnection_id", &self.remote_interconnection_id);
        params.push_nonzero("limit", &self.limit);
        params.push_nonzero("marker", &self.marker);
        params.push_all("sort_key", &self.sort_key);
        params.push_all("sort_dir", &self.sort_dir);
        Ok(params.into_pairs())
    }
}

/// Request payload for creating an interconnection.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CreateInterconnectionOpts {
    /// Owning project; the token's project when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Interconnection type; Neutron assumes `bgpvpn` when absent.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub interconnection_type: Option<String>,
    /// Local BGPVPN ID.
    pub local_resource_id: String,
    /// Remote BGPVPN ID.
    pub remote_resource_id: String,
    /// Remote region.
    pub remote_region: String,
    /// Matching interconnection in the remote region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_interconnection_id: Option<String>,
}

impl CreateInterconnectionOpts {
    /// Options with the three required fields.
    #[must_use]
    pub fn new(
        local_resource_id: impl Into<String>,
        remote_resource_id: impl Into<String>,
        remote_region: impl Into<String>,
    ) -> Self {
        Self {
            local_resource_id: local_resource_id.into(),
            remote_resource_id: remote_resource_id.into(),
            remote_region: remote_region.into(),
            ..Self::default()
        }
    }
}

impl ToRequestBody for CreateInterconnectionOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(
            self,
            Some("interconnection"),
            &["local_resource_id", "remote_resource_id", "remote_region"],
        )
    }
}

/// Request payload for updating an interconnection.
///
/// `None` leaves a field untouched; `Some` of an empty value clears it.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpdateInterconnectionOpts {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lifecycle state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Matching interconnection in the remote region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_interconnection_id: Option<String>,
    /// Local side parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_parameters: Option<Parameters>,
    /// Remote side parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_parameters: Option<Parameters>,
}

impl ToRequestBody for UpdateInterconnectionOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(self, Some("interconnection"), &[])
    }
}
