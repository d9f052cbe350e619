use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use sapcc_core::body::{build_request_body, ToRequestBody};
use sapcc_core::pagination::{extract_field, Extract};
use sapcc_core::query::{HeaderParams, QueryPairs, QueryParams, ToQuery};
use sapcc_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header selecting the cluster on multi-cluster deployments.
pub const CLUSTER_ID_HEADER: &str = "X-Limes-Cluster-Id";

/// Filters shared by every resource report.
///
/// Each filter list expands to one repeated query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOpts {
    /// Service types to include, e.g. `compute`.
    pub services: Vec<String>,
    /// Areas to include, e.g. `storage`.
    pub areas: Vec<String>,
    /// Resource names to include, e.g. `cores`.
    pub resources: Vec<String>,
    /// Include subresources and subcapacities.
    pub detail: bool,
    /// Target cluster; empty for the cluster of the endpoint.
    pub cluster_id: String,
}

impl ReportOpts {
    /// Build the request headers for these options.
    ///
    /// # Errors
    ///
    /// Returns [`sapcc_core::Error::InvalidInput`] if the cluster ID is not a valid header value.
    pub fn to_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderParams::new();
        headers.push_nonzero(CLUSTER_ID_HEADER, &self.cluster_id)?;
        Ok(headers.into_headers())
    }
}

impl ToQuery for ReportOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_all("service", &self.services);
        params.push_all("area", &self.areas);
        params.push_all("resource", &self.resources);
        params.push_presence("detail", self.detail);
        Ok(params.into_pairs())
    }
}

/// Cluster-wide capacity and usage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterReport {
    /// Cluster ID.
    pub id: String,
    /// Per-service reports.
    #[serde(default)]
    pub services: Vec<ClusterServiceReport>,
    /// Newest scrape across all services.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub max_scraped_at: Option<DateTime<Utc>>,
    /// Oldest scrape across all services.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub min_scraped_at: Option<DateTime<Utc>>,
}

/// One service within a [`ClusterReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterServiceReport {
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Area the service belongs to.
    #[serde(default)]
    pub area: String,
    /// Per-resource reports.
    #[serde(default)]
    pub resources: Vec<ClusterResourceReport>,
    /// Newest scrape of this service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub max_scraped_at: Option<DateTime<Utc>>,
    /// Oldest scrape of this service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub min_scraped_at: Option<DateTime<Utc>>,
}

/// One resource within a [`ClusterServiceReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterResourceReport {
    /// Resource name.
    pub name: String,
    /// Unit, empty for countable resources.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Category for grouping in user interfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Capacity after overcommit; absent when not measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u64>,
    /// Capacity before overcommit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_capacity: Option<u64>,
    /// Sum of all domain quotas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains_quota: Option<u64>,
    /// Sum of all project usages.
    #[serde(default)]
    pub usage: u64,
    /// Usage above quota covered by bursting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_usage: Option<u64>,
    /// Physical usage, for resources that track it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_usage: Option<u64>,
    /// Opaque capacity breakdown, only with `detail`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcapacities: Option<Value>,
    /// Whether the resource has no quota.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_quota: bool,
}

/// Quota and usage of one domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainReport {
    /// Keystone domain ID.
    pub id: String,
    /// Domain name.
    #[serde(default)]
    pub name: String,
    /// Per-service reports.
    #[serde(default)]
    pub services: Vec<DomainServiceReport>,
}

impl Extract for DomainReport {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_field(body, "domains")
    }
}

/// One service within a [`DomainReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainServiceReport {
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Area the service belongs to.
    #[serde(default)]
    pub area: String,
    /// Per-resource reports.
    #[serde(default)]
    pub resources: Vec<DomainResourceReport>,
    /// Newest scrape of this service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub max_scraped_at: Option<DateTime<Utc>>,
    /// Oldest scrape of this service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub min_scraped_at: Option<DateTime<Utc>>,
}

/// One resource within a [`DomainServiceReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainResourceReport {
    /// Resource name.
    pub name: String,
    /// Unit, empty for countable resources.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Category for grouping in user interfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Domain quota.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<u64>,
    /// Sum of the project quotas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects_quota: Option<u64>,
    /// Sum of the project usages.
    #[serde(default)]
    pub usage: u64,
    /// Usage above quota covered by bursting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_usage: Option<u64>,
    /// Physical usage, for resources that track it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_usage: Option<u64>,
    /// Sum of backend quotas, when it differs from `projects_quota`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_quota: Option<i64>,
    /// Whether some project has unlimited backend quota.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infinite_backend_quota: Option<bool>,
    /// Whether the resource has no quota.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_quota: bool,
}

/// Quota bursting settings of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectBursting {
    /// Whether bursting is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Fraction of quota usable beyond quota.
    #[serde(default)]
    pub multiplier: f64,
}

/// Quota and usage of one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectReport {
    /// Keystone project ID.
    pub id: String,
    /// Project name.
    #[serde(default)]
    pub name: String,
    /// Parent project or domain ID.
    #[serde(default)]
    pub parent_id: String,
    /// Bursting settings, when the cluster supports bursting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bursting: Option<ProjectBursting>,
    /// Per-service reports.
    #[serde(default)]
    pub services: Vec<ProjectServiceReport>,
}

impl Extract for ProjectReport {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_field(body, "projects")
    }
}

/// One service within a [`ProjectReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectServiceReport {
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Area the service belongs to.
    #[serde(default)]
    pub area: String,
    /// Per-resource reports.
    #[serde(default)]
    pub resources: Vec<ProjectResourceReport>,
    /// Last scrape of this service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub scraped_at: Option<DateTime<Utc>>,
}

/// One resource within a [`ProjectServiceReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectResourceReport {
    /// Resource name.
    pub name: String,
    /// Unit, empty for countable resources.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Category for grouping in user interfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Project quota.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<u64>,
    /// Quota usable including bursting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usable_quota: Option<u64>,
    /// Current usage.
    #[serde(default)]
    pub usage: u64,
    /// Usage above quota covered by bursting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_usage: Option<u64>,
    /// Physical usage, for resources that track it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_usage: Option<u64>,
    /// Quota in the backend, when it differs from `quota`; `-1` is unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_quota: Option<i64>,
    /// Opaque usage breakdown, only with `detail`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subresources: Option<Value>,
    /// Whether the resource has no quota.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_quota: bool,
}

/// New quota for one resource.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ResourceQuota {
    /// Resource name.
    pub name: String,
    /// New quota, in `unit`.
    pub quota: u64,
    /// Unit of `quota`; the resource's base unit when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// New quotas within one service.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ServiceQuota {
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Resources to change.
    pub resources: Vec<ResourceQuota>,
}

/// Request payload for changing project quotas.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpdateProjectQuotaOpts {
    /// Services to change.
    pub services: Vec<ServiceQuota>,
}

impl ToRequestBody for UpdateProjectQuotaOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(self, Some("project"), &["services"])
    }
}
