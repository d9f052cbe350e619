use chrono::{DateTime, Utc};
use sapcc_core::pagination::{extract_field, Extract};
use sapcc_core::query::{QueryPairs, QueryParams, ToQuery};
use sapcc_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filters for rate reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateOpts {
    /// Service types to include.
    pub services: Vec<String>,
    /// Areas to include.
    pub areas: Vec<String>,
}

impl ToQuery for RateOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_all("service", &self.services);
        params.push_all("area", &self.areas);
        Ok(params.into_pairs())
    }
}

/// A rate limit: at most `limit` actions per `window`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimit {
    /// Rate name, e.g. `instance/create`.
    pub name: String,
    /// Unit of the rate, empty for plain counts.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Number of actions allowed per window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Window length, e.g. `1m`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

/// Default rate limits of the cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterRateReport {
    /// Cluster ID.
    pub id: String,
    /// Per-service rates.
    #[serde(default)]
    pub services: Vec<ClusterServiceRates>,
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

/// Rates of one service within a [`ClusterRateReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterServiceRates {
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Area the service belongs to.
    #[serde(default)]
    pub area: String,
    /// Rates of this service.
    #[serde(default)]
    pub rates: Vec<RateLimit>,
}

/// Rate limits and usage of one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectRateReport {
    /// Keystone project ID.
    pub id: String,
    /// Project name.
    #[serde(default)]
    pub name: String,
    /// Parent project or domain ID.
    #[serde(default)]
    pub parent_id: String,
    /// Per-service rates.
    #[serde(default)]
    pub services: Vec<ProjectServiceRates>,
}

impl Extract for ProjectRateReport {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_field(body, "projects")
    }
}

/// Rates of one service within a [`ProjectRateReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectServiceRates {
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Area the service belongs to.
    #[serde(default)]
    pub area: String,
    /// Rates of this service.
    #[serde(default)]
    pub rates: Vec<ProjectRate>,
    /// Last scrape of this service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub scraped_at: Option<DateTime<Utc>>,
}

/// One rate of a project, with the cluster default it overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRate {
    /// Rate name.
    pub name: String,
    /// Unit of the rate, empty for plain counts.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Effective limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Effective window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    /// Cluster default limit, when overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<u64>,
    /// Cluster default window, when overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_window: Option<String>,
    /// Usage counter, a decimal string since it may exceed 64 bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_as_bigint: Option<String>,
}
