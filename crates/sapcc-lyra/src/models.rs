//! Lyra models: automations and automation runs.
//!
//! Chef and script automations share one [`Automation`] struct; the fields
//! of the other flavor stay at their defaults.

use chrono::{DateTime, Utc};
use sapcc_core::body::{build_request_body, ToRequestBody};
use sapcc_core::pagination::{extract_array, Extract};
use sapcc_core::query::{QueryPairs, QueryParams, ToQuery};
use sapcc_core::Result;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flavor of an automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutomationType {
    /// Chef zero run.
    Chef,
    /// Script executed from the repository.
    Script,
}

/// An automation definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Automation {
    /// Automation ID.
    pub id: String,
    /// Name.
    pub name: String,
    /// Flavor.
    #[serde(rename = "type")]
    pub automation_type: AutomationType,
    /// Owning project ID.
    #[serde(default)]
    pub project_id: String,
    /// Git repository URL.
    pub repository: String,
    /// Branch, tag or commit checked out.
    #[serde(default)]
    pub repository_revision: String,
    /// Whether credentials are stored for the repository.
    #[serde(default)]
    pub repository_authentication_enabled: bool,
    /// Timeout in seconds.
    #[serde(default)]
    pub timeout: u32,
    /// Free-form tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,

    /// Chef run list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run_list: Vec<String>,
    /// Chef node attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chef_attributes: Option<Map<String, Value>>,
    /// Chef log level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Chef debug mode.
    #[serde(default)]
    pub debug: bool,
    /// Chef client version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chef_version: Option<String>,

    /// Script path inside the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Script arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    /// Script environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl Extract for Automation {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Paging parameters shared by the automation and run lists.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListOpts {
    /// Page to start at (1-based).
    pub page: u32,
    /// Entries per page.
    pub per_page: u32,
}

impl ToQuery for ListOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("page", &self.page);
        params.push_nonzero("per_page", &self.per_page);
        Ok(params.into_pairs())
    }
}

#[allow(clippy::ref_option)]
fn serialize_credentials<S>(value: &Option<SecretString>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Request payload for creating an automation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAutomationOpts {
    /// Name.
    pub name: String,
    /// Flavor.
    #[serde(rename = "type")]
    pub automation_type: AutomationType,
    /// Git repository URL.
    pub repository: String,
    /// Branch, tag or commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_revision: Option<String>,
    /// Credentials for a private repository.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_credentials"
    )]
    pub repository_credentials: Option<SecretString>,
    /// Timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Free-form tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// Chef run list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_list: Option<Vec<String>>,
    /// Chef node attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef_attributes: Option<Map<String, Value>>,
    /// Chef log level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Chef debug mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Chef client version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef_version: Option<String>,
    /// Script path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Script arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
    /// Script environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, String>>,
}

impl CreateAutomationOpts {
    /// Options for an automation of the given flavor with every optional field unset.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        automation_type: AutomationType,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            automation_type,
            repository: repository.into(),
            repository_revision: None,
            repository_credentials: None,
            timeout: None,
            tags: None,
            run_list: None,
            chef_attributes: None,
            log_level: None,
            debug: None,
            chef_version: None,
            path: None,
            arguments: None,
            environment: None,
        }
    }
}

impl ToRequestBody for CreateAutomationOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(self, None, &["name", "type", "repository"])
    }
}

/// Request payload for updating an automation.
///
/// `None` leaves a field untouched; `Some` of an empty value clears it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateAutomationOpts {
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Git repository URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Branch, tag or commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_revision: Option<String>,
    /// Credentials for a private repository.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_credentials"
    )]
    pub repository_credentials: Option<SecretString>,
    /// Timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Free-form tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// Chef run list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_list: Option<Vec<String>>,
    /// Chef node attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef_attributes: Option<Map<String, Value>>,
    /// Chef log level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Chef debug mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Chef client version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef_version: Option<String>,
    /// Script path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Script arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
    /// Script environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, String>>,
}

impl ToRequestBody for UpdateAutomationOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(self, None, &[])
    }
}

/// State of an automation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Resolving the selector and scheduling jobs.
    Preparing,
    /// Jobs are running.
    Executing,
    /// All jobs finished successfully.
    Completed,
    /// At least one job failed.
    Failed,
}

/// User that started a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOwner {
    /// User ID.
    #[serde(default)]
    pub id: String,
    /// User name.
    #[serde(default)]
    pub name: String,
    /// Domain ID.
    #[serde(default)]
    pub domain_id: String,
    /// Domain name.
    #[serde(default)]
    pub domain_name: String,
}

/// One execution of an automation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    /// Run ID.
    pub id: String,
    /// Executed automation.
    pub automation_id: String,
    /// Name of the executed automation.
    #[serde(default)]
    pub automation_name: String,
    /// Arc filter expression selecting the agents.
    pub selector: String,
    /// Owning project ID.
    #[serde(default)]
    pub project_id: String,
    /// Current state.
    pub state: RunState,
    /// Run log.
    #[serde(default)]
    pub log: String,
    /// Arc job IDs spawned by the run.
    #[serde(default)]
    pub jobs: Vec<String>,
    /// Resolved revision.
    #[serde(default)]
    pub repository_revision: String,
    /// Snapshot of the automation at run time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_attributes: Option<Map<String, Value>>,
    /// Starting user.
    #[serde(default)]
    pub owner: RunOwner,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Extract for Run {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Request payload for starting a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateRunOpts {
    /// Automation to execute.
    pub automation_id: String,
    /// Arc filter expression selecting the agents.
    pub selector: String,
}

impl ToRequestBody for CreateRunOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(self, None, &["automation_id", "selector"])
    }
}
