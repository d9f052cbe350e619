//! Arc models: agents, tags, facts and jobs.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use sapcc_core::body::{build_request_body, ToRequestBody};
use sapcc_core::pagination::{extract_array, Extract};
use sapcc_core::query::{HeaderParams, QueryPairs, QueryParams, ToQuery};
use sapcc_core::uuid::{AgentId, JobId};
use sapcc_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Upper bound Arc accepts for a job timeout, in seconds.
pub const MAX_JOB_TIMEOUT: u32 = 86_400;

/// An agent registered with Arc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    /// Agent UUID.
    pub agent_id: AgentId,
    /// Human readable name, usually the hostname.
    #[serde(default)]
    pub display_name: String,
    /// Owning project ID.
    #[serde(default)]
    pub project: String,
    /// Owning domain ID.
    #[serde(default)]
    pub organization: String,
    /// Facts reported by the agent. Only filled when requested.
    #[serde(default)]
    pub facts: HashMap<String, Value>,
    /// Tags attached to the agent.
    #[serde(default)]
    pub tags: Tags,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Mechanism that performed the last update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_with: Option<String>,
    /// User that performed the last update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl Extract for Agent {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Query parameters for listing agents.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListAgentsOpts {
    /// Filter expression, e.g. `@os = 'linux' AND landscape = 'staging'`.
    pub q: String,
    /// Page to start at (1-based).
    pub page: u32,
    /// Agents per page.
    pub per_page: u32,
}

impl ToQuery for ListAgentsOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("q", &self.q);
        params.push_nonzero("page", &self.page);
        params.push_nonzero("per_page", &self.per_page);
        Ok(params.into_pairs())
    }
}

/// Query parameters for fetching a single agent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GetAgentOpts {
    /// Facts to embed in the response: `all` or a comma separated list of names.
    pub facts: String,
}

impl ToQuery for GetAgentOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("facts", &self.facts);
        Ok(params.into_pairs())
    }
}

/// Output formats of the agent init endpoint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitFormat {
    /// Token and URLs as JSON.
    #[default]
    Json,
    /// Install script for Linux.
    ShellScript,
    /// Install script for Windows.
    PowerShellScript,
    /// cloud-init user data.
    CloudConfig,
}

impl InitFormat {
    /// MIME type sent as `Accept`.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::ShellScript => "text/x-shellscript",
            Self::PowerShellScript => "text/x-powershellscript",
            Self::CloudConfig => "text/cloud-config",
        }
    }
}

impl fmt::Display for InitFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Options for creating an agent registration token.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct InitAgentOpts {
    /// Requested output format.
    #[serde(skip)]
    pub accept: InitFormat,
    /// Common name for the agent certificate.
    #[serde(rename = "CN", skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    /// Additional subject alternative names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

impl InitAgentOpts {
    /// Options requesting the given output format.
    #[must_use]
    pub fn new(accept: InitFormat) -> Self {
        Self {
            accept,
            ..Self::default()
        }
    }

    /// Headers for the init request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be encoded.
    pub fn to_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderParams::new();
        headers.push_required("Accept", self.accept.mime_type())?;
        Ok(headers.into_headers())
    }
}

impl ToRequestBody for InitAgentOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(self, None, &[])
    }
}

/// Registration data returned for [`InitFormat::Json`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitResult {
    /// One-time registration token.
    pub token: String,
    /// URL the agent uses to redeem the token.
    pub url: String,
    /// Arc broker endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    /// Where agent updates are published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
    /// Where the agent renews its certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_cert_url: Option<String>,
}

/// Response of the init endpoint, shaped by the requested format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitAgentOutput {
    /// Decoded JSON registration data.
    Json(InitResult),
    /// Install script or cloud-config document, verbatim.
    Script(String),
}

/// Tags attached to an agent.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Tags(pub BTreeMap<String, String>);

impl Tags {
    /// Create an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a tag value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl ToRequestBody for Tags {
    fn to_request_body(&self) -> Result<Value> {
        if self.is_empty() {
            return Err(Error::MissingInput("tags".to_string()));
        }
        if let Some(key) = self.0.keys().find(|key| !is_valid_tag_key(key)) {
            return Err(Error::InvalidInput(format!(
                "tag key `{key}` must be alphanumeric"
            )));
        }
        build_request_body(self, None, &[])
    }
}

fn is_valid_tag_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Check a single tag key before it is used in a request path.
pub(crate) fn validate_tag_key(key: &str) -> Result<&str> {
    if key.is_empty() {
        return Err(Error::MissingInput("key".to_string()));
    }
    if !is_valid_tag_key(key) {
        return Err(Error::InvalidInput(format!(
            "tag key `{key}` must be alphanumeric"
        )));
    }
    Ok(key)
}

/// Execution state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for the agent.
    Queued,
    /// Running on the agent.
    Executing,
    /// Finished with an error or timed out.
    Failed,
    /// Finished successfully.
    Complete,
}

/// User that submitted a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobUser {
    /// User ID.
    #[serde(default)]
    pub id: String,
    /// User name.
    #[serde(default)]
    pub name: String,
    /// Domain ID of the user.
    #[serde(default)]
    pub domain_id: String,
    /// Domain name of the user.
    #[serde(default)]
    pub domain_name: String,
    /// Roles held in the project.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A job executed on an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Job UUID.
    pub request_id: JobId,
    /// Message protocol version.
    #[serde(default)]
    pub version: u32,
    /// Sender of the request.
    #[serde(default)]
    pub sender: String,
    /// Target agent ID.
    pub to: String,
    /// Timeout in seconds.
    pub timeout: u32,
    /// Agent plugin executing the job, e.g. `execute` or `chef`.
    pub agent: String,
    /// Plugin action, e.g. `script`.
    pub action: String,
    /// Plugin payload.
    #[serde(default)]
    pub payload: String,
    /// Current state.
    pub status: JobStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Owning project ID.
    #[serde(default)]
    pub project: String,
    /// Submitting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<JobUser>,
}

impl Extract for Job {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Query parameters for listing jobs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListJobsOpts {
    /// Only jobs targeting this agent.
    pub agent_id: String,
    /// Page to start at (1-based).
    pub page: u32,
    /// Jobs per page.
    pub per_page: u32,
}

impl ToQuery for ListJobsOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("agent_id", &self.agent_id);
        params.push_nonzero("page", &self.page);
        params.push_nonzero("per_page", &self.per_page);
        Ok(params.into_pairs())
    }
}

/// Request payload for scheduling a job.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CreateJobOpts {
    /// Target agent ID.
    pub to: String,
    /// Timeout in seconds, between 1 and [`MAX_JOB_TIMEOUT`].
    pub timeout: u32,
    /// Agent plugin.
    pub agent: String,
    /// Plugin action.
    pub action: String,
    /// Plugin payload.
    pub payload: String,
}

impl ToRequestBody for CreateJobOpts {
    fn to_request_body(&self) -> Result<Value> {
        if self.timeout == 0 {
            return Err(Error::MissingInput("timeout".to_string()));
        }
        if self.timeout > MAX_JOB_TIMEOUT {
            return Err(Error::InvalidInput(format!(
                "timeout must be between 1 and {MAX_JOB_TIMEOUT} seconds"
            )));
        }
        build_request_body(self, None, &["to", "agent", "action", "payload"])
    }
}

/// Response of job creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateJobResult {
    /// UUID of the scheduled job.
    pub request_id: JobId,
}
