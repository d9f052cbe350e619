//! Asynchronous Arc client implementation.

use crate::models::{
    Agent, CreateJobOpts, CreateJobResult, GetAgentOpts, InitAgentOpts, InitAgentOutput,
    InitFormat, Job, ListAgentsOpts, ListJobsOpts, Tags,
};
use crate::models::validate_tag_key;
use crate::Result;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use sapcc_core::body::ToRequestBody;
use sapcc_core::client::{
    CancellationToken, ClientConfig, RequestOpts, ServiceClient, ServiceClientBuilder,
    ARC_DEFAULT_TIMEOUT,
};
use sapcc_core::config::CloudConfig;
use sapcc_core::pagination::{MarkerPage, Pager};
use sapcc_core::query::{url_with_query, ToQuery};
use sapcc_core::types::SapccService;
use sapcc_core::uuid::{AgentId, JobId};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("sapcc-arc/", env!("CARGO_PKG_VERSION"));

/// Pages of agents.
pub type AgentPage = MarkerPage<Agent>;

/// Pages of jobs.
pub type JobPage = MarkerPage<Job>;

/// Builder for [`ArcClient`].
#[derive(Debug, Clone)]
pub struct ArcClientBuilder {
    inner: ServiceClientBuilder,
}

impl ArcClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SapccService::Arc,
            base_url,
            Duration::from_secs(ARC_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from the Arc entry of a cloud configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no Arc endpoint is configured.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let builder =
            ServiceClientBuilder::from_config(SapccService::Arc, config)?.with_user_agent(USER_AGENT);
        Ok(Self { inner: builder })
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Configure an X-Auth-Token header.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.with_token(token);
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub fn with_tls_verify(mut self, verify: bool) -> Self {
        self.inner = self.inner.with_tls_verify(verify);
        self
    }

    /// Trust an additional CA certificate.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.inner = self.inner.with_ca_cert(path);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ArcClient> {
        let inner = self.inner.build()?;
        Ok(ArcClient { inner })
    }
}

/// Asynchronous Arc client.
#[derive(Debug, Clone)]
pub struct ArcClient {
    inner: ServiceClient,
}

impl ArcClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        ArcClientBuilder::new(base_url)?.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Return a client whose requests abort once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: self.inner.with_cancellation(token),
        }
    }

    /// List agents, one page per request.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_agents(&self, opts: &ListAgentsOpts) -> Result<Pager<AgentPage>> {
        let url = url_with_query(self.inner.endpoint("agents")?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// Fetch a single agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the agent does not exist.
    pub async fn get_agent(&self, id: AgentId, opts: &GetAgentOpts) -> Result<Agent> {
        let path = format!("agents/{id}");
        self.inner.get_json(&path, &opts.to_query()?).await
    }

    /// Remove an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_agent(&self, id: AgentId) -> Result<()> {
        let path = format!("agents/{id}");
        info!(%id, "deleting agent");
        self.inner.delete(&path).await
    }

    /// Create a registration token for a new agent.
    ///
    /// JSON responses are decoded into [`InitResult`](crate::InitResult);
    /// script formats are returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the JSON does not decode.
    pub async fn init_agent(&self, opts: &InitAgentOpts) -> Result<InitAgentOutput> {
        let url = self.inner.endpoint("agents/init")?;
        let request = RequestOpts::new(&[StatusCode::OK])
            .with_headers(opts.to_headers()?)
            .with_body(opts.to_request_body()?);
        let response = self.inner.request(Method::POST, url, request).await?;

        match opts.accept {
            InitFormat::Json => response.json().map(InitAgentOutput::Json),
            _ => Ok(InitAgentOutput::Script(response.text())),
        }
    }

    /// List the tags of an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_tags(&self, id: AgentId) -> Result<Tags> {
        let path = format!("agents/{id}/tags");
        self.inner.get_json(&path, &[]).await
    }

    /// Add or overwrite tags on an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the tags are invalid or the request fails.
    pub async fn add_tags(&self, id: AgentId, tags: &Tags) -> Result<()> {
        let path = format!("agents/{id}/tags");
        let body = tags.to_request_body()?;
        debug!(%id, count = tags.0.len(), "adding agent tags");
        self.inner
            .send_no_content(Method::POST, &path, &body, &[StatusCode::NO_CONTENT])
            .await
    }

    /// Remove one tag from an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not alphanumeric or the request fails.
    pub async fn delete_tag(&self, id: AgentId, key: &str) -> Result<()> {
        let key = validate_tag_key(key)?;
        let path = format!("agents/{id}/tags/{key}");
        debug!(%id, key, "deleting agent tag");
        self.inner.delete(&path).await
    }

    /// Fetch every fact reported by an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_facts(&self, id: AgentId) -> Result<Map<String, Value>> {
        let path = format!("agents/{id}/facts");
        self.inner.get_json(&path, &[]).await
    }

    /// List jobs, one page per request.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_jobs(&self, opts: &ListJobsOpts) -> Result<Pager<JobPage>> {
        let url = url_with_query(self.inner.endpoint("jobs")?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// Fetch a single job.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the job does not exist.
    pub async fn get_job(&self, id: JobId) -> Result<Job> {
        let path = format!("jobs/{id}");
        self.inner.get_json(&path, &[]).await
    }

    /// Schedule a job on an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or the request fails.
    pub async fn create_job(&self, opts: &CreateJobOpts) -> Result<CreateJobResult> {
        let body = opts.to_request_body()?;
        info!(to = %opts.to, agent = %opts.agent, action = %opts.action, "scheduling job");
        self.inner.post_json("jobs", &body, &[StatusCode::OK]).await
    }

    /// Fetch the combined log output of a job.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_job_log(&self, id: JobId) -> Result<String> {
        let path = format!("jobs/{id}/log");
        self.inner.get_text(&path, HeaderMap::new()).await
    }
}
