//! Asynchronous Lyra client implementation.

use crate::models::{
    Automation, CreateAutomationOpts, CreateRunOpts, ListOpts, Run, UpdateAutomationOpts,
};
use crate::Result;
use reqwest::StatusCode;
use sapcc_core::body::ToRequestBody;
use sapcc_core::client::{
    CancellationToken, ClientConfig, ServiceClient, ServiceClientBuilder, LYRA_DEFAULT_TIMEOUT,
};
use sapcc_core::config::CloudConfig;
use sapcc_core::pagination::{MarkerPage, Pager};
use sapcc_core::query::{path_segment, url_with_query, ToQuery};
use sapcc_core::types::SapccService;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("sapcc-lyra/", env!("CARGO_PKG_VERSION"));

/// Pages of automations.
pub type AutomationPage = MarkerPage<Automation>;

/// Pages of runs.
pub type RunPage = MarkerPage<Run>;

/// Builder for [`LyraClient`].
#[derive(Debug, Clone)]
pub struct LyraClientBuilder {
    inner: ServiceClientBuilder,
}

impl LyraClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SapccService::Lyra,
            base_url,
            Duration::from_secs(LYRA_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from the Lyra entry of a cloud configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no Lyra endpoint is configured.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(SapccService::Lyra, config)?
            .with_user_agent(USER_AGENT);
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
    pub fn build(self) -> Result<LyraClient> {
        let inner = self.inner.build()?;
        Ok(LyraClient { inner })
    }
}

/// Asynchronous Lyra client.
#[derive(Debug, Clone)]
pub struct LyraClient {
    inner: ServiceClient,
}

impl LyraClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        LyraClientBuilder::new(base_url)?.build()
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

    /// List automations, one page per request.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_automations(&self, opts: &ListOpts) -> Result<Pager<AutomationPage>> {
        let url = url_with_query(self.inner.endpoint("automations")?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// Fetch a single automation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the automation does not exist.
    pub async fn get_automation(&self, id: &str) -> Result<Automation> {
        let id = path_segment("id", id)?;
        let path = format!("automations/{id}");
        self.inner.get_json(&path, &[]).await
    }

    /// Create an automation.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or the request fails.
    pub async fn create_automation(&self, opts: &CreateAutomationOpts) -> Result<Automation> {
        let body = opts.to_request_body()?;
        info!(name = %opts.name, "creating automation");
        self.inner
            .post_json("automations", &body, &[StatusCode::CREATED])
            .await
    }

    /// Update an automation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_automation(
        &self,
        id: &str,
        opts: &UpdateAutomationOpts,
    ) -> Result<Automation> {
        let id = path_segment("id", id)?;
        let path = format!("automations/{id}");
        let body = opts.to_request_body()?;
        debug!(id, "updating automation");
        self.inner.put_json(&path, &body, &[StatusCode::OK]).await
    }

    /// Delete an automation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_automation(&self, id: &str) -> Result<()> {
        let id = path_segment("id", id)?;
        let path = format!("automations/{id}");
        info!(id, "deleting automation");
        self.inner.delete(&path).await
    }

    /// List runs, one page per request.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_runs(&self, opts: &ListOpts) -> Result<Pager<RunPage>> {
        let url = url_with_query(self.inner.endpoint("runs")?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// Fetch a single run.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the run does not exist.
    pub async fn get_run(&self, id: &str) -> Result<Run> {
        let id = path_segment("id", id)?;
        let path = format!("runs/{id}");
        self.inner.get_json(&path, &[]).await
    }

    /// Start a run of an automation.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or the request fails.
    pub async fn create_run(&self, opts: &CreateRunOpts) -> Result<Run> {
        let body = opts.to_request_body()?;
        info!(automation = %opts.automation_id, "starting run");
        self.inner.post_json("runs", &body, &[StatusCode::CREATED]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AutomationType, RunState};
    use sapcc_core::pagination::PAGINATION_PAGES_HEADER;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn automation_json(id: &str) -> Value {
        json!({
            "id": id,
            "name": "nginx",
            "type": "Chef",
            "project_id": "p-1",
            "repository": "https://github.com/example/cookbooks.git",
            "repository_revision": "master",
            "repository_authentication_enabled": false,
            "timeout": 3600,
            "tags": {},
            "run_list": ["recipe[nginx]"],
            "chef_attributes": {"nginx": {"port": 8080}},
            "log_level": "info",
            "debug": false,
            "chef_version": "17.10.3",
            "created_at": "2024-01-10T09:00:00Z",
            "updated_at": "2024-01-10T09:00:00Z"
        })
    }

    fn run_json(state: &str) -> Value {
        json!({
            "id": "7",
            "automation_id": "42",
            "automation_name": "nginx",
            "selector": "@identity='web-01'",
            "project_id": "p-1",
            "state": state,
            "log": "Selecting nodes using filter @identity='web-01'",
            "jobs": ["0c1f3c2e-7f60-4c4c-9a5e-3a8a1f0f7e21"],
            "repository_revision": "a1b2c3",
            "owner": {"id": "u-1", "name": "jane", "domain_id": "d-1", "domain_name": "monsoon3"},
            "created_at": "2024-01-10T09:00:00Z",
            "updated_at": "2024-01-10T09:01:00Z"
        })
    }

    fn client(server: &MockServer) -> LyraClient {
        LyraClientBuilder::new(server.uri())
            .unwrap()
            .with_token("token")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn list_automations_pages_through_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/automations"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(PAGINATION_PAGES_HEADER, "2")
                    .set_body_json(json!([automation_json("43")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/automations"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(PAGINATION_PAGES_HEADER, "2")
                    .set_body_json(json!([automation_json("42")])),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let automations = client
            .list_automations(&ListOpts::default())
            .unwrap()
            .all_items()
            .await
            .unwrap();
        let ids: Vec<&str> = automations.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["42", "43"]);
        assert_eq!(automations[0].automation_type, AutomationType::Chef);
    }

    #[tokio::test]
    async fn create_automation_expects_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/automations"))
            .and(body_json(json!({
                "name": "nginx",
                "type": "Chef",
                "repository": "https://github.com/example/cookbooks.git",
                "run_list": ["recipe[nginx]"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(automation_json("42")))
            .mount(&server)
            .await;

        let client = client(&server);
        let mut opts = CreateAutomationOpts::new(
            "nginx",
            AutomationType::Chef,
            "https://github.com/example/cookbooks.git",
        );
        opts.run_list = Some(vec!["recipe[nginx]".to_string()]);
        let automation = client.create_automation(&opts).await.unwrap();
        assert_eq!(automation.id, "42");
        assert_eq!(automation.chef_version.as_deref(), Some("17.10.3"));
    }

    #[tokio::test]
    async fn update_automation_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/automations/42"))
            .and(body_json(json!({"repository_revision": ""})))
            .respond_with(ResponseTemplate::new(200).set_body_json(automation_json("42")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client
            .update_automation(
                "42",
                &UpdateAutomationOpts {
                    repository_revision: Some(String::new()),
                    ..UpdateAutomationOpts::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_and_get_automation() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/automations/42"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/automations/42"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let client = client(&server);
        client.delete_automation("42").await.unwrap();
        let err = client.get_automation("42").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn runs_create_get_and_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/runs"))
            .and(body_json(json!({"automation_id": "42", "selector": "@identity='web-01'"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(run_json("preparing")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/runs/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_json("completed")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/runs"))
            .and(query_param("per_page", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([run_json("failed")])))
            .mount(&server)
            .await;

        let client = client(&server);
        let run = client
            .create_run(&CreateRunOpts {
                automation_id: "42".to_string(),
                selector: "@identity='web-01'".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(run.state, RunState::Preparing);

        let run = client.get_run("7").await.unwrap();
        assert_eq!(run.state, RunState::Completed);
        assert_eq!(run.owner.name, "jane");

        let runs = client
            .list_runs(&ListOpts {
                page: 0,
                per_page: 5,
            })
            .unwrap()
            .all_items()
            .await
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].state, RunState::Failed);
    }
}
