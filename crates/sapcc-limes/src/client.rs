//! Asynchronous Limes client implementation.

use crate::models::{
    ClusterRateReport, ClusterReport, DomainReport, ProjectRateReport, ProjectReport, RateOpts,
    ReportOpts, UpdateProjectQuotaOpts,
};
use crate::Result;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use sapcc_core::body::ToRequestBody;
use sapcc_core::client::{
    CancellationToken, ClientConfig, RequestOpts, ServiceClient, ServiceClientBuilder,
    LIMES_DEFAULT_TIMEOUT,
};
use sapcc_core::config::CloudConfig;
use sapcc_core::pagination::{extract_field, Pager, SinglePage};
use sapcc_core::query::{path_segment, url_with_query, ToQuery};
use sapcc_core::types::SapccService;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("sapcc-limes/", env!("CARGO_PKG_VERSION"));

/// All domains of a cluster in one response.
pub type DomainPage = SinglePage<DomainReport>;

/// All projects of a domain in one response.
pub type ProjectPage = SinglePage<ProjectReport>;

/// Rates of all projects of a domain in one response.
pub type ProjectRatePage = SinglePage<ProjectRateReport>;

/// Builder for [`LimesClient`].
#[derive(Debug, Clone)]
pub struct LimesClientBuilder {
    inner: ServiceClientBuilder,
}

impl LimesClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SapccService::Limes,
            base_url,
            Duration::from_secs(LIMES_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from the Limes entry of a cloud configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no Limes endpoint is configured.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(SapccService::Limes, config)?
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
    pub fn build(self) -> Result<LimesClient> {
        let inner = self.inner.build()?;
        Ok(LimesClient { inner })
    }
}

/// Asynchronous Limes client.
#[derive(Debug, Clone)]
pub struct LimesClient {
    inner: ServiceClient,
}

impl LimesClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        LimesClientBuilder::new(base_url)?.build()
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

    // Resources

    /// Fetch the capacity report of the current cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks `cluster`.
    pub async fn get_cluster(&self, opts: &ReportOpts) -> Result<ClusterReport> {
        self.get_enveloped(
            "v1/clusters/current",
            &opts.to_query()?,
            opts.to_headers()?,
            "cluster",
        )
        .await
    }

    /// List the reports of every domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_domains(&self, opts: &ReportOpts) -> Result<Pager<DomainPage>> {
        let url = url_with_query(self.inner.endpoint("v1/domains")?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url).with_headers(opts.to_headers()?))
    }

    /// Fetch the report of one domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks `domain`.
    pub async fn get_domain(&self, domain_id: &str, opts: &ReportOpts) -> Result<DomainReport> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let path = format!("v1/domains/{domain_id}");
        self.get_enveloped(&path, &opts.to_query()?, opts.to_headers()?, "domain")
            .await
    }

    /// List the reports of every project in a domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_projects(&self, domain_id: &str, opts: &ReportOpts) -> Result<Pager<ProjectPage>> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let path = format!("v1/domains/{domain_id}/projects");
        let url = url_with_query(self.inner.endpoint(&path)?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url).with_headers(opts.to_headers()?))
    }

    /// Fetch the report of one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks `project`.
    pub async fn get_project(
        &self,
        domain_id: &str,
        project_id: &str,
        opts: &ReportOpts,
    ) -> Result<ProjectReport> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let project_id = path_segment("project_id", project_id)?;
        let path = format!("v1/domains/{domain_id}/projects/{project_id}");
        self.get_enveloped(&path, &opts.to_query()?, opts.to_headers()?, "project")
            .await
    }

    /// Change project quotas. Limes applies the change asynchronously.
    ///
    /// # Errors
    ///
    /// Returns an error if no service is given or the request is rejected.
    pub async fn update_project_quota(
        &self,
        domain_id: &str,
        project_id: &str,
        opts: &UpdateProjectQuotaOpts,
    ) -> Result<()> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let project_id = path_segment("project_id", project_id)?;
        let path = format!("v1/domains/{domain_id}/projects/{project_id}");
        let body = opts.to_request_body()?;
        info!(
            domain_id,
            project_id,
            services = opts.services.len(),
            "updating project quota"
        );
        self.inner
            .send_no_content(Method::PUT, &path, &body, &[StatusCode::ACCEPTED])
            .await
    }

    /// Ask Limes to scrape a project ahead of schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    pub async fn sync_project(&self, domain_id: &str, project_id: &str) -> Result<()> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let project_id = path_segment("project_id", project_id)?;
        let path = format!("v1/domains/{domain_id}/projects/{project_id}/sync");
        let url = self.inner.endpoint(&path)?;
        debug!(domain_id, project_id, "requesting project sync");
        self.inner
            .request(Method::POST, url, RequestOpts::new(&[StatusCode::ACCEPTED]))
            .await
            .map(|_| ())
    }

    // Rates

    /// Fetch the default rate limits of the current cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks `cluster`.
    pub async fn get_cluster_rates(&self, opts: &RateOpts) -> Result<ClusterRateReport> {
        self.get_enveloped(
            "rates/v1/clusters/current",
            &opts.to_query()?,
            HeaderMap::new(),
            "cluster",
        )
        .await
    }

    /// List the rates of every project in a domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_project_rates(
        &self,
        domain_id: &str,
        opts: &RateOpts,
    ) -> Result<Pager<ProjectRatePage>> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let path = format!("rates/v1/domains/{domain_id}/projects");
        let url = url_with_query(self.inner.endpoint(&path)?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// Fetch the rates of one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks `project`.
    pub async fn get_project_rates(
        &self,
        domain_id: &str,
        project_id: &str,
        opts: &RateOpts,
    ) -> Result<ProjectRateReport> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let project_id = path_segment("project_id", project_id)?;
        let path = format!("rates/v1/domains/{domain_id}/projects/{project_id}");
        self.get_enveloped(&path, &opts.to_query()?, HeaderMap::new(), "project")
            .await
    }

    async fn get_enveloped<T>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        headers: HeaderMap,
        key: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.inner.endpoint(path)?;
        let opts = RequestOpts::new(&[StatusCode::OK])
            .with_query(query)
            .with_headers(headers);
        let body: Value = self.inner.request(Method::GET, url, opts).await?.json()?;
        extract_field(&body, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceQuota, ServiceQuota, CLUSTER_ID_HEADER};
    use sapcc_core::Error;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn project_json(id: &str) -> Value {
        json!({
            "id": id,
            "name": "web",
            "parent_id": "d-1",
            "bursting": {"enabled": true, "multiplier": 0.2},
            "services": [{
                "type": "compute",
                "area": "compute",
                "resources": [
                    {"name": "cores", "quota": 20, "usable_quota": 24, "usage": 22, "burst_usage": 2},
                    {"name": "ram", "unit": "MiB", "quota": 40960, "usage": 8192}
                ],
                "scraped_at": 1_700_000_000
            }]
        })
    }

    fn client(server: &MockServer) -> LimesClient {
        LimesClientBuilder::new(server.uri())
            .unwrap()
            .with_token("token")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn get_cluster_sends_filters_and_cluster_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/clusters/current"))
            .and(query_param("service", "compute"))
            .and(query_param("detail", ""))
            .and(header(CLUSTER_ID_HEADER, "ccloud"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cluster": {
                    "id": "ccloud",
                    "services": [{
                        "type": "compute",
                        "area": "compute",
                        "resources": [{"name": "cores", "capacity": 1000, "domains_quota": 800, "usage": 120}],
                        "max_scraped_at": 1_700_000_100,
                        "min_scraped_at": 1_700_000_000
                    }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let cluster = client
            .get_cluster(&ReportOpts {
                services: vec!["compute".to_string()],
                detail: true,
                cluster_id: "ccloud".to_string(),
                ..ReportOpts::default()
            })
            .await
            .unwrap();
        assert_eq!(cluster.id, "ccloud");
        assert_eq!(cluster.services[0].resources[0].capacity, Some(1000));
    }

    #[tokio::test]
    async fn list_projects_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/domains/d-1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [project_json("p-1"), project_json("p-2")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let projects = client
            .list_projects("d-1", &ReportOpts::default())
            .unwrap()
            .all_items()
            .await
            .unwrap();
        assert_eq!(projects.len(), 2);
        let cores = &projects[0].services[0].resources[0];
        assert_eq!(cores.usable_quota, Some(24));
        assert_eq!(cores.burst_usage, Some(2));
    }

    #[tokio::test]
    async fn list_domains_forwards_cluster_header_to_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/domains"))
            .and(header(CLUSTER_ID_HEADER, "other"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "domains": [{"id": "d-1", "name": "monsoon3", "services": []}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let domains = client
            .list_domains(&ReportOpts {
                cluster_id: "other".to_string(),
                ..ReportOpts::default()
            })
            .unwrap()
            .all_items()
            .await
            .unwrap();
        assert_eq!(domains[0].name, "monsoon3");
    }

    #[tokio::test]
    async fn get_project_missing_envelope_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/domains/d-1/projects/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p-1")))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client
            .get_project("d-1", "p-1", &ReportOpts::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }

    #[tokio::test]
    async fn update_quota_expects_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/domains/d-1/projects/p-1"))
            .and(body_json(json!({"project": {"services": [{
                "type": "compute",
                "resources": [{"name": "cores", "quota": 40}]
            }]}})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let opts = UpdateProjectQuotaOpts {
            services: vec![ServiceQuota {
                service_type: "compute".to_string(),
                resources: vec![ResourceQuota {
                    name: "cores".to_string(),
                    quota: 40,
                    unit: None,
                }],
            }],
        };
        client.update_project_quota("d-1", "p-1", &opts).await.unwrap();
    }

    #[tokio::test]
    async fn sync_project_rejects_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/domains/d-1/projects/p-1/sync"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client.sync_project("d-1", "p-1").await.unwrap_err();
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn cluster_rates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates/v1/clusters/current"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cluster": {
                    "id": "ccloud",
                    "services": [{
                        "type": "compute",
                        "area": "compute",
                        "rates": [{"name": "instance/create", "limit": 10, "window": "1m"}]
                    }]
                }
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let report = client.get_cluster_rates(&RateOpts::default()).await.unwrap();
        let rate = &report.services[0].rates[0];
        assert_eq!(rate.limit, Some(10));
        assert_eq!(rate.window.as_deref(), Some("1m"));
    }

    #[tokio::test]
    async fn project_rates_single_and_list() {
        let server = MockServer::start().await;
        let project = json!({
            "id": "p-1",
            "services": [{"type": "compute", "rates": [{"name": "instance/create", "usage_as_bigint": "3"}]}]
        });
        Mock::given(method("GET"))
            .and(path("/rates/v1/domains/d-1/projects/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"project": project})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rates/v1/domains/d-1/projects"))
            .and(query_param("area", "compute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": [project]})))
            .mount(&server)
            .await;

        let client = client(&server);
        let single = client
            .get_project_rates("d-1", "p-1", &RateOpts::default())
            .await
            .unwrap();
        let listed = client
            .list_project_rates(
                "d-1",
                &RateOpts {
                    areas: vec!["compute".to_string()],
                    ..RateOpts::default()
                },
            )
            .unwrap()
            .all_items()
            .await
            .unwrap();
        assert_eq!(listed, vec![single]);
    }
}
