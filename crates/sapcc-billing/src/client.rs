//! Asynchronous Billing client implementation.

use crate::models::{
    BillingItem, BillingOpts, Costing, CostingLevel, CostingOpts, Domain, PriceListOpts,
    PriceRecord, Project, UpdateDomainOpts, UpdateProjectOpts,
};
use crate::Result;
use reqwest::StatusCode;
use sapcc_core::body::ToRequestBody;
use sapcc_core::client::{
    CancellationToken, ClientConfig, ServiceClient, ServiceClientBuilder, BILLING_DEFAULT_TIMEOUT,
};
use sapcc_core::config::CloudConfig;
use sapcc_core::pagination::{Pager, SinglePage};
use sapcc_core::query::{path_segment, url_with_query, ToQuery};
use sapcc_core::types::SapccService;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use url::Url;

const USER_AGENT: &str = concat!("sapcc-billing/", env!("CARGO_PKG_VERSION"));

/// Project masterdata, always one page.
pub type ProjectPage = SinglePage<Project>;

/// Domain masterdata, always one page.
pub type DomainPage = SinglePage<Domain>;

/// Price list, always one page.
pub type PricePage = SinglePage<PriceRecord>;

/// Billing report, always one page.
pub type BillingPage = SinglePage<BillingItem>;

/// Costing report, always one page.
pub type CostingPage = SinglePage<Costing>;

/// Builder for [`BillingClient`].
#[derive(Debug, Clone)]
pub struct BillingClientBuilder {
    inner: ServiceClientBuilder,
}

impl BillingClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SapccService::Billing,
            base_url,
            Duration::from_secs(BILLING_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from the Billing entry of a cloud configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no Billing endpoint is configured.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(SapccService::Billing, config)?
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
    pub fn build(self) -> Result<BillingClient> {
        let inner = self.inner.build()?;
        Ok(BillingClient { inner })
    }
}

/// Asynchronous Billing client.
#[derive(Debug, Clone)]
pub struct BillingClient {
    inner: ServiceClient,
}

impl BillingClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        BillingClientBuilder::new(base_url)?.build()
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

    /// List project masterdata visible to the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built.
    pub fn list_projects(&self) -> Result<Pager<ProjectPage>> {
        Ok(Pager::new(
            &self.inner,
            self.inner.endpoint("masterdata/projects")?,
        ))
    }

    /// Fetch the masterdata of one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the project has no masterdata.
    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        let project_id = path_segment("project_id", project_id)?;
        let path = format!("masterdata/projects/{project_id}");
        self.inner.get_json(&path, &[]).await
    }

    /// Update the masterdata of one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_project(
        &self,
        project_id: &str,
        opts: &UpdateProjectOpts,
    ) -> Result<Project> {
        let project_id = path_segment("project_id", project_id)?;
        let path = format!("masterdata/projects/{project_id}");
        let body = opts.to_request_body()?;
        info!(project_id, "updating project masterdata");
        self.inner.put_json(&path, &body, &[StatusCode::OK]).await
    }

    /// List domain masterdata visible to the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built.
    pub fn list_domains(&self) -> Result<Pager<DomainPage>> {
        Ok(Pager::new(
            &self.inner,
            self.inner.endpoint("masterdata/domains")?,
        ))
    }

    /// Fetch the masterdata of one domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the domain has no masterdata.
    pub async fn get_domain(&self, domain_id: &str) -> Result<Domain> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let path = format!("masterdata/domains/{domain_id}");
        self.inner.get_json(&path, &[]).await
    }

    /// Update the masterdata of one domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_domain(&self, domain_id: &str, opts: &UpdateDomainOpts) -> Result<Domain> {
        let domain_id = path_segment("domain_id", domain_id)?;
        let path = format!("masterdata/domains/{domain_id}");
        let body = opts.to_request_body()?;
        info!(domain_id, "updating domain masterdata");
        self.inner.put_json(&path, &body, &[StatusCode::OK]).await
    }

    /// List prices, optionally narrowed to a region and metric.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric type is given without a region.
    pub fn list_prices(&self, opts: &PriceListOpts) -> Result<Pager<PricePage>> {
        let url = url_with_query(self.inner.endpoint(&opts.path()?)?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// List billing report lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_billing(&self, opts: &BillingOpts) -> Result<Pager<BillingPage>> {
        let url = url_with_query(self.inner.endpoint("services/billing")?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// List costing report lines aggregated at `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_costing(
        &self,
        level: CostingLevel,
        opts: &CostingOpts,
    ) -> Result<Pager<CostingPage>> {
        let path = format!("services/costing/{level}");
        let url = url_with_query(self.inner.endpoint(&path)?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }
}
