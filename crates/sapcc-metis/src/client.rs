//! Asynchronous Metis client implementation.

use crate::models::{
    Domain, IpAddress, ListDomainsOpts, ListIpAddressesOpts, ListProjectsOpts, ListZonesOpts,
    Project, Zone, ITEM_POINTER,
};
use crate::Result;
use sapcc_core::client::{
    CancellationToken, ClientConfig, ServiceClient, ServiceClientBuilder, METIS_DEFAULT_TIMEOUT,
};
use sapcc_core::config::CloudConfig;
use sapcc_core::pagination::{extract_pointer, LinkedPage, Page, Pager};
use sapcc_core::query::{path_segment, url_with_query, ToQuery};
use sapcc_core::types::SapccService;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("sapcc-metis/", env!("CARGO_PKG_VERSION"));

/// Pages of domains.
pub type DomainPage = LinkedPage<Domain>;

/// Pages of projects.
pub type ProjectPage = LinkedPage<Project>;

/// Pages of DNS zones.
pub type ZonePage = LinkedPage<Zone>;

/// Pages of IP addresses.
pub type IpAddressPage = LinkedPage<IpAddress>;

/// Builder for [`MetisClient`].
#[derive(Debug, Clone)]
pub struct MetisClientBuilder {
    inner: ServiceClientBuilder,
}

impl MetisClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SapccService::Metis,
            base_url,
            Duration::from_secs(METIS_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from the Metis entry of a cloud configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no Metis endpoint is configured.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(SapccService::Metis, config)?
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
    pub fn build(self) -> Result<MetisClient> {
        let inner = self.inner.build()?;
        Ok(MetisClient { inner })
    }
}

/// Asynchronous Metis client.
#[derive(Debug, Clone)]
pub struct MetisClient {
    inner: ServiceClient,
}

impl MetisClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        MetisClientBuilder::new(base_url)?.build()
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

    /// List domains, following `nextLink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_domains(&self, opts: &ListDomainsOpts) -> Result<Pager<DomainPage>> {
        self.pager("v1/identity/domain", &opts.to_query()?)
    }

    /// Fetch one domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks `data.item`.
    pub async fn get_domain(&self, id: &str) -> Result<Domain> {
        let id = path_segment("id", id)?;
        self.get_item(&format!("v1/identity/domain/{id}")).await
    }

    /// List projects, following `nextLink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_projects(&self, opts: &ListProjectsOpts) -> Result<Pager<ProjectPage>> {
        self.pager("v1/identity/project", &opts.to_query()?)
    }

    /// Fetch one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks `data.item`.
    pub async fn get_project(&self, id: &str) -> Result<Project> {
        let id = path_segment("id", id)?;
        self.get_item(&format!("v1/identity/project/{id}")).await
    }

    /// List DNS zones, following `nextLink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_zones(&self, opts: &ListZonesOpts) -> Result<Pager<ZonePage>> {
        self.pager("v1/network/dns/zone", &opts.to_query()?)
    }

    /// Fetch one DNS zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks `data.item`.
    pub async fn get_zone(&self, id: &str) -> Result<Zone> {
        let id = path_segment("id", id)?;
        self.get_item(&format!("v1/network/dns/zone/{id}")).await
    }

    /// Look up IP addresses, following `nextLink`.
    ///
    /// # Errors
    ///
    /// Returns [`sapcc_core::Error::MissingInput`] when no address is given.
    pub fn list_ip_addresses(&self, opts: &ListIpAddressesOpts) -> Result<Pager<IpAddressPage>> {
        self.pager("v1/network/ip", &opts.to_query()?)
    }

    fn pager<P: Page>(&self, path: &str, query: &[(&'static str, String)]) -> Result<Pager<P>> {
        let url = url_with_query(self.inner.endpoint(path)?, query);
        Ok(Pager::new(&self.inner, url))
    }

    async fn get_item<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body: Value = self.inner.get_json(path, &[]).await?;
        extract_pointer(&body, ITEM_POINTER)
    }
}
