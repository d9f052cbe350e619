//! Asynchronous BGPVPN interconnection client implementation.

use crate::models::{
    CreateInterconnectionOpts, Interconnection, InterconnectionPage, ListInterconnectionsOpts,
    UpdateInterconnectionOpts,
};
use crate::Result;
use reqwest::StatusCode;
use sapcc_core::body::ToRequestBody;
use sapcc_core::client::{
    CancellationToken, ClientConfig, ServiceClient, ServiceClientBuilder, BGPVPN_DEFAULT_TIMEOUT,
};
use sapcc_core::config::CloudConfig;
use sapcc_core::pagination::{extract_field, Pager};
use sapcc_core::query::{url_with_query, ToQuery};
use sapcc_core::types::SapccService;
use sapcc_core::uuid::InterconnectionId;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("sapcc-bgpvpn/", env!("CARGO_PKG_VERSION"));

const INTERCONNECTIONS_PATH: &str = "v2.0/interconnection/interconnections";

/// Builder for [`BgpvpnClient`].
#[derive(Debug, Clone)]
pub struct BgpvpnClientBuilder {
    inner: ServiceClientBuilder,
}

impl BgpvpnClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SapccService::Bgpvpn,
            base_url,
            Duration::from_secs(BGPVPN_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from the BGPVPN entry of a cloud configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no BGPVPN endpoint is configured.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(SapccService::Bgpvpn, config)?
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
    pub fn build(self) -> Result<BgpvpnClient> {
        let inner = self.inner.build()?;
        Ok(BgpvpnClient { inner })
    }
}

/// Asynchronous BGPVPN interconnection client.
#[derive(Debug, Clone)]
pub struct BgpvpnClient {
    inner: ServiceClient,
}

impl BgpvpnClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        BgpvpnClientBuilder::new(base_url)?.build()
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

    /// List interconnections, continuing by marker when `limit` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_interconnections(
        &self,
        opts: &ListInterconnectionsOpts,
    ) -> Result<Pager<InterconnectionPage>> {
        let url = url_with_query(self.inner.endpoint(INTERCONNECTIONS_PATH)?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// Fetch one interconnection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the interconnection does not exist.
    pub async fn get_interconnection(&self, id: InterconnectionId) -> Result<Interconnection> {
        let path = format!("{INTERCONNECTIONS_PATH}/{id}");
        let body: Value = self.inner.get_json(&path, &[]).await?;
        extract_field(&body, "interconnection")
    }

    /// Create an interconnection.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or the request fails.
    pub async fn create_interconnection(
        &self,
        opts: &CreateInterconnectionOpts,
    ) -> Result<Interconnection> {
        let body = opts.to_request_body()?;
        info!(
            local = %opts.local_resource_id,
            remote = %opts.remote_resource_id,
            region = %opts.remote_region,
            "creating interconnection"
        );
        let response: Value = self
            .inner
            .post_json(INTERCONNECTIONS_PATH, &body, &[StatusCode::CREATED])
            .await?;
        extract_field(&response, "interconnection")
    }

    /// Update an interconnection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_interconnection(
        &self,
        id: InterconnectionId,
        opts: &UpdateInterconnectionOpts,
    ) -> Result<Interconnection> {
        let path = format!("{INTERCONNECTIONS_PATH}/{id}");
        let body = opts.to_request_body()?;
        debug!(%id, "updating interconnection");
        let response: Value = self.inner.put_json(&path, &body, &[StatusCode::OK]).await?;
        extract_field(&response, "interconnection")
    }

    /// Delete an interconnection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_interconnection(&self, id: InterconnectionId) -> Result<()> {
        let path = format!("{INTERCONNECTIONS_PATH}/{id}");
        info!(%id, "deleting interconnection");
        self.inner.delete(&path).await
    }
}
