//! Asynchronous Hermes client implementation.

use crate::models::{AttributeOpts, Event, EventPage, ListEventsOpts};
use crate::Result;
use sapcc_core::client::{
    CancellationToken, ClientConfig, ServiceClient, ServiceClientBuilder, HERMES_DEFAULT_TIMEOUT,
};
use sapcc_core::config::CloudConfig;
use sapcc_core::pagination::Pager;
use sapcc_core::query::{url_with_query, ToQuery};
use sapcc_core::types::SapccService;
use sapcc_core::uuid::EventId;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("sapcc-hermes/", env!("CARGO_PKG_VERSION"));

/// Builder for [`HermesClient`].
#[derive(Debug, Clone)]
pub struct HermesClientBuilder {
    inner: ServiceClientBuilder,
}

impl HermesClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SapccService::Hermes,
            base_url,
            Duration::from_secs(HERMES_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from the Hermes entry of a cloud configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no Hermes endpoint is configured.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(SapccService::Hermes, config)?
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
    pub fn build(self) -> Result<HermesClient> {
        let inner = self.inner.build()?;
        Ok(HermesClient { inner })
    }
}

/// Asynchronous Hermes client.
#[derive(Debug, Clone)]
pub struct HermesClient {
    inner: ServiceClient,
}

impl HermesClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        HermesClientBuilder::new(base_url)?.build()
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

    /// List events matching the filters, following `next` links.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be encoded.
    pub fn list_events(&self, opts: &ListEventsOpts) -> Result<Pager<EventPage>> {
        let url = url_with_query(self.inner.endpoint("v1/events")?, &opts.to_query()?);
        Ok(Pager::new(&self.inner, url))
    }

    /// Fetch a single event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the event does not exist.
    pub async fn get_event(&self, id: EventId) -> Result<Event> {
        let path = format!("v1/events/{id}");
        self.inner.get_json(&path, &[]).await
    }

    /// List the distinct values of an event attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the request fails.
    pub async fn list_attribute_values(&self, opts: &AttributeOpts) -> Result<Vec<String>> {
        let path = opts.path()?;
        self.inner.get_json(&path, &opts.to_query()?).await
    }
}
