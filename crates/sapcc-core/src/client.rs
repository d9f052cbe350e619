//! HTTP service client shared by every service crate.
//!
//! [`ServiceClient`] owns the base URL, the auth token and the `reqwest`
//! client. Each call names the status codes it accepts; any other status is
//! an [`Error::UnexpectedStatus`]. Requests are sent once: transient failures
//! go straight back to the caller.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
pub use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::config::CloudConfig;
use crate::error::{Error, Result};
use crate::types::SapccService;

// Service-specific timeout configurations (in seconds)

/// Default timeout for Arc requests
pub const ARC_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for Lyra requests
pub const LYRA_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for Hermes requests (event searches can be slow)
pub const HERMES_DEFAULT_TIMEOUT: u64 = 60;

/// Default timeout for Billing requests
pub const BILLING_DEFAULT_TIMEOUT: u64 = 60;

/// Default timeout for Limes requests
pub const LIMES_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for Metis requests
pub const METIS_DEFAULT_TIMEOUT: u64 = 20;

/// Default timeout for Neutron BGPVPN requests
pub const BGPVPN_DEFAULT_TIMEOUT: u64 = 20;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Header carrying the keystone token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Default timeout in seconds for a service.
#[must_use]
pub const fn default_timeout(service: SapccService) -> u64 {
    match service {
        SapccService::Arc => ARC_DEFAULT_TIMEOUT,
        SapccService::Lyra => LYRA_DEFAULT_TIMEOUT,
        SapccService::Hermes => HERMES_DEFAULT_TIMEOUT,
        SapccService::Billing => BILLING_DEFAULT_TIMEOUT,
        SapccService::Limes => LIMES_DEFAULT_TIMEOUT,
        SapccService::Metis => METIS_DEFAULT_TIMEOUT,
        SapccService::Bgpvpn => BGPVPN_DEFAULT_TIMEOUT,
    }
}

/// HTTP client configuration.
///
/// Configures timeouts, connection pooling and compression of the
/// underlying `reqwest` client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call request options.
#[derive(Debug, Clone)]
pub struct RequestOpts<'a> {
    /// Query pairs appended to the URL
    pub query: &'a [(&'static str, String)],
    /// Extra headers
    pub headers: HeaderMap,
    /// JSON body
    pub body: Option<serde_json::Value>,
    /// Status codes accepted as success
    pub ok_codes: &'a [StatusCode],
}

impl<'a> RequestOpts<'a> {
    /// Options accepting the given status codes and nothing else set.
    #[must_use]
    pub fn new(ok_codes: &'a [StatusCode]) -> Self {
        Self {
            query: &[],
            headers: HeaderMap::new(),
            body: None,
            ok_codes,
        }
    }

    /// Attach query pairs.
    #[must_use]
    pub fn with_query(mut self, query: &'a [(&'static str, String)]) -> Self {
        self.query = query;
        self
    }

    /// Attach extra headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response whose status was accepted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// URL the request was sent to
    pub url: Url,
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl RawResponse {
    /// Decode the body as JSON.
    ///
    /// An empty body decodes as JSON `null`, so only types accepting `null`
    /// succeed on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty() {
            return serde_json::from_value(serde_json::Value::Null).map_err(|err| {
                Error::DecodeError(format!("empty response from {}: {err}", self.url))
            });
        }
        serde_json::from_slice(&self.body)
            .map_err(|err| Error::DecodeError(format!("response from {}: {err}", self.url)))
    }

    /// Return the body as text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Return a header value as a string, if present and printable.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    service: SapccService,
    base_url: Url,
    http_config: ClientConfig,
    user_agent: Option<String>,
    token: Option<SecretString>,
    tls_verify: bool,
    ca_cert: Option<std::path::PathBuf>,
}

impl ServiceClientBuilder {
    /// Create a builder for `service` at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the URL does not parse.
    pub fn new(service: SapccService, base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url.as_ref())?;
        Ok(Self {
            service,
            base_url,
            http_config: ClientConfig::new().with_timeout(timeout),
            user_agent: None,
            token: None,
            tls_verify: true,
            ca_cert: None,
        })
    }

    /// Create a builder from the service's entry in a [`CloudConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the service has no endpoint.
    pub fn from_config(service: SapccService, config: &CloudConfig) -> Result<Self> {
        let endpoint = config.endpoint(service)?;
        let timeout = endpoint.timeout().unwrap_or_else(|| config.timeout());
        let mut builder = Self::new(service, &endpoint.url, timeout)?.with_tls_verify(config.tls_verify);
        if let Some(token) = &config.token {
            builder.token = Some(token.clone());
        }
        if let Some(ca_cert) = &config.tls_ca_cert {
            builder = builder.with_ca_cert(ca_cert.clone());
        }
        Ok(builder)
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Configure an X-Auth-Token header.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Trust an additional CA certificate (PEM).
    #[must_use]
    pub fn with_ca_cert(mut self, path: std::path::PathBuf) -> Self {
        self.ca_cert = Some(path);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the CA certificate cannot be loaded or
    /// the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ServiceClient> {
        let config = &self.http_config;
        let mut builder = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .gzip(config.enable_compression);

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        if !self.tls_verify {
            warn!(service = %self.service, "TLS verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &self.ca_cert {
            debug!("loading CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::ConfigError(format!("Invalid CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build {} HTTP client: {err}", self.service))
        })?;

        Ok(ServiceClient {
            service: self.service,
            http,
            base_url: self.base_url,
            token: self.token,
            cancellation: None,
        })
    }
}

/// Authenticated HTTP client for one service endpoint.
#[derive(Clone)]
pub struct ServiceClient {
    service: SapccService,
    http: Client,
    base_url: Url,
    token: Option<SecretString>,
    cancellation: Option<CancellationToken>,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url.as_str())
            .field("cancellable", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}

impl ServiceClient {
    /// Return the service this client talks to.
    #[must_use]
    pub const fn service(&self) -> SapccService {
        self.service
    }

    /// Return the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return a clone of this client whose requests abort once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut client = self.clone();
        client.cancellation = Some(token);
        client
    }

    /// Resolve a path relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let normalized = path.strip_prefix('/').unwrap_or(path);
        self.base_url.join(normalized).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid {} path `{path}`: {err}", self.service))
        })
    }

    /// Send one request and check its status against `opts.ok_codes`.
    ///
    /// # Errors
    ///
    /// Returns a transport error, [`Error::Cancelled`], or
    /// [`Error::UnexpectedStatus`] carrying the status and body verbatim.
    pub async fn request(&self, method: Method, url: Url, opts: RequestOpts<'_>) -> Result<RawResponse> {
        let mut request = self.http.request(method.clone(), url.clone());
        if !opts.query.is_empty() {
            request = request.query(opts.query);
        }
        if let Some(token) = &self.token {
            request = request.header(AUTH_TOKEN_HEADER, token.expose_secret());
        }
        let mut headers = opts.headers;
        headers
            .entry(ACCEPT)
            .or_insert(HeaderValue::from_static("application/json"));
        request = request.headers(headers);
        if let Some(body) = &opts.body {
            request = request.json(body);
        }

        let request = request.build()?;
        let url = request.url().clone();
        debug!(service = %self.service, %method, %url, "sending request");

        let exchange = self.exchange(request);
        let (status, headers, body) = match &self.cancellation {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    return Err(Error::Cancelled(format!("{method} {url}")));
                }
                exchange = exchange => exchange?,
            },
            None => exchange.await?,
        };

        if !opts.ok_codes.contains(&status) {
            debug!(service = %self.service, %method, %url, %status, "unexpected status");
            return Err(Error::UnexpectedStatus {
                service: self.service.name().to_string(),
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                expected: opts.ok_codes.iter().map(StatusCode::as_u16).collect(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(RawResponse {
            url,
            status,
            headers,
            body,
        })
    }

    /// Send `request` and read the whole body.
    async fn exchange(&self, request: reqwest::Request) -> Result<(StatusCode, HeaderMap, Bytes)> {
        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| {
            Error::HttpError(format!("Failed to read {} response body: {err}", self.service))
        })?;
        Ok((status, headers, body))
    }

    /// GET a path and decode the JSON response (expects 200).
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`] and [`RawResponse::json`].
    pub async fn get_json<T>(&self, path: &str, query: &[(&'static str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.request(Method::GET, url, RequestOpts::new(&[StatusCode::OK]).with_query(query))
            .await?
            .json()
    }

    /// GET a path and return the body as text (expects 200).
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`].
    pub async fn get_text(&self, path: &str, headers: HeaderMap) -> Result<String> {
        let url = self.endpoint(path)?;
        let mut opts = RequestOpts::new(&[StatusCode::OK]).with_headers(headers);
        opts.headers
            .entry(ACCEPT)
            .or_insert(HeaderValue::from_static("text/plain"));
        Ok(self.request(Method::GET, url, opts).await?.text())
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`] and [`RawResponse::json`].
    pub async fn post_json<B, R>(&self, path: &str, body: &B, ok_codes: &[StatusCode]) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body, ok_codes).await
    }

    /// PUT a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`] and [`RawResponse::json`].
    pub async fn put_json<B, R>(&self, path: &str, body: &B, ok_codes: &[StatusCode]) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body, ok_codes).await
    }

    /// Send a JSON body and ignore the response body.
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`].
    pub async fn send_no_content<B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        ok_codes: &[StatusCode],
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let body = serde_json::to_value(body)
            .map_err(|err| Error::InvalidInput(format!("cannot encode request body: {err}")))?;
        self.request(method, url, RequestOpts::new(ok_codes).with_body(body))
            .await
            .map(|_| ())
    }

    /// DELETE a path (expects 204).
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`].
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        self.request(Method::DELETE, url, RequestOpts::new(&[StatusCode::NO_CONTENT]))
            .await
            .map(|_| ())
    }

    async fn send_json<B, R>(&self, method: Method, path: &str, body: &B, ok_codes: &[StatusCode]) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let body = serde_json::to_value(body)
            .map_err(|err| Error::InvalidInput(format!("cannot encode request body: {err}")))?;
        self.request(method, url, RequestOpts::new(ok_codes).with_body(body))
            .await?
            .json()
    }
}

/// Parse a base URL and make sure it ends with a slash so that relative
/// paths join below it instead of replacing its last segment.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|err| Error::InvalidEndpoint(format!("Invalid base URL `{raw}`: {err}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
