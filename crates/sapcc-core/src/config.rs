//! Configuration structures for service clients.
//!
//! A [`CloudConfig`] names the region, an already-issued token and one
//! endpoint per service. Service client builders pick their own endpoint out
//! of it.

use crate::types::SapccService;
use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Configuration for a set of service clients in one region.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CloudConfig {
    /// Region name, e.g. `eu-de-1`
    #[validate(length(min = 1))]
    pub region: String,

    /// Keystone token sent as `X-Auth-Token`
    #[serde(default, skip_serializing)]
    pub token: Option<SecretString>,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to custom CA certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Service endpoints
    #[validate(nested)]
    #[serde(default)]
    pub services: ServiceEndpoints,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl CloudConfig {
    /// Create a new configuration for a region.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn new(region: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            region: region.into(),
            token: None,
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            request_timeout_secs: default_request_timeout_secs(),
            services: ServiceEndpoints::default(),
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Load and validate a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or fails validation.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        Ok(config)
    }

    /// Set the token used for authentication.
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

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: std::path::PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the endpoint of one service.
    #[must_use]
    pub fn with_endpoint(mut self, service: SapccService, endpoint: ServiceEndpointConfig) -> Self {
        self.services.set(service, endpoint);
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Return the endpoint configured for `service`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if no endpoint is configured.
    pub fn endpoint(&self, service: SapccService) -> Result<&ServiceEndpointConfig, Error> {
        self.services.get(service).ok_or_else(|| {
            Error::ConfigError(format!(
                "No {service} endpoint configured for region {}",
                self.region
            ))
        })
    }
}

/// Static service endpoint configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ServiceEndpoints {
    /// Arc endpoint
    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc: Option<ServiceEndpointConfig>,

    /// Lyra endpoint
    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyra: Option<ServiceEndpointConfig>,

    /// Hermes endpoint
    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hermes: Option<ServiceEndpointConfig>,

    /// Billing endpoint
    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<ServiceEndpointConfig>,

    /// Limes endpoint
    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limes: Option<ServiceEndpointConfig>,

    /// Metis endpoint
    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metis: Option<ServiceEndpointConfig>,

    /// Neutron endpoint serving the BGPVPN extension
    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgpvpn: Option<ServiceEndpointConfig>,
}

impl ServiceEndpoints {
    /// Return the endpoint for a service, if configured.
    #[must_use]
    pub const fn get(&self, service: SapccService) -> Option<&ServiceEndpointConfig> {
        match service {
            SapccService::Arc => self.arc.as_ref(),
            SapccService::Lyra => self.lyra.as_ref(),
            SapccService::Hermes => self.hermes.as_ref(),
            SapccService::Billing => self.billing.as_ref(),
            SapccService::Limes => self.limes.as_ref(),
            SapccService::Metis => self.metis.as_ref(),
            SapccService::Bgpvpn => self.bgpvpn.as_ref(),
        }
    }

    /// Set the endpoint for a service.
    pub fn set(&mut self, service: SapccService, endpoint: ServiceEndpointConfig) {
        let slot = match service {
            SapccService::Arc => &mut self.arc,
            SapccService::Lyra => &mut self.lyra,
            SapccService::Hermes => &mut self.hermes,
            SapccService::Billing => &mut self.billing,
            SapccService::Limes => &mut self.limes,
            SapccService::Metis => &mut self.metis,
            SapccService::Bgpvpn => &mut self.bgpvpn,
        };
        *slot = Some(endpoint);
    }
}

/// Configuration for a single service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceEndpointConfig {
    /// Service base URL
    #[validate(url)]
    pub url: String,

    /// Optional timeout override for this service (in seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_override_secs: Option<u64>,
}

impl ServiceEndpointConfig {
    /// Create a new service endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            url: url.into(),
            timeout_override_secs: None,
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid endpoint configuration: {e}")))?;

        Ok(config)
    }

    /// Set timeout override in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_override_secs = Some(seconds);
        self
    }

    /// Get the timeout as a Duration, if set.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_override_secs.map(Duration::from_secs)
    }

    /// Parse and validate the URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_url(&self) -> Result<Url, Error> {
        Url::parse(&self.url).map_err(|e| Error::ConfigError(format!("Invalid service URL: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_cloud_config_new() {
        let config = CloudConfig::new("eu-de-1").unwrap();
        assert_eq!(config.region, "eu-de-1");
        assert!(config.tls_verify);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_cloud_config_rejects_empty_region() {
        assert!(CloudConfig::new("").is_err());
    }

    #[test]
    fn test_cloud_config_builder() {
        let config = CloudConfig::new("qa-de-1")
            .unwrap()
            .with_token("gAAAA")
            .with_tls_verify(false)
            .with_timeout(90)
            .with_endpoint(
                SapccService::Arc,
                ServiceEndpointConfig::new("https://arc.qa-de-1.example.com").unwrap(),
            );

        assert_eq!(config.token.as_ref().unwrap().expose_secret(), "gAAAA");
        assert!(!config.tls_verify);
        assert_eq!(config.request_timeout_secs, 90);
        assert!(config.endpoint(SapccService::Arc).is_ok());
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let config = CloudConfig::new("qa-de-1").unwrap();
        let err = config.endpoint(SapccService::Limes).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
        assert!(err.to_string().contains("limes"));
    }

    #[test]
    fn test_from_json() {
        let config = CloudConfig::from_json(
            r#"{
                "region": "eu-nl-1",
                "token": "secret",
                "request_timeout_secs": 45,
                "services": {
                    "hermes": {"url": "https://hermes.eu-nl-1.example.com"},
                    "limes": {"url": "https://limes.eu-nl-1.example.com", "timeout_override_secs": 60}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.request_timeout_secs, 45);
        assert!(config.services.hermes.is_some());
        assert_eq!(
            config.endpoint(SapccService::Limes).unwrap().timeout(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_from_json_validates_nested_endpoints() {
        let err = CloudConfig::from_json(
            r#"{"region": "eu-nl-1", "services": {"arc": {"url": "not a url"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_token_is_not_serialized() {
        let config = CloudConfig::new("eu-de-2").unwrap().with_token("hidden");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hidden"));
    }

    #[test]
    fn test_endpoint_config() {
        let endpoint = ServiceEndpointConfig::new("https://limes.example.com")
            .unwrap()
            .with_timeout(60);
        assert_eq!(endpoint.timeout(), Some(Duration::from_secs(60)));
        assert!(endpoint.parse_url().is_ok());
        assert!(ServiceEndpointConfig::new("not a url").is_err());
    }
}
