//! Service enumeration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Supported services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SapccService {
    /// Arc agent management
    Arc,
    /// Lyra automation
    Lyra,
    /// Hermes audit events
    Hermes,
    /// Billing and masterdata
    Billing,
    /// Limes quota and rate reporting
    Limes,
    /// Metis identity and network lookups
    Metis,
    /// Neutron BGPVPN interconnections
    Bgpvpn,
}

impl SapccService {
    /// Returns the service name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Arc => "arc",
            Self::Lyra => "lyra",
            Self::Hermes => "hermes",
            Self::Billing => "billing",
            Self::Limes => "limes",
            Self::Metis => "metis",
            Self::Bgpvpn => "bgpvpn",
        }
    }

    /// Returns the keystone catalog type the service registers under.
    #[must_use]
    pub const fn catalog_type(&self) -> &'static str {
        match self {
            Self::Arc => "arc",
            Self::Lyra => "automation",
            Self::Hermes => "audit-data",
            Self::Billing => "sapcc-billing",
            Self::Limes => "resources",
            Self::Metis => "metis",
            Self::Bgpvpn => "network",
        }
    }

    /// Returns all available services.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Arc,
            Self::Lyra,
            Self::Hermes,
            Self::Billing,
            Self::Limes,
            Self::Metis,
            Self::Bgpvpn,
        ]
    }
}

impl FromStr for SapccService {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "arc" => Ok(Self::Arc),
            "lyra" | "automation" => Ok(Self::Lyra),
            "hermes" | "audit-data" => Ok(Self::Hermes),
            "billing" | "sapcc-billing" => Ok(Self::Billing),
            "limes" | "resources" => Ok(Self::Limes),
            "metis" => Ok(Self::Metis),
            "bgpvpn" => Ok(Self::Bgpvpn),
            _ => Err(Error::InvalidInput(format!("Unknown service: {s}"))),
        }
    }
}

impl std::fmt::Display for SapccService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_names_round_trip() {
        for service in SapccService::all() {
            let parsed: SapccService = service.name().parse().unwrap();
            assert_eq!(parsed, *service);
            assert_eq!(service.to_string(), service.name());
        }
    }

    #[test]
    fn test_catalog_type_aliases() {
        assert_eq!("automation".parse::<SapccService>().unwrap(), SapccService::Lyra);
        assert_eq!("RESOURCES".parse::<SapccService>().unwrap(), SapccService::Limes);
        assert!("nova".parse::<SapccService>().is_err());
    }

    #[test]
    fn test_service_serde() {
        let json = serde_json::to_string(&SapccService::Hermes).unwrap();
        assert_eq!(json, "\"hermes\"");
    }
}
