use chrono::{DateTime, Utc};
use sapcc_core::query::{QueryPairs, QueryParams, ToQuery};
use sapcc_core::Result;
use serde::{Deserialize, Serialize};

use super::metis_list_item;

/// A Designate DNS zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Zone ID.
    pub uuid: String,
    /// Fully qualified zone name, with trailing dot.
    pub name: String,
    /// Zone contact email.
    #[serde(default)]
    pub email: String,
    /// Default TTL in seconds.
    #[serde(default)]
    pub ttl: u32,
    /// SOA serial.
    #[serde(default)]
    pub serial: u64,
    /// Designate status, e.g. `ACTIVE`.
    #[serde(default)]
    pub status: String,
    /// `PRIMARY` or `SECONDARY`.
    #[serde(rename = "type", default)]
    pub zone_type: String,
    /// Designate pool.
    #[serde(default)]
    pub pool_id: String,
    /// Owning project ID.
    #[serde(default)]
    pub project_uuid: String,
    /// Owning domain ID.
    #[serde(default)]
    pub domain_uuid: String,
    /// Number of recordsets in the zone.
    #[serde(default)]
    pub recordset_count: u64,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An IP address allocated in Neutron.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IpAddress {
    /// The address.
    pub ip_address: String,
    /// Whether the address is a floating IP.
    #[serde(default)]
    pub floating: bool,
    /// Network ID.
    #[serde(default)]
    pub network_uuid: String,
    /// Subnet ID.
    #[serde(default)]
    pub subnet_uuid: String,
    /// Port ID, when bound.
    #[serde(default)]
    pub port_uuid: String,
    /// MAC address of the port.
    #[serde(default)]
    pub mac_address: String,
    /// Server the port is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_uuid: Option<String>,
    /// Owning project ID.
    #[serde(default)]
    pub project_uuid: String,
    /// Owning domain ID.
    #[serde(default)]
    pub domain_uuid: String,
    /// DNS names pointing at the address.
    #[serde(default)]
    pub dns_names: Vec<String>,
}

metis_list_item!(Zone, IpAddress);

/// Filters for listing DNS zones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListZonesOpts {
    /// Zone name.
    pub name: String,
    /// Owning project ID.
    pub project_id: String,
    /// Owning domain ID.
    pub domain_id: String,
    /// Items per page.
    pub limit: u32,
}

impl ToQuery for ListZonesOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("name", &self.name);
        params.push_nonzero("project_id", &self.project_id);
        params.push_nonzero("domain_id", &self.domain_id);
        params.push_nonzero("limit", &self.limit);
        Ok(params.into_pairs())
    }
}

/// Filters for looking up IP addresses. The address is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListIpAddressesOpts {
    /// Address to look up.
    pub ip_address: String,
    /// Owning project ID.
    pub project_id: String,
    /// Owning domain ID.
    pub domain_id: String,
    /// Items per page.
    pub limit: u32,
}

impl ToQuery for ListIpAddressesOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_required("ip_address", &self.ip_address)?;
        params.push_nonzero("project_id", &self.project_id);
        params.push_nonzero("domain_id", &self.domain_id);
        params.push_nonzero("limit", &self.limit);
        Ok(params.into_pairs())
    }
}
