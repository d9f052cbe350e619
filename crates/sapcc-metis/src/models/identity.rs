use chrono::{DateTime, Utc};
use sapcc_core::query::{QueryPairs, QueryParams, ToQuery};
use sapcc_core::Result;
use serde::{Deserialize, Serialize};

use super::metis_list_item;

/// Cost object of a domain or project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostObject {
    /// Cost object number.
    #[serde(default)]
    pub name: String,
    /// Kind of cost object.
    #[serde(rename = "type", default)]
    pub cost_object_type: String,
    /// Whether the cost object is inherited from the domain.
    #[serde(default)]
    pub inherited: bool,
}

/// A Keystone domain as seen by Metis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Keystone domain ID.
    pub uuid: String,
    /// Domain name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Whether the domain is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Cost object, when maintained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_object: Option<CostObject>,
    /// Number of projects in the domain.
    #[serde(default)]
    pub project_count: u64,
    /// Last change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<DateTime<Utc>>,
}

/// A Keystone project as seen by Metis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Keystone project ID.
    pub uuid: String,
    /// Project name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Whether the project is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Owning domain ID.
    #[serde(default)]
    pub domain_uuid: String,
    /// Owning domain name.
    #[serde(default)]
    pub domain_name: String,
    /// Parent project or domain ID.
    #[serde(default)]
    pub parent_uuid: String,
    /// Project classification.
    #[serde(default)]
    pub project_type: String,
    /// Cost object, when maintained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_object: Option<CostObject>,
    /// Primary contact user ID.
    #[serde(default)]
    pub responsible_primary_contact_id: String,
    /// Primary contact email.
    #[serde(default)]
    pub responsible_primary_contact_email: String,
    /// Operator user ID.
    #[serde(default)]
    pub responsible_operator_id: String,
    /// Operator email.
    #[serde(default)]
    pub responsible_operator_email: String,
    /// Last change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<DateTime<Utc>>,
}

metis_list_item!(Domain, Project);

/// Filters for listing domains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDomainsOpts {
    /// Exact domain name.
    pub name: String,
    /// Items per page.
    pub limit: u32,
}

impl ToQuery for ListDomainsOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("name", &self.name);
        params.push_nonzero("limit", &self.limit);
        Ok(params.into_pairs())
    }
}

/// Filters for listing projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListProjectsOpts {
    /// Exact project name.
    pub name: String,
    /// Owning domain ID.
    pub domain_id: String,
    /// Items per page.
    pub limit: u32,
}

impl ToQuery for ListProjectsOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("name", &self.name);
        params.push_nonzero("domain_id", &self.domain_id);
        params.push_nonzero("limit", &self.limit);
        Ok(params.into_pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_opts_build_empty_query() {
        assert!(ListDomainsOpts::default().to_query().unwrap().is_empty());
        assert!(ListProjectsOpts::default().to_query().unwrap().is_empty());
    }

    #[test]
    fn project_filters() {
        let opts = ListProjectsOpts {
            domain_id: "d-1".to_string(),
            limit: 50,
            ..ListProjectsOpts::default()
        };
        assert_eq!(
            opts.to_query().unwrap(),
            vec![("domain_id", "d-1".to_string()), ("limit", "50".to_string())]
        );
    }

    #[test]
    fn camel_case_fields() {
        let project: Project = serde_json::from_value(json!({
            "uuid": "p-1",
            "name": "web",
            "domainUuid": "d-1",
            "costObject": {"name": "123", "type": "IO", "inherited": true},
            "changedAt": "2024-02-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(project.domain_uuid, "d-1");
        assert!(project.cost_object.unwrap().inherited);
        assert!(project.changed_at.is_some());
    }
}
