use chrono::NaiveDateTime;
use sapcc_core::body::{build_request_body, ToRequestBody};
use sapcc_core::pagination::{extract_array, Extract};
use sapcc_core::serde_helpers::naive_datetime;
use sapcc_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cost object of a domain, optionally inheritable by its projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainCostObject {
    /// Cost object number.
    #[serde(default)]
    pub name: String,
    /// Kind of cost object.
    #[serde(rename = "type", default)]
    pub cost_object_type: String,
    /// Whether projects may inherit this cost object.
    #[serde(default)]
    pub projects_can_inherit: bool,
}

/// Masterdata of a domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    /// Internal record ID.
    #[serde(default)]
    pub iid: i64,
    /// Keystone domain ID.
    pub domain_id: String,
    /// Domain name.
    #[serde(default)]
    pub domain_name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Free text.
    #[serde(default)]
    pub additional_information: String,
    /// Primary contact user ID.
    #[serde(default)]
    pub responsible_primary_contact_id: String,
    /// Primary contact email.
    #[serde(default)]
    pub responsible_primary_contact_email: String,
    /// Controller user ID.
    #[serde(default)]
    pub responsible_controller_id: String,
    /// Controller email.
    #[serde(default)]
    pub responsible_controller_email: String,
    /// Cost object.
    #[serde(default)]
    pub cost_object: DomainCostObject,
    /// Whether every mandatory attribute is filled.
    #[serde(default)]
    pub is_complete: bool,
    /// Comma separated list of missing mandatory attributes.
    #[serde(default)]
    pub missing_attributes: String,
    /// Collector that created the record.
    #[serde(default)]
    pub collector: String,
    /// Region.
    #[serde(default)]
    pub region: String,
    /// Creation time, UTC.
    #[serde(default, with = "naive_datetime::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Last change time, UTC.
    #[serde(default, with = "naive_datetime::option", skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<NaiveDateTime>,
    /// User that made the last change.
    #[serde(default)]
    pub changed_by: String,
}

impl Extract for Domain {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Request payload for updating domain masterdata.
///
/// `None` leaves a field untouched; `Some` of an empty value clears it.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpdateDomainOpts {
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<String>,
    /// Primary contact user ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_primary_contact_id: Option<String>,
    /// Primary contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_primary_contact_email: Option<String>,
    /// Controller user ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_controller_id: Option<String>,
    /// Controller email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_controller_email: Option<String>,
    /// Cost object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_object: Option<DomainCostObject>,
}

impl ToRequestBody for UpdateDomainOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(self, None, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_cost_object_round_trip() {
        let domain: Domain = serde_json::from_value(json!({
            "iid": 7,
            "domain_id": "ec213443e8834473b579f7bea9e8c194",
            "domain_name": "monsoon3",
            "cost_object": {"name": "987654", "type": "CC", "projects_can_inherit": true},
            "created_at": "2019-06-12T09:23:17.123456",
            "changed_at": ""
        }))
        .unwrap();

        assert!(domain.cost_object.projects_can_inherit);
        assert!(domain.changed_at.is_none());
        let encoded = serde_json::to_value(&domain).unwrap();
        assert_eq!(encoded["created_at"], json!("2019-06-12T09:23:17.123456"));
        assert_eq!(serde_json::from_value::<Domain>(encoded).unwrap(), domain);
    }

    #[test]
    fn update_only_sends_set_fields() {
        let opts = UpdateDomainOpts {
            responsible_controller_email: Some(String::new()),
            ..UpdateDomainOpts::default()
        };
        assert_eq!(
            opts.to_request_body().unwrap(),
            json!({"responsible_controller_email": ""})
        );
    }
}
