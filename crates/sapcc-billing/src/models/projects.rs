use chrono::NaiveDateTime;
use sapcc_core::body::{build_request_body, ToRequestBody};
use sapcc_core::pagination::{extract_array, Extract};
use sapcc_core::serde_helpers::{bool_as_int, naive_datetime};
use sapcc_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cost object charged for a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostObject {
    /// Cost object number.
    #[serde(default)]
    pub name: String,
    /// Kind of cost object, e.g. `IO` or `CC`.
    #[serde(rename = "type", default)]
    pub cost_object_type: String,
    /// Whether the cost object is inherited from the domain.
    #[serde(default)]
    pub inherited: bool,
}

/// External certifications a project is subject to, transported as `0`/`1`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtCertification {
    /// BSI C5.
    #[serde(with = "bool_as_int", default)]
    pub c5: bool,
    /// ISO 27001.
    #[serde(with = "bool_as_int", default)]
    pub iso: bool,
    /// PCI DSS.
    #[serde(with = "bool_as_int", default)]
    pub pci: bool,
    /// SOC 1.
    #[serde(with = "bool_as_int", default)]
    pub soc1: bool,
    /// SOC 2.
    #[serde(with = "bool_as_int", default)]
    pub soc2: bool,
    /// SOX.
    #[serde(with = "bool_as_int", default)]
    pub sox: bool,
}

/// Masterdata of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Keystone project ID.
    pub project_id: String,
    /// Project name.
    #[serde(default)]
    pub project_name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Parent project ID.
    #[serde(default)]
    pub parent_id: String,
    /// Keystone domain ID.
    #[serde(default)]
    pub domain_id: String,
    /// Domain name.
    #[serde(default)]
    pub domain_name: String,
    /// Charged cost object.
    #[serde(default)]
    pub cost_object: CostObject,
    /// Project classification.
    #[serde(default)]
    pub project_type: String,
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
    /// Inventory role user ID.
    #[serde(default)]
    pub responsible_inventory_role_id: String,
    /// Inventory role email.
    #[serde(default)]
    pub responsible_inventory_role_email: String,
    /// Infrastructure coordinator user ID.
    #[serde(default)]
    pub responsible_infrastructure_coordinator_id: String,
    /// Infrastructure coordinator email.
    #[serde(default)]
    pub responsible_infrastructure_coordinator_email: String,
    /// Customer.
    #[serde(default)]
    pub customer: String,
    /// Landscape, e.g. `Prod` or `QA`.
    #[serde(default)]
    pub environment: String,
    /// Software license mode.
    #[serde(default)]
    pub soft_license_mode: String,
    /// Classification of stored data.
    #[serde(default)]
    pub type_of_data: String,
    /// Whether the project runs GPU workloads.
    #[serde(default)]
    pub gpu_enabled: bool,
    /// Whether the project stores personal data.
    #[serde(default)]
    pub contains_pii_dpp_hr: bool,
    /// Whether the project stores external customer data.
    #[serde(default)]
    pub contains_external_customer_data: bool,
    /// External certifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext_certification: Option<ExtCertification>,
    /// Free text.
    #[serde(default)]
    pub additional_information: String,
    /// Revenue relevance.
    #[serde(default)]
    pub revenue_relevance: String,
    /// Business criticality.
    #[serde(default)]
    pub business_criticality: String,
    /// Number of end users.
    #[serde(default)]
    pub number_of_endusers: i64,
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

impl Extract for Project {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Request payload for updating project masterdata.
///
/// `None` leaves a field untouched; `Some` of an empty value clears it.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UpdateProjectOpts {
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent project ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Project classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    /// Primary contact user ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_primary_contact_id: Option<String>,
    /// Primary contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_primary_contact_email: Option<String>,
    /// Operator user ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_operator_id: Option<String>,
    /// Operator email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_operator_email: Option<String>,
    /// Inventory role user ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_inventory_role_id: Option<String>,
    /// Inventory role email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_inventory_role_email: Option<String>,
    /// Infrastructure coordinator user ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_infrastructure_coordinator_id: Option<String>,
    /// Infrastructure coordinator email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_infrastructure_coordinator_email: Option<String>,
    /// Charged cost object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_object: Option<CostObject>,
    /// Customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    /// Landscape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Software license mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_license_mode: Option<String>,
    /// Classification of stored data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_data: Option<String>,
    /// GPU workloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_enabled: Option<bool>,
    /// Personal data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains_pii_dpp_hr: Option<bool>,
    /// External customer data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains_external_customer_data: Option<bool>,
    /// External certifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_certification: Option<ExtCertification>,
    /// Free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<String>,
    /// Revenue relevance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_relevance: Option<String>,
    /// Business criticality.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_criticality: Option<String>,
    /// Number of end users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_endusers: Option<i64>,
}

impl ToRequestBody for UpdateProjectOpts {
    fn to_request_body(&self) -> Result<Value> {
        build_request_body(self, None, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cost_object_nesting_round_trip() {
        for sample in [
            CostObject::default(),
            CostObject {
                name: "123456789".to_string(),
                cost_object_type: "IO".to_string(),
                inherited: true,
            },
        ] {
            let project = Project {
                project_id: "p-1".to_string(),
                cost_object: sample.clone(),
                ..Project::default()
            };
            let encoded = serde_json::to_value(&project).unwrap();
            assert_eq!(encoded["cost_object"]["type"], json!(sample.cost_object_type));
            let decoded: Project = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, project);
        }
    }

    #[test]
    fn ext_certification_is_int_encoded() {
        let certification = ExtCertification {
            c5: true,
            soc2: true,
            ..ExtCertification::default()
        };
        let encoded = serde_json::to_value(certification).unwrap();
        assert_eq!(
            encoded,
            json!({"c5": 1, "iso": 0, "pci": 0, "soc1": 0, "soc2": 1, "sox": 0})
        );
        let decoded: ExtCertification = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, certification);
        assert_eq!(
            serde_json::from_value::<ExtCertification>(json!({})).unwrap(),
            ExtCertification::default()
        );
    }

    #[test]
    fn update_distinguishes_unset_from_cleared() {
        assert_eq!(
            UpdateProjectOpts::default().to_request_body().unwrap(),
            json!({})
        );

        let opts = UpdateProjectOpts {
            description: Some(String::new()),
            gpu_enabled: Some(false),
            cost_object: Some(CostObject {
                inherited: true,
                ..CostObject::default()
            }),
            ..UpdateProjectOpts::default()
        };
        assert_eq!(
            opts.to_request_body().unwrap(),
            json!({
                "description": "",
                "gpu_enabled": false,
                "cost_object": {"name": "", "type": "", "inherited": true}
            })
        );
    }
}
