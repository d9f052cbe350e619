use chrono::NaiveDateTime;
use sapcc_core::pagination::{extract_array, Extract};
use sapcc_core::query::{QueryPairs, QueryParams, ToQuery};
use sapcc_core::serde_helpers::{bool_as_int, naive_datetime};
use sapcc_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of the billing report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BillingItem {
    /// Region.
    #[serde(default)]
    pub region: String,
    /// Keystone project ID.
    #[serde(default)]
    pub project_id: String,
    /// Project name.
    #[serde(default)]
    pub project_name: String,
    /// Metered object.
    #[serde(default)]
    pub object_id: String,
    /// Metered metric.
    #[serde(default)]
    pub metric_type: String,
    /// Consumed amount.
    #[serde(default)]
    pub amount: f64,
    /// Unit of `amount`.
    #[serde(default)]
    pub amount_unit: String,
    /// Consumed duration.
    #[serde(default)]
    pub duration: f64,
    /// Unit of `duration`.
    #[serde(default)]
    pub duration_unit: String,
    /// Price in local currency.
    #[serde(default)]
    pub price_loc: f64,
    /// Price in the secondary currency.
    #[serde(default)]
    pub price_sec: f64,
    /// Local currency.
    #[serde(default)]
    pub currency: String,
    /// Charged cost object.
    #[serde(default)]
    pub cost_object: String,
    /// Kind of cost object.
    #[serde(default)]
    pub cost_object_type: String,
    /// Whether the cost object was inherited from the domain.
    #[serde(with = "bool_as_int", default)]
    pub co_inherited: bool,
    /// Whether the line was sent to controlling.
    #[serde(with = "bool_as_int", default)]
    pub send_cc: bool,
    /// Start of the billed period, UTC.
    #[serde(default, with = "naive_datetime::option", skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDateTime>,
    /// End of the billed period, UTC.
    #[serde(default, with = "naive_datetime::option", skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDateTime>,
}

impl Extract for BillingItem {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Filters for the billing report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingOpts {
    /// Restrict to one project.
    pub project_id: String,
    /// Restrict to one cost object.
    pub cost_object: String,
    /// Billing year.
    pub year: i32,
    /// Billing month, 1-12.
    pub month: u32,
    /// Period start, UTC.
    pub from: Option<NaiveDateTime>,
    /// Period end, UTC.
    pub to: Option<NaiveDateTime>,
    /// Drop lines charged to internal cost objects.
    pub exclude_internal_co: bool,
}

impl ToQuery for BillingOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("project_id", &self.project_id);
        params.push_nonzero("cost_object", &self.cost_object);
        params.push_nonzero("year", &self.year);
        params.push_nonzero("month", &self.month);
        params.push_time("from", self.from.as_ref());
        params.push_time("to", self.to.as_ref());
        params.push_flag("exclude_internal_co", self.exclude_internal_co);
        Ok(params.into_pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_opts_build_empty_query() {
        assert!(BillingOpts::default().to_query().unwrap().is_empty());
    }

    #[test]
    fn set_fields_only() {
        let opts = BillingOpts {
            project_id: "p-1".to_string(),
            year: 2024,
            month: 3,
            exclude_internal_co: true,
            ..BillingOpts::default()
        };
        assert_eq!(
            opts.to_query().unwrap(),
            vec![
                ("project_id", "p-1".to_string()),
                ("year", "2024".to_string()),
                ("month", "3".to_string()),
                ("exclude_internal_co", "true".to_string()),
            ]
        );
    }

    #[test]
    fn int_encoded_flags_round_trip() {
        let item: BillingItem = serde_json::from_value(json!({
            "region": "eu-de-1",
            "project_id": "p-1",
            "metric_type": "storage_objectstore_usage",
            "amount": 12.5,
            "co_inherited": 1,
            "send_cc": 0,
            "period_start": "2024-03-01T00:00:00",
            "period_end": "2024-03-31T23:59:59"
        }))
        .unwrap();
        assert!(item.co_inherited);
        assert!(!item.send_cc);

        let encoded = serde_json::to_value(&item).unwrap();
        assert_eq!(encoded["co_inherited"], json!(1));
        assert_eq!(encoded["send_cc"], json!(0));
        assert_eq!(serde_json::from_value::<BillingItem>(encoded).unwrap(), item);
    }
}
