use chrono::NaiveDateTime;
use sapcc_core::pagination::{extract_array, Extract};
use sapcc_core::query::{QueryPairs, QueryParams, ToQuery};
use sapcc_core::serde_helpers::bool_as_int;
use sapcc_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Aggregation level of a costing report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CostingLevel {
    /// Per metered object.
    #[default]
    Object,
    /// Per project.
    Projects,
    /// Per domain.
    Domains,
}

impl CostingLevel {
    /// Path segment below `services/costing`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Projects => "projects",
            Self::Domains => "domains",
        }
    }
}

impl fmt::Display for CostingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a costing report.
///
/// Which of the ID fields is set depends on the [`CostingLevel`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Costing {
    /// Year.
    #[serde(default)]
    pub year: i32,
    /// Month, 1-12.
    #[serde(default)]
    pub month: u32,
    /// Region.
    #[serde(default)]
    pub region: String,
    /// Metered object, object level only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    /// Keystone project ID, object and project level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Keystone domain ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Charged cost object.
    #[serde(default)]
    pub cost_object: String,
    /// Kind of cost object.
    #[serde(default)]
    pub cost_object_type: String,
    /// Whether the cost object was inherited from the domain.
    #[serde(with = "bool_as_int", default)]
    pub co_inherited: bool,
    /// How the cost was allocated.
    #[serde(default)]
    pub allocation_type: String,
    /// Service the cost belongs to.
    #[serde(default)]
    pub service: String,
    /// Measure within the service.
    #[serde(default)]
    pub measure: String,
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
}

impl Extract for Costing {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Filters for a costing report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostingOpts {
    /// Period start, UTC.
    pub start: Option<NaiveDateTime>,
    /// Period end, UTC.
    pub end: Option<NaiveDateTime>,
    /// Restrict to one cost object.
    pub cost_object: String,
    /// Drop lines charged to internal cost objects.
    pub exclude_internal_co: bool,
}

impl ToQuery for CostingOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_time("start", self.start.as_ref());
        params.push_time("end", self.end.as_ref());
        params.push_nonzero("cost_object", &self.cost_object);
        params.push_flag("exclude_internal_co", self.exclude_internal_co);
        Ok(params.into_pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn level_path_segments() {
        assert_eq!(CostingLevel::default().to_string(), "object");
        assert_eq!(CostingLevel::Projects.as_str(), "projects");
        assert_eq!(CostingLevel::Domains.as_str(), "domains");
    }

    #[test]
    fn time_range_query() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999));
        let opts = CostingOpts {
            start,
            end,
            ..CostingOpts::default()
        };
        assert_eq!(
            opts.to_query().unwrap(),
            vec![
                ("start", "2024-03-01T00:00:00.000".to_string()),
                ("end", "2024-03-31T23:59:59.999".to_string()),
            ]
        );
    }

    #[test]
    fn level_dependent_ids() {
        let line: Costing = serde_json::from_value(json!({
            "year": 2024,
            "month": 3,
            "region": "eu-de-1",
            "domain_id": "d-1",
            "cost_object": "987654",
            "co_inherited": 1,
            "price_loc": 10.5
        }))
        .unwrap();
        assert!(line.object_id.is_none());
        assert!(line.project_id.is_none());
        assert_eq!(line.domain_id.as_deref(), Some("d-1"));
        assert!(line.co_inherited);
    }
}
