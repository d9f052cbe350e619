use chrono::NaiveDateTime;
use sapcc_core::pagination::{extract_array, Extract};
use sapcc_core::query::{path_segment, QueryPairs, QueryParams, ToQuery};
use sapcc_core::serde_helpers::{naive_datetime, number_from_string};
use sapcc_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the price list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    /// Record ID.
    pub id: i64,
    /// Region the price applies to.
    #[serde(default)]
    pub region: String,
    /// Metered metric, e.g. `compute_kvm_instance_ram`.
    pub metric_type: String,
    /// Billing unit, e.g. `GiB*h`.
    #[serde(default)]
    pub basic_unit: String,
    /// Price in local currency.
    #[serde(with = "number_from_string")]
    pub price_loc: f64,
    /// Price in the secondary currency.
    #[serde(with = "number_from_string")]
    pub price_sec: f64,
    /// Local currency.
    #[serde(default)]
    pub currency: String,
    /// Cost element.
    #[serde(default)]
    pub cost_element: String,
    /// Cost element name.
    #[serde(default)]
    pub cost_element_name: String,
    /// Sales organisation.
    #[serde(default)]
    pub sales_org: String,
    /// Distribution channel.
    #[serde(default)]
    pub distribution_channel: String,
    /// Start of validity, UTC.
    #[serde(with = "naive_datetime")]
    pub valid_from: NaiveDateTime,
    /// End of validity, UTC; open-ended when absent.
    #[serde(default, with = "naive_datetime::option", skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDateTime>,
    /// Last update, UTC.
    #[serde(default, with = "naive_datetime::option", skip_serializing_if = "Option::is_none")]
    pub last_update: Option<NaiveDateTime>,
}

impl Extract for PriceRecord {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        extract_array(body)
    }
}

/// Selection of price list entries.
///
/// `region` and `metric_type` are path segments; `metric_type` needs `region`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PriceListOpts {
    /// Restrict to one region.
    pub region: String,
    /// Restrict to one metric within the region.
    pub metric_type: String,
    /// Only prices valid now.
    pub only_active: bool,
    /// Valid at or after, UTC.
    pub from: Option<NaiveDateTime>,
    /// Valid at or before, UTC.
    pub to: Option<NaiveDateTime>,
}

impl PriceListOpts {
    /// Path of the price list selection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] when a metric type is given without a region.
    pub fn path(&self) -> Result<String> {
        match (self.region.as_str(), self.metric_type.as_str()) {
            ("", "") => Ok("masterdata/pricelist".to_string()),
            ("", _) => Err(Error::MissingInput("region".to_string())),
            (region, "") => {
                let region = path_segment("region", region)?;
                Ok(format!("masterdata/pricelist/{region}"))
            }
            (region, metric_type) => {
                let region = path_segment("region", region)?;
                let metric_type = path_segment("metric_type", metric_type)?;
                Ok(format!("masterdata/pricelist/{region}/{metric_type}"))
            }
        }
    }
}

impl ToQuery for PriceListOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_flag("onlyActive", self.only_active);
        params.push_time("from", self.from.as_ref());
        params.push_time("to", self.to.as_ref());
        Ok(params.into_pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn path_segments() {
        assert_eq!(
            PriceListOpts::default().path().unwrap(),
            "masterdata/pricelist"
        );
        let opts = PriceListOpts {
            region: "eu-de-1".to_string(),
            ..PriceListOpts::default()
        };
        assert_eq!(opts.path().unwrap(), "masterdata/pricelist/eu-de-1");
        let opts = PriceListOpts {
            metric_type: "compute_kvm_instance_ram".to_string(),
            ..opts
        };
        assert_eq!(
            opts.path().unwrap(),
            "masterdata/pricelist/eu-de-1/compute_kvm_instance_ram"
        );
        let opts = PriceListOpts {
            region: String::new(),
            ..opts
        };
        assert_eq!(
            opts.path().unwrap_err(),
            Error::MissingInput("region".to_string())
        );
        let opts = PriceListOpts {
            region: "eu-de-1".to_string(),
            metric_type: "../../projects".to_string(),
            ..PriceListOpts::default()
        };
        assert!(matches!(opts.path(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn query_flags_and_times() {
        assert!(PriceListOpts::default().to_query().unwrap().is_empty());
        let opts = PriceListOpts {
            only_active: true,
            from: NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            ..PriceListOpts::default()
        };
        assert_eq!(
            opts.to_query().unwrap(),
            vec![
                ("onlyActive", "true".to_string()),
                ("from", "2024-01-01T00:00:00.000".to_string())
            ]
        );
    }

    #[test]
    fn prices_accept_string_numbers() {
        let record: PriceRecord = serde_json::from_value(json!({
            "id": 1,
            "region": "eu-de-1",
            "metric_type": "compute_kvm_instance_ram",
            "basic_unit": "GiB*h",
            "price_loc": "0.0042",
            "price_sec": 0.0045,
            "currency": "EUR",
            "valid_from": "2024-01-01T00:00:00"
        }))
        .unwrap();
        assert!((record.price_loc - 0.0042).abs() < f64::EPSILON);
        assert!((record.price_sec - 0.0045).abs() < f64::EPSILON);
        assert!(record.valid_to.is_none());
    }
}
