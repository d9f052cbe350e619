//! Hermes models: CADF events and attribute listings.

use chrono::{DateTime, NaiveDateTime, Utc};
use sapcc_core::pagination::{Extract, LinkedExtract, LinkedPage, Page};
use sapcc_core::query::{path_segment, QueryPairs, QueryParams, ToQuery, QUERY_TIME_FORMAT};
use sapcc_core::serde_helpers::unix_or_rfc3339;
use sapcc_core::uuid::EventId;
use sapcc_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A CADF audit event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Event UUID.
    pub id: EventId,
    /// CADF schema URI.
    #[serde(rename = "typeURI")]
    pub type_uri: String,
    /// When the audited action happened.
    #[serde(rename = "eventTime", with = "unix_or_rfc3339")]
    pub event_time: DateTime<Utc>,
    /// CADF action, e.g. `create/role_assignment`.
    pub action: String,
    /// CADF event type, usually `activity`.
    #[serde(rename = "eventType")]
    pub event_type: String,
    /// `success`, `failure` or `pending`.
    pub outcome: String,
    /// Why the outcome happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    /// Who performed the action.
    pub initiator: Resource,
    /// What the action was performed on.
    pub target: Resource,
    /// Which service observed the action.
    pub observer: Resource,
    /// API path of the audited request.
    #[serde(rename = "requestPath", default, skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
    /// Additional payload.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Extract for Event {
    type Item = Self;

    fn extract(body: &Value) -> Result<Vec<Self>> {
        match body.get("events") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(events) => Vec::<Self>::deserialize(events)
                .map_err(|err| Error::DecodeError(format!("`events`: {err}"))),
        }
    }
}

impl LinkedExtract for Event {}

/// Pages of events.
pub type EventPage = LinkedPage<Event>;

/// Total number of matching events reported with a page, if present.
#[must_use]
pub fn total_events(page: &EventPage) -> Option<u64> {
    page.result().body.get("total").and_then(Value::as_u64)
}

/// Outcome details of an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reason {
    /// Reason schema, e.g. `HTTP`.
    #[serde(rename = "reasonType", default)]
    pub reason_type: String,
    /// Reason code, e.g. `409`.
    #[serde(rename = "reasonCode", default)]
    pub reason_code: String,
}

/// Initiator, target or observer of an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// CADF resource type.
    #[serde(rename = "typeURI")]
    pub type_uri: String,
    /// Resource ID.
    pub id: String,
    /// Resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Domain name of an initiator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Domain ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Project ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Application credential used for the request.
    #[serde(
        rename = "appCredentialID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub app_credential_id: Option<String>,
    /// Client host of an initiator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Host>,
    /// Additional payload.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Client host details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Host {
    /// Client address.
    #[serde(default)]
    pub address: String,
    /// User agent.
    #[serde(default)]
    pub agent: String,
}

/// Named attachment of an event or resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    /// Attachment name.
    #[serde(default)]
    pub name: String,
    /// Content type URI.
    #[serde(rename = "typeURI")]
    pub type_uri: String,
    /// Content, any JSON value.
    pub content: Value,
}

/// Comparison applied to the `time` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOperator {
    /// Strictly after.
    Gt,
    /// At or after.
    Gte,
    /// Strictly before.
    Lt,
    /// At or before.
    Lte,
}

impl TimeOperator {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }
}

/// One bound of the event time range, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFilter {
    /// Comparison.
    pub operator: TimeOperator,
    /// Bound.
    pub time: NaiveDateTime,
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.operator.as_str(),
            self.time.format(QUERY_TIME_FORMAT)
        )
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// One sort criterion, e.g. `time:desc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Ascending by `field`.
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending by `field`.
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{direction}", self.field)
    }
}

/// Query parameters for listing events.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListEventsOpts {
    /// Observer type URI.
    pub observer_type: String,
    /// Target ID.
    pub target_id: String,
    /// Target type URI.
    pub target_type: String,
    /// Initiator ID.
    pub initiator_id: String,
    /// Initiator type URI.
    pub initiator_type: String,
    /// Initiator name.
    pub initiator_name: String,
    /// CADF action.
    pub action: String,
    /// Outcome.
    pub outcome: String,
    /// Request path.
    pub request_path: String,
    /// Free-text search.
    pub search: String,
    /// Project scope (cloud admins only).
    pub project_id: String,
    /// Domain scope (cloud admins only).
    pub domain_id: String,
    /// Event time range; bounds are joined into one `time` parameter.
    pub time: Vec<TimeFilter>,
    /// Sort order; criteria are joined into one `sort` parameter.
    pub sort: Vec<SortKey>,
    /// Page size.
    pub limit: u32,
    /// Offset of the first event.
    pub offset: u32,
}

impl ToQuery for ListEventsOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("observer_type", &self.observer_type);
        params.push_nonzero("target_id", &self.target_id);
        params.push_nonzero("target_type", &self.target_type);
        params.push_nonzero("initiator_id", &self.initiator_id);
        params.push_nonzero("initiator_type", &self.initiator_type);
        params.push_nonzero("initiator_name", &self.initiator_name);
        params.push_nonzero("action", &self.action);
        params.push_nonzero("outcome", &self.outcome);
        params.push_nonzero("request_path", &self.request_path);
        params.push_nonzero("search", &self.search);
        params.push_nonzero("project_id", &self.project_id);
        params.push_nonzero("domain_id", &self.domain_id);
        params.push_nonzero("time", &join(&self.time));
        params.push_nonzero("sort", &join(&self.sort));
        params.push_nonzero("limit", &self.limit);
        params.push_nonzero("offset", &self.offset);
        Ok(params.into_pairs())
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Query parameters for listing the values of an event attribute.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttributeOpts {
    /// Attribute name, e.g. `initiator_name` or `target_type`.
    pub name: String,
    /// Depth at which hierarchical values are truncated.
    pub max_depth: u32,
    /// Maximum number of values.
    pub limit: u32,
    /// Project scope (cloud admins only).
    pub project_id: String,
    /// Domain scope (cloud admins only).
    pub domain_id: String,
}

impl AttributeOpts {
    /// Options for the named attribute.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Path of the attribute listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] when the name is empty and
    /// [`Error::InvalidInput`] when it is not a single path segment.
    pub fn path(&self) -> Result<String> {
        let name = path_segment("name", &self.name)?;
        Ok(format!("v1/attributes/{name}"))
    }
}

impl ToQuery for AttributeOpts {
    fn to_query(&self) -> Result<QueryPairs> {
        let mut params = QueryParams::new();
        params.push_nonzero("max_depth", &self.max_depth);
        params.push_nonzero("limit", &self.limit);
        params.push_nonzero("project_id", &self.project_id);
        params.push_nonzero("domain_id", &self.domain_id);
        Ok(params.into_pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn zero_list_opts_build_empty_query() {
        assert!(ListEventsOpts::default().to_query().unwrap().is_empty());
    }

    #[test]
    fn time_and_sort_are_joined() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_milli_opt(12, 0, 0, 500)
            .unwrap();
        let opts = ListEventsOpts {
            time: vec![
                TimeFilter {
                    operator: TimeOperator::Gte,
                    time: start,
                },
                TimeFilter {
                    operator: TimeOperator::Lt,
                    time: end,
                },
            ],
            sort: vec![SortKey::desc("time"), SortKey::asc("initiator_name")],
            limit: 50,
            ..ListEventsOpts::default()
        };

        assert_eq!(
            opts.to_query().unwrap(),
            vec![
                (
                    "time",
                    "gte:2024-03-01T00:00:00.000,lt:2024-03-02T12:00:00.500".to_string()
                ),
                ("sort", "time:desc,initiator_name:asc".to_string()),
                ("limit", "50".to_string()),
            ]
        );
    }

    #[test]
    fn attribute_opts_require_name() {
        assert_eq!(
            AttributeOpts::default().path().unwrap_err(),
            Error::MissingInput("name".to_string())
        );
        let opts = AttributeOpts {
            max_depth: 2,
            ..AttributeOpts::new("target_type")
        };
        assert_eq!(opts.path().unwrap(), "v1/attributes/target_type");
        assert_eq!(
            opts.to_query().unwrap(),
            vec![("max_depth", "2".to_string())]
        );
    }

    #[test]
    fn missing_events_key_is_an_empty_page() {
        let events = Event::extract(&serde_json::json!({"total": 0})).unwrap();
        assert!(events.is_empty());
        let events = Event::extract(&serde_json::json!({"events": null})).unwrap();
        assert!(events.is_empty());
    }
}
