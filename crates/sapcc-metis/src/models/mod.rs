//! Metis models and the `data` envelope shared by every endpoint.

mod identity;
mod network;

pub use identity::{CostObject, Domain, ListDomainsOpts, ListProjectsOpts, Project};
pub use network::{IpAddress, ListIpAddressesOpts, ListZonesOpts, Zone};

use sapcc_core::pagination::{LinkedPage, Page};
use sapcc_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Pointer to the payload of a single-resource response.
pub const ITEM_POINTER: &str = "/data/item";

/// Lift `{data: {items, nextLink, ...}}` to `{items, next, ...}`.
///
/// Other keys of `data` such as `totalItems` are kept as they are.
pub(crate) fn lift_envelope(body: Value) -> Result<Value> {
    let Value::Object(mut outer) = body else {
        return Err(Error::DecodeError(
            "expected a JSON object with a `data` envelope".to_string(),
        ));
    };
    let Some(Value::Object(mut data)) = outer.remove("data") else {
        return Err(Error::DecodeError(
            "missing `data` object in response".to_string(),
        ));
    };
    if let Some(next) = data.remove("nextLink") {
        data.insert("next".to_string(), next);
    }
    Ok(Value::Object(data))
}

/// Decode the lifted `items`; absent or `null` means no items.
pub(crate) fn extract_items<T: DeserializeOwned>(body: &Value) -> Result<Vec<T>> {
    match body.get("items") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => {
            Vec::<T>::deserialize(items).map_err(|err| Error::DecodeError(format!("`items`: {err}")))
        }
    }
}

/// Wires an entity into [`LinkedPage`] pagination over the `data` envelope.
macro_rules! metis_list_item {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sapcc_core::pagination::Extract for $ty {
                type Item = Self;

                fn extract(body: &serde_json::Value) -> sapcc_core::Result<Vec<Self>> {
                    crate::models::extract_items(body)
                }
            }

            impl sapcc_core::pagination::LinkedExtract for $ty {
                fn normalize(body: serde_json::Value) -> sapcc_core::Result<serde_json::Value> {
                    crate::models::lift_envelope(body)
                }
            }
        )*
    };
}

pub(crate) use metis_list_item;

/// Total number of matching items reported with a page, if present.
#[must_use]
pub fn total_items<E>(page: &LinkedPage<E>) -> Option<u64>
where
    LinkedPage<E>: Page,
{
    page.result().body.get("totalItems").and_then(Value::as_u64)
}
