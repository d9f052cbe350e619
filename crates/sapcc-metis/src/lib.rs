//! Metis client and data models for SAP Converged Cloud.
//!
//! Metis answers lookups across the identity and network inventory of a
//! region. Every response nests its payload below `data`: single resources
//! under `data.item`, lists under `data.items` with a `data.nextLink` to the
//! following page.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{MetisClient, MetisClientBuilder};
pub use models::{
    total_items, CostObject, Domain, IpAddress, ListDomainsOpts, ListIpAddressesOpts,
    ListProjectsOpts, ListZonesOpts, Project, Zone,
};

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = sapcc_core::Result<T>;
