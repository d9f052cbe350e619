//! BGPVPN interconnection client and data models for SAP Converged Cloud.
//!
//! An interconnection links a local BGPVPN to one in a remote region. Both
//! sides create an interconnection pointing at each other; Neutron then
//! validates the pair and moves it to `ACTIVE`.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{BgpvpnClient, BgpvpnClientBuilder};
pub use models::{
    CreateInterconnectionOpts, Interconnection, InterconnectionPage, ListInterconnectionsOpts,
    Parameters, SortDir, UpdateInterconnectionOpts,
};

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = sapcc_core::Result<T>;
