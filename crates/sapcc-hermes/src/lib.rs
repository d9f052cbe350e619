//! Hermes client and data models for SAP Converged Cloud.
//!
//! Hermes serves the CADF audit trail of a project or domain. Events are
//! listed with filters and followed through the `next` link of each page.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{HermesClient, HermesClientBuilder};
pub use models::{
    total_events, Attachment, AttributeOpts, Event, EventPage, Host, ListEventsOpts, Reason,
    Resource, SortDirection, SortKey, TimeFilter, TimeOperator,
};

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = sapcc_core::Result<T>;
