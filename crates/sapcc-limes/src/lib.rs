//! Limes client and data models for SAP Converged Cloud.
//!
//! Limes reports quota, usage and capacity per cluster, domain and project
//! (the resources API) and rate limits per cluster and project (the rates
//! API). Every report is wrapped in a named envelope such as `cluster` or
//! `projects`.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{LimesClient, LimesClientBuilder};
pub use models::{
    ClusterRateReport, ClusterReport, DomainReport, ProjectRateReport, ProjectReport, RateOpts,
    ReportOpts, UpdateProjectQuotaOpts,
};

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = sapcc_core::Result<T>;
