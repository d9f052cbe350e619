//! Billing client and data models for SAP Converged Cloud.
//!
//! Covers the masterdata of projects and domains (cost objects, contacts,
//! certifications), the price list, and the billing and costing reports.
//! Every list endpoint answers with a complete bare JSON array.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{BillingClient, BillingClientBuilder};
pub use models::{
    BillingItem, BillingOpts, CostObject, Costing, CostingLevel, CostingOpts, Domain,
    DomainCostObject, ExtCertification, PriceListOpts, PriceRecord, Project, UpdateDomainOpts,
    UpdateProjectOpts,
};

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = sapcc_core::Result<T>;
