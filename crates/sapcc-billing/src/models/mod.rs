//! Billing models, one module per endpoint family.

mod billing;
mod costing;
mod domains;
mod pricelist;
mod projects;

pub use billing::{BillingItem, BillingOpts};
pub use costing::{Costing, CostingLevel, CostingOpts};
pub use domains::{Domain, DomainCostObject, UpdateDomainOpts};
pub use pricelist::{PriceListOpts, PriceRecord};
pub use projects::{CostObject, ExtCertification, Project, UpdateProjectOpts};
