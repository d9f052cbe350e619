//! Limes models: resource reports and rate reports.

mod rates;
mod resources;

pub use rates::{
    ClusterRateReport, ClusterServiceRates, ProjectRate, ProjectRateReport, ProjectServiceRates,
    RateLimit, RateOpts,
};
pub use resources::{
    ClusterResourceReport, ClusterReport, ClusterServiceReport, DomainReport,
    DomainResourceReport, DomainServiceReport, ProjectBursting, ProjectReport,
    ProjectResourceReport, ProjectServiceReport, ReportOpts, ResourceQuota, ServiceQuota,
    UpdateProjectQuotaOpts, CLUSTER_ID_HEADER,
};
