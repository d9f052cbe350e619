//! Arc client and data models for SAP Converged Cloud.
//!
//! Provides typed structures and asynchronous client utilities for the Arc
//! API: agents registered in a project, their tags and facts, and the jobs
//! executed on them.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{ArcClient, ArcClientBuilder};
pub use models::{
    Agent, CreateJobOpts, CreateJobResult, GetAgentOpts, InitAgentOpts, InitAgentOutput,
    InitFormat, InitResult, Job, JobStatus, JobUser, ListAgentsOpts, ListJobsOpts, Tags,
};

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = sapcc_core::Result<T>;
