//! Lyra client and data models for SAP Converged Cloud.
//!
//! Lyra stores Chef and script automations and runs them against Arc agents
//! selected by a filter expression.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{LyraClient, LyraClientBuilder};
pub use models::{
    Automation, AutomationType, CreateAutomationOpts, CreateRunOpts, ListOpts, Run, RunOwner,
    RunState, UpdateAutomationOpts,
};

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = sapcc_core::Result<T>;
