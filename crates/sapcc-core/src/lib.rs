//! # sapcc-core
//!
//! Core types and utilities shared by the SAP Converged Cloud service clients.
//!
//! This crate provides the transport, error handling, request building and
//! pagination machinery that every service crate in this workspace builds on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status mapping
//! - [`client`] - HTTP service client, per-call OK status codes and cancellation
//! - [`config`] - Configuration structures for service clients
//! - [`query`] - Query string and header builders for options structs
//! - [`body`] - Request body builder for create/update options
//! - [`pagination`] - Pager and the single, marker and linked page variants
//! - [`serde_helpers`] - Codecs for the ad hoc wire encodings of the APIs
//! - [`types`] - Service enumeration
//! - [`uuid`] - Strongly-typed UUID wrappers

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod pagination;
pub mod query;
pub mod serde_helpers;
pub mod types;
pub mod uuid;

// Re-export commonly used types
pub use error::{Error, Result};
