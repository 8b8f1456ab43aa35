//! AWS Cloud9 provider for envflow
//!
//! This crate implements [`envflow_cloud::EnvironmentApi`] for Cloud9 SSH
//! environments.
//!
//! # Requirements
//!
//! - A Cloud9 endpoint that accepts the requests. Authentication is not
//!   handled here; point `ENVFLOW_CLOUD9_ENDPOINT` at a SigV4 signing proxy
//!   when talking to AWS directly.
//!
//! # Example
//!
//! ```ignore
//! use envflow_cloud::EnvironmentReconciler;
//! use envflow_cloud_aws::{Cloud9Client, Cloud9Config};
//! use std::sync::Arc;
//!
//! let client = Cloud9Client::new(Cloud9Config::from_env()?);
//! let reconciler = EnvironmentReconciler::new(Arc::new(client));
//!
//! let record = reconciler.read("0123456789abcdef").await?;
//! ```

pub mod client;
pub mod error;

pub use client::{Cloud9Client, Cloud9Config};
pub use error::{Cloud9Error, Result};
