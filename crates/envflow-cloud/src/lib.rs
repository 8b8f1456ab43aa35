//! envflow Cloud reconciliation engine
//!
//! This crate converges the observed state of a remotely hosted SSH
//! development environment towards a user-declared desired record.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │             lifecycle driver (envflow)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │             EnvironmentReconciler                │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │ State Mapper │  │ Tag Reconciler│            │
//! │  └──────────────┘  └──────────────┘             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │     trait EnvironmentApi (remote API client)     │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The remote client is injected into each reconciler; there is no
//! process-wide client handle.

pub mod action;
pub mod client;
pub mod error;
pub mod mapper;
pub mod model;
pub mod reconciler;
pub mod state;
pub mod tags;

// Re-exports
pub use action::{ApplyResult, PlanSummary, StepKind, StepResult, UpdatePlan};
pub use client::{
    ApiError, ApiResult, CreateEnvironmentRequest, EnvironmentApi, RemoteEnvironment,
    RemoteOperation, Tag, UpdateEnvironmentRequest,
};
pub use error::{CloudError, Result};
pub use model::{DEFAULT_SSH_PORT, EnvironmentRecord, Tags};
pub use reconciler::EnvironmentReconciler;
pub use state::{EnvironmentState, ResourceStatus, StateFile, StateLock, StateManager};
pub use tags::{TagDiff, diff};
