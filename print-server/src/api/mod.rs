//! HTTP API
//!
//! - [`health`] - liveness check
//! - [`orders`] - order lookup, creation and transitions
//! - [`machines`] - device heartbeats
//! - [`audits`] - student audit publishing and audit reports
//! - [`scheduler`] - on-demand sweep
//!
//! No authentication: callers state the acting identity in the request body.

pub mod audits;
pub mod health;
pub mod machines;
pub mod orders;
pub mod scheduler;

pub use crate::utils::{AppError, AppResult};
