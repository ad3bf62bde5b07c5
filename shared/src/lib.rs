//! Shared types for the uniform print-order engine
//!
//! Domain models, the order status pipeline, unified error codes and small
//! utilities used by the server crate and by anything that talks to it.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use order::OrderStatus;
pub use serde::{Deserialize, Serialize};
