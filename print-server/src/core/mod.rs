//! Core: configuration, shared state, background tasks and the HTTP server
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - services shared by handlers and tasks
//! - [`BackgroundTasks`] - task registry with shutdown
//! - [`Server`] - HTTP server

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use server::{Server, build_router};
pub use state::ServerState;
pub use tasks::BackgroundTasks;
