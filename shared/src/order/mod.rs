//! Order status pipeline shared between the engine and its callers

pub mod status;

pub use status::{OrderStatus, UnknownStatus};
