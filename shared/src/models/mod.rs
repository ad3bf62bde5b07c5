//! Data models
//!
//! Shared between the print server and its clients. Timestamps are Unix millis,
//! ids are snowflake `i64`.

pub mod audit_event;
pub mod audit_report;
pub mod machine;
pub mod notification;
pub mod order;
pub mod school_class;
pub mod staff;

pub use audit_event::*;
pub use audit_report::*;
pub use machine::*;
pub use notification::*;
pub use order::*;
pub use school_class::*;
pub use staff::*;
