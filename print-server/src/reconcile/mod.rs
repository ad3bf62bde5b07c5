//! Garment collection audits
//!
//! - **discrepancy**: pure submitted vs. collected comparison and explanation
//! - **report**: full recompute of an audit report from its student rows
//! - **publisher**: the ordered write sequence behind a published student audit

pub mod discrepancy;
pub mod error;
pub mod publisher;
pub mod report;

pub use discrepancy::{Assessment, assess, discrepancy_reason};
pub use error::{FailedWrite, PublishError};
pub use publisher::{AuditPublisher, PublishRequest, STUDENT_AUDIT_PUBLISHED};
pub use report::ReportAggregate;
