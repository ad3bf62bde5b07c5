use crate::store::StoreError;
use shared::error::{AppError, ErrorCode};
use std::fmt;
use thiserror::Error;

/// Which publish write failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedWrite {
    Student,
    AuditReport,
    StudentAudit,
    ReportAggregate,
}

impl FailedWrite {
    pub fn as_str(self) -> &'static str {
        match self {
            FailedWrite::Student => "student",
            FailedWrite::AuditReport => "audit_report",
            FailedWrite::StudentAudit => "student_audit",
            FailedWrite::ReportAggregate => "report_aggregate",
        }
    }
}

impl fmt::Display for FailedWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Student audit publish errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Negative garment count: {field} = {value}")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("Garment count too large: {field} = {value} (max {max})")]
    CountTooLarge {
        field: &'static str,
        value: i64,
        max: i64,
    },

    #[error("Student not found: {0}")]
    StudentNotFound(i64),

    #[error("Class not found: {0}")]
    ClassNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Class {class_id} does not belong to order {order_id} of student {student_id}")]
    ClassOrderMismatch {
        student_id: i64,
        class_id: i64,
        order_id: i64,
    },

    /// Lookup failed before anything was written
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Write to {failed_write} failed (student updated: {student_updated}): {source}")]
    WriteFailed {
        failed_write: FailedWrite,
        student_updated: bool,
        source: StoreError,
    },
}

impl PublishError {
    pub(crate) fn write(failed_write: FailedWrite, source: StoreError) -> Self {
        PublishError::WriteFailed {
            failed_write,
            student_updated: failed_write != FailedWrite::Student,
            source,
        }
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        let message = err.to_string();
        match err {
            PublishError::NegativeCount { field, value } => {
                AppError::with_message(ErrorCode::NegativeGarmentCount, message)
                    .with_detail("field", field)
                    .with_detail("value", value)
            }
            PublishError::CountTooLarge { field, value, max } => {
                AppError::with_message(ErrorCode::ValidationFailed, message)
                    .with_detail("field", field)
                    .with_detail("value", value)
                    .with_detail("max", max)
            }
            PublishError::StudentNotFound(id) => {
                AppError::with_message(ErrorCode::StudentNotFound, message)
                    .with_detail("student_id", id)
            }
            PublishError::ClassNotFound(id) => {
                AppError::with_message(ErrorCode::ClassNotFound, message).with_detail("class_id", id)
            }
            PublishError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            PublishError::ClassOrderMismatch {
                student_id,
                class_id,
                order_id,
            } => AppError::with_message(ErrorCode::ClassOrderMismatch, message)
                .with_detail("student_id", student_id)
                .with_detail("class_id", class_id)
                .with_detail("order_id", order_id),
            PublishError::Store(_) => AppError::database(message),
            PublishError::WriteFailed {
                failed_write,
                student_updated,
                ..
            } => AppError::with_message(ErrorCode::AuditWriteFailed, message)
                .with_detail("failed_write", failed_write.as_str())
                .with_detail("student_updated", student_updated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_details() {
        let err: AppError = PublishError::write(
            FailedWrite::StudentAudit,
            StoreError::Database("locked".into()),
        )
        .into();
        assert_eq!(err.code, ErrorCode::AuditWriteFailed);
        let details = err.details.unwrap();
        assert_eq!(details["failed_write"], "student_audit");
        assert_eq!(details["student_updated"], true);
    }

    #[test]
    fn test_student_write_failure_flags_nothing_persisted() {
        let err = PublishError::write(FailedWrite::Student, StoreError::Database("x".into()));
        assert!(matches!(
            err,
            PublishError::WriteFailed {
                student_updated: false,
                ..
            }
        ));
    }
}
