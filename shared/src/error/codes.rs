//! Unified error codes for the print-order engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order lifecycle errors
//! - 5xxx: Audit / discrepancy errors
//! - 6xxx: Device errors
//! - 7xxx: Scheduler errors
//! - 8xxx: Notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Current status does not allow the requested transition
    InvalidTransition = 4002,

    // ==================== 5xxx: Audit ====================
    /// Student not found
    StudentNotFound = 5001,
    /// Class not found
    ClassNotFound = 5002,
    /// Audit report not found
    AuditReportNotFound = 5003,
    /// Garment counts must be non-negative
    NegativeGarmentCount = 5004,
    /// Student's class belongs to another order
    ClassOrderMismatch = 5005,
    /// One of the audit writes failed (see details.failed_write)
    AuditWriteFailed = 5006,

    // ==================== 6xxx: Device ====================
    /// Machine not found
    MachineNotFound = 6001,

    // ==================== 7xxx: Scheduler ====================
    /// A sweep job failed structurally
    SweepJobFailed = 7001,

    // ==================== 8xxx: Notification ====================
    /// Notification sink rejected a batch
    NotificationDeliveryFailed = 8001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Order status does not allow this transition",

            // Audit
            ErrorCode::StudentNotFound => "Student not found",
            ErrorCode::ClassNotFound => "Class not found",
            ErrorCode::AuditReportNotFound => "Audit report not found",
            ErrorCode::NegativeGarmentCount => "Garment counts must be non-negative",
            ErrorCode::ClassOrderMismatch => "Student class does not belong to the student's order",
            ErrorCode::AuditWriteFailed => "Audit publish partially failed",

            // Device
            ErrorCode::MachineNotFound => "Machine not found",

            // Scheduler
            ErrorCode::SweepJobFailed => "Sweep job failed",

            // Notification
            ErrorCode::NotificationDeliveryFailed => "Notification delivery failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),

            5001 => Ok(ErrorCode::StudentNotFound),
            5002 => Ok(ErrorCode::ClassNotFound),
            5003 => Ok(ErrorCode::AuditReportNotFound),
            5004 => Ok(ErrorCode::NegativeGarmentCount),
            5005 => Ok(ErrorCode::ClassOrderMismatch),
            5006 => Ok(ErrorCode::AuditWriteFailed),

            6001 => Ok(ErrorCode::MachineNotFound),

            7001 => Ok(ErrorCode::SweepJobFailed),

            8001 => Ok(ErrorCode::NotificationDeliveryFailed),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InvalidTransition.code(), 4002);
        assert_eq!(ErrorCode::AuditWriteFailed.code(), 5006);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(ErrorCode::try_from(1001), Err(InvalidErrorCode(1001)));
    }

    #[test]
    fn test_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::InvalidTransition,
            ErrorCode::StudentNotFound,
            ErrorCode::ClassOrderMismatch,
            ErrorCode::MachineNotFound,
            ErrorCode::SweepJobFailed,
            ErrorCode::NotificationDeliveryFailed,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(u16::from(code)), Ok(code));
        }
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::InvalidTransition).unwrap();
        assert_eq!(json, "4002");
        let code: ErrorCode = serde_json::from_str("5004").unwrap();
        assert_eq!(code, ErrorCode::NegativeGarmentCount);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::InvalidTransition.to_string(), "E4002");
    }
}
