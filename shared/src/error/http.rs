//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::StudentNotFound
            | Self::ClassNotFound
            | Self::AuditReportNotFound
            | Self::MachineNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict: the order moved on, re-read before acting
            Self::AlreadyExists | Self::InvalidTransition => StatusCode::CONFLICT,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 502 Bad Gateway: downstream sink refused
            Self::NotificationDeliveryFailed => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::SweepJobFailed
            | Self::AuditWriteFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::NegativeGarmentCount
            | Self::ClassOrderMismatch => StatusCode::BAD_REQUEST,
        }
    }
}
