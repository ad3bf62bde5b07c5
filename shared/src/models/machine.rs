//! Print Machine Model

use serde::{Deserialize, Serialize};

/// Print machine tracked by heartbeat
///
/// `is_online == false` implies `is_printing == false` and no active session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Machine {
    pub id: i64,
    /// Hardware identifier reported by the device
    pub device_id: String,
    pub name: String,
    pub is_online: bool,
    pub is_printing: bool,
    /// Order currently being printed
    pub active_session: Option<i64>,
    /// Last heartbeat (Unix millis)
    pub last_seen_at: i64,
}
