//! Staff, Task and Metric Models

use serde::{Deserialize, Serialize};

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Admin,
    Operator,
    Supervisor,
    Auditor,
    Viewer,
}

impl StaffRole {
    /// Roles that receive a daily performance metric
    pub const TRACKED: [StaffRole; 3] = [StaffRole::Admin, StaffRole::Operator, StaffRole::Supervisor];

    pub fn is_tracked(self) -> bool {
        Self::TRACKED.contains(&self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: i64,
    pub name: String,
    pub role: StaffRole,
    pub is_active: bool,
}

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Work item assigned to a staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffTask {
    pub id: i64,
    pub staff_id: i64,
    pub order_id: Option<i64>,
    pub title: String,
    pub status: TaskStatus,
    pub assigned_at: i64,
    pub completed_at: Option<i64>,
}

/// Daily performance metric, unique on `(staff_id, period_start, period_end)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffMetric {
    pub id: i64,
    pub staff_id: i64,
    /// Period start, inclusive (Unix millis)
    pub period_start: i64,
    /// Period end, exclusive (Unix millis)
    pub period_end: i64,
    pub tasks_assigned: i64,
    pub tasks_completed: i64,
    /// completed / assigned rounded to 2 decimals, null when nothing assigned
    pub efficiency_score: Option<f64>,
    pub avg_completion_secs: Option<f64>,
    pub created_at: i64,
}
