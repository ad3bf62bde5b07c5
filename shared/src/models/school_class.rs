//! Class and Student Models

use serde::{Deserialize, Serialize};

/// Class within an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SchoolClass {
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub student_count: i64,
}

/// Student with submitted and collected garment counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Student {
    pub id: i64,
    pub order_id: i64,
    pub class_id: i64,
    pub name: String,
    pub is_served: bool,
    pub submitted_dark: i64,
    pub submitted_light: i64,
    /// Set by the auditor on publish
    pub collected_dark: Option<i64>,
    pub collected_light: Option<i64>,
    pub updated_at: i64,
}

impl Student {
    pub fn submitted_total(&self) -> i64 {
        self.submitted_dark + self.submitted_light
    }
}
