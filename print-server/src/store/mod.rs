//! Record Store
//!
//! Typed async access to every persisted entity. The engine only sees
//! [`RecordStore`]; production wires [`SqliteStore`], tests wire
//! [`MemoryStore`].
//!
//! Every method is fallible I/O. `commit_transition` is the only multi-row
//! write that must be atomic: the order status compare-and-set and the audit
//! append succeed or fail together.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use shared::models::{
    AuditEvent, AuditReport, Machine, Notification, Order, SchoolClass, Staff, StaffMetric,
    StaffRole, StaffTask, Student, StudentAudit,
};
use shared::error::{AppError, ErrorCode};
use shared::order::OrderStatus;
use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Compare-and-set lost: the row is no longer in the expected status
    #[error("Status conflict on order {order_id}: expected {expected}, found {current}")]
    StatusConflict {
        order_id: i64,
        expected: OrderStatus,
        current: OrderStatus,
    },

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Duplicate(db_err.message().to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::not_found(what),
            StoreError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            StoreError::StatusConflict {
                order_id,
                expected,
                current,
            } => AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Order {order_id} is {current}, expected {expected}"),
            )
            .with_detail("order_id", order_id)
            .with_detail("current", current.as_str()),
            StoreError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Order listing filter. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// `submitted_at < submitted_before`
    pub submitted_before: Option<i64>,
    /// `Some(false)` = `auto_confirmed_at IS NULL`
    pub auto_confirmed: Option<bool>,
    pub limit: Option<i64>,
}

impl OrderFilter {
    /// Orders the auto-confirm job may pick up
    pub fn awaiting_auto_confirm(cutoff: i64) -> Self {
        Self {
            status: Some(OrderStatus::Submitted),
            submitted_before: Some(cutoff),
            auto_confirmed: Some(false),
            limit: None,
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| order.status == s)
            && self
                .submitted_before
                .is_none_or(|cutoff| order.submitted_at.is_some_and(|at| at < cutoff))
            && self
                .auto_confirmed
                .is_none_or(|confirmed| order.auto_confirmed_at.is_some() == confirmed)
    }
}

/// Machine listing filter
#[derive(Debug, Clone, Default)]
pub struct MachineFilter {
    pub is_online: Option<bool>,
    /// `last_seen_at < last_seen_before`
    pub last_seen_before: Option<i64>,
}

impl MachineFilter {
    /// Online machines whose heartbeat is older than `cutoff`
    pub fn stale(cutoff: i64) -> Self {
        Self {
            is_online: Some(true),
            last_seen_before: Some(cutoff),
        }
    }

    pub fn matches(&self, machine: &Machine) -> bool {
        self.is_online.is_none_or(|online| machine.is_online == online)
            && self
                .last_seen_before
                .is_none_or(|cutoff| machine.last_seen_at < cutoff)
    }
}

/// Audit trail filter
#[derive(Debug, Clone, Default)]
pub struct AuditEventFilter {
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub action: Option<String>,
}

impl AuditEventFilter {
    pub fn for_target(target_type: impl Into<String>, target_id: i64) -> Self {
        Self {
            target_type: Some(target_type.into()),
            target_id: Some(target_id),
            action: None,
        }
    }

    pub fn matches(&self, event: &AuditEvent) -> bool {
        self.target_type
            .as_deref()
            .is_none_or(|t| event.target_type == t)
            && self.target_id.is_none_or(|id| event.target_id == id)
            && self.action.as_deref().is_none_or(|a| event.action == a)
    }
}

/// Persistence boundary of the engine
///
/// Inserts take a record whose `id` may be `0`; the store assigns a snowflake
/// id in that case and returns the stored record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ========== Orders ==========

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>>;
    async fn insert_order(&self, order: Order) -> StoreResult<Order>;
    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;

    /// Write `order` (status and stamps) only if the stored status is still
    /// `expected`, and append `event` in the same transaction.
    ///
    /// Fails with [`StoreError::StatusConflict`] when the status moved on; in
    /// that case nothing is written.
    async fn commit_transition(
        &self,
        order: &Order,
        expected: OrderStatus,
        event: AuditEvent,
    ) -> StoreResult<Order>;

    // ========== Classes & students ==========

    async fn get_class(&self, id: i64) -> StoreResult<Option<SchoolClass>>;
    async fn insert_class(&self, class: SchoolClass) -> StoreResult<SchoolClass>;
    async fn get_student(&self, id: i64) -> StoreResult<Option<Student>>;
    async fn insert_student(&self, student: Student) -> StoreResult<Student>;
    async fn update_student_collected(
        &self,
        id: i64,
        collected_dark: i64,
        collected_light: i64,
        at: i64,
    ) -> StoreResult<Student>;

    // ========== Machines ==========

    async fn get_machine(&self, id: i64) -> StoreResult<Option<Machine>>;
    async fn insert_machine(&self, machine: Machine) -> StoreResult<Machine>;
    async fn list_machines(&self, filter: &MachineFilter) -> StoreResult<Vec<Machine>>;
    /// Heartbeat: mark online and refresh `last_seen_at`
    async fn touch_machine(&self, id: i64, at: i64) -> StoreResult<bool>;
    /// Flip to offline only while still online with `last_seen_at < cutoff`.
    /// Returns whether the row changed.
    async fn mark_machine_offline(&self, id: i64, cutoff: i64) -> StoreResult<bool>;

    // ========== Audit reports ==========

    async fn get_audit_report(&self, id: i64) -> StoreResult<Option<AuditReport>>;
    async fn find_audit_report(
        &self,
        order_id: i64,
        auditor_id: i64,
    ) -> StoreResult<Option<AuditReport>>;
    async fn insert_audit_report(&self, report: AuditReport) -> StoreResult<AuditReport>;
    /// Recompute counters, status and summary from every student audit of
    /// the report and every student of its order, as one atomic step.
    /// Returns the stored report.
    async fn recompute_audit_report(&self, report_id: i64, now: i64) -> StoreResult<AuditReport>;
    /// Insert or replace the row keyed by `(student_id, audit_report_id)`,
    /// keeping the existing id on replace.
    async fn upsert_student_audit(&self, audit: StudentAudit) -> StoreResult<StudentAudit>;
    async fn list_student_audits(&self, audit_report_id: i64) -> StoreResult<Vec<StudentAudit>>;
    /// Delete reports with `updated_at < cutoff` together with their student audits
    async fn delete_audit_reports_before(&self, cutoff: i64) -> StoreResult<u64>;

    // ========== Staff ==========

    async fn insert_staff(&self, staff: Staff) -> StoreResult<Staff>;
    async fn list_active_staff(&self, roles: &[StaffRole]) -> StoreResult<Vec<Staff>>;
    async fn insert_staff_task(&self, task: StaffTask) -> StoreResult<StaffTask>;
    /// Tasks of `staff_id` with `assigned_at` in `[start, end)`
    async fn list_staff_tasks(
        &self,
        staff_id: i64,
        start: i64,
        end: i64,
    ) -> StoreResult<Vec<StaffTask>>;
    async fn list_staff_metrics(
        &self,
        period_start: i64,
        period_end: i64,
    ) -> StoreResult<Vec<StaffMetric>>;
    /// Insert-or-ignore on `(staff_id, period_start, period_end)`.
    /// Returns whether a row was inserted.
    async fn insert_staff_metric(&self, metric: StaffMetric) -> StoreResult<bool>;

    // ========== Notifications ==========

    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification>;
    /// Undelivered and unread, oldest first
    async fn list_pending_notifications(&self, limit: i64) -> StoreResult<Vec<Notification>>;
    async fn mark_notifications_delivered(&self, ids: &[i64], at: i64) -> StoreResult<u64>;

    // ========== Audit trail ==========

    async fn append_audit_event(&self, event: AuditEvent) -> StoreResult<AuditEvent>;
    async fn list_audit_events(&self, filter: &AuditEventFilter) -> StoreResult<Vec<AuditEvent>>;
    async fn delete_audit_events_before(&self, cutoff: i64) -> StoreResult<u64>;
}
