//! SQLite-backed record store

use super::{
    AuditEventFilter, MachineFilter, OrderFilter, RecordStore, StoreResult,
};
use crate::db::repository::{
    audit_log, audit_report, machine, notification, order, staff, student,
};
use async_trait::async_trait;
use shared::models::{
    AuditEvent, AuditReport, Machine, Notification, Order, SchoolClass, Staff, StaffMetric,
    StaffRole, StaffTask, Student, StudentAudit,
};
use shared::order::OrderStatus;
use sqlx::SqlitePool;

/// Production store over the repository functions
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        order::find_by_id(&self.pool, id).await
    }

    async fn insert_order(&self, o: Order) -> StoreResult<Order> {
        order::insert(&self.pool, o).await
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        order::find_by_filter(&self.pool, filter).await
    }

    async fn commit_transition(
        &self,
        o: &Order,
        expected: OrderStatus,
        event: AuditEvent,
    ) -> StoreResult<Order> {
        order::commit_transition(&self.pool, o, expected, event).await
    }

    async fn get_class(&self, id: i64) -> StoreResult<Option<SchoolClass>> {
        student::find_class(&self.pool, id).await
    }

    async fn insert_class(&self, class: SchoolClass) -> StoreResult<SchoolClass> {
        student::insert_class(&self.pool, class).await
    }

    async fn get_student(&self, id: i64) -> StoreResult<Option<Student>> {
        student::find_by_id(&self.pool, id).await
    }

    async fn insert_student(&self, s: Student) -> StoreResult<Student> {
        student::insert(&self.pool, s).await
    }

    async fn update_student_collected(
        &self,
        id: i64,
        collected_dark: i64,
        collected_light: i64,
        at: i64,
    ) -> StoreResult<Student> {
        student::update_collected(&self.pool, id, collected_dark, collected_light, at).await
    }

    async fn get_machine(&self, id: i64) -> StoreResult<Option<Machine>> {
        machine::find_by_id(&self.pool, id).await
    }

    async fn insert_machine(&self, m: Machine) -> StoreResult<Machine> {
        machine::insert(&self.pool, m).await
    }

    async fn list_machines(&self, filter: &MachineFilter) -> StoreResult<Vec<Machine>> {
        machine::find_by_filter(&self.pool, filter).await
    }

    async fn touch_machine(&self, id: i64, at: i64) -> StoreResult<bool> {
        machine::touch(&self.pool, id, at).await
    }

    async fn mark_machine_offline(&self, id: i64, cutoff: i64) -> StoreResult<bool> {
        machine::mark_offline(&self.pool, id, cutoff).await
    }

    async fn get_audit_report(&self, id: i64) -> StoreResult<Option<AuditReport>> {
        audit_report::find_by_id(&self.pool, id).await
    }

    async fn find_audit_report(
        &self,
        order_id: i64,
        auditor_id: i64,
    ) -> StoreResult<Option<AuditReport>> {
        audit_report::find_by_order_and_auditor(&self.pool, order_id, auditor_id).await
    }

    async fn insert_audit_report(&self, report: AuditReport) -> StoreResult<AuditReport> {
        audit_report::insert(&self.pool, report).await
    }

    async fn recompute_audit_report(&self, report_id: i64, now: i64) -> StoreResult<AuditReport> {
        audit_report::recompute(&self.pool, report_id, now).await
    }

    async fn upsert_student_audit(&self, audit: StudentAudit) -> StoreResult<StudentAudit> {
        audit_report::upsert_student_audit(&self.pool, audit).await
    }

    async fn list_student_audits(&self, audit_report_id: i64) -> StoreResult<Vec<StudentAudit>> {
        audit_report::find_student_audits(&self.pool, audit_report_id).await
    }

    async fn delete_audit_reports_before(&self, cutoff: i64) -> StoreResult<u64> {
        audit_report::delete_before(&self.pool, cutoff).await
    }

    async fn insert_staff(&self, s: Staff) -> StoreResult<Staff> {
        staff::insert(&self.pool, s).await
    }

    async fn list_active_staff(&self, roles: &[StaffRole]) -> StoreResult<Vec<Staff>> {
        staff::find_active(&self.pool, roles).await
    }

    async fn insert_staff_task(&self, task: StaffTask) -> StoreResult<StaffTask> {
        staff::insert_task(&self.pool, task).await
    }

    async fn list_staff_tasks(
        &self,
        staff_id: i64,
        start: i64,
        end: i64,
    ) -> StoreResult<Vec<StaffTask>> {
        staff::find_tasks_assigned_between(&self.pool, staff_id, start, end).await
    }

    async fn list_staff_metrics(
        &self,
        period_start: i64,
        period_end: i64,
    ) -> StoreResult<Vec<StaffMetric>> {
        staff::find_metrics_for_period(&self.pool, period_start, period_end).await
    }

    async fn insert_staff_metric(&self, metric: StaffMetric) -> StoreResult<bool> {
        staff::insert_metric(&self.pool, metric).await
    }

    async fn insert_notification(&self, n: Notification) -> StoreResult<Notification> {
        notification::insert(&self.pool, n).await
    }

    async fn list_pending_notifications(&self, limit: i64) -> StoreResult<Vec<Notification>> {
        notification::find_pending(&self.pool, limit).await
    }

    async fn mark_notifications_delivered(&self, ids: &[i64], at: i64) -> StoreResult<u64> {
        notification::mark_delivered(&self.pool, ids, at).await
    }

    async fn append_audit_event(&self, event: AuditEvent) -> StoreResult<AuditEvent> {
        audit_log::insert(&self.pool, event).await
    }

    async fn list_audit_events(&self, filter: &AuditEventFilter) -> StoreResult<Vec<AuditEvent>> {
        audit_log::find_by_filter(&self.pool, filter).await
    }

    async fn delete_audit_events_before(&self, cutoff: i64) -> StoreResult<u64> {
        audit_log::delete_before(&self.pool, cutoff).await
    }
}
