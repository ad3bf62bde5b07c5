//! In-process record store
//!
//! Backs tests and local runs without a database. All state sits behind one
//! `parking_lot::Mutex`, so each method (including `commit_transition`) is
//! atomic with respect to the others.
//!
//! Failures can be injected per operation name to exercise error paths.

use super::{
    AuditEventFilter, MachineFilter, OrderFilter, RecordStore, StoreError, StoreResult,
};
use crate::reconcile::ReportAggregate;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{
    AuditEvent, AuditReport, Machine, Notification, Order, SchoolClass, Staff, StaffMetric,
    StaffRole, StaffTask, Student, StudentAudit,
};
use shared::order::OrderStatus;
use std::collections::BTreeMap;

#[derive(Default)]
struct Tables {
    orders: BTreeMap<i64, Order>,
    classes: BTreeMap<i64, SchoolClass>,
    students: BTreeMap<i64, Student>,
    machines: BTreeMap<i64, Machine>,
    audit_reports: BTreeMap<i64, AuditReport>,
    student_audits: BTreeMap<i64, StudentAudit>,
    staff: BTreeMap<i64, Staff>,
    staff_tasks: BTreeMap<i64, StaffTask>,
    staff_metrics: BTreeMap<i64, StaffMetric>,
    notifications: BTreeMap<i64, Notification>,
    audit_log: BTreeMap<i64, AuditEvent>,
}

/// Injected failure: `op` fails, optionally only for one record id
#[derive(Debug, Clone)]
struct FailPoint {
    op: &'static str,
    target: Option<i64>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failures: Mutex<Vec<FailPoint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `op` fail with a database error until cleared
    pub fn fail_on(&self, op: &'static str) {
        self.failures.lock().push(FailPoint { op, target: None });
    }

    /// Make `op` fail only when it touches record `target`
    pub fn fail_on_record(&self, op: &'static str, target: i64) {
        self.failures.lock().push(FailPoint {
            op,
            target: Some(target),
        });
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    fn check(&self, op: &'static str, target: Option<i64>) -> StoreResult<()> {
        let failures = self.failures.lock();
        let hit = failures
            .iter()
            .any(|f| f.op == op && (f.target.is_none() || f.target == target));
        if hit {
            return Err(StoreError::Database(format!("injected failure in {op}")));
        }
        Ok(())
    }

    /// Direct write used by tests to stage arbitrary order states
    pub fn put_order(&self, order: Order) {
        self.tables.lock().orders.insert(order.id, order);
    }

    /// Direct write used by tests to stage machine heartbeats
    pub fn put_machine(&self, machine: Machine) {
        self.tables.lock().machines.insert(machine.id, machine);
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.tables.lock().notifications.values().cloned().collect()
    }

    pub fn audit_report_count(&self) -> usize {
        self.tables.lock().audit_reports.len()
    }
}

fn assign_id(id: i64) -> i64 {
    if id == 0 {
        shared::util::snowflake_id()
    } else {
        id
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        self.check("get_order", Some(id))?;
        Ok(self.tables.lock().orders.get(&id).cloned())
    }

    async fn insert_order(&self, mut order: Order) -> StoreResult<Order> {
        self.check("insert_order", None)?;
        order.id = assign_id(order.id);
        self.tables.lock().orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        self.check("list_orders", None)?;
        let tables = self.tables.lock();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.submitted_at, o.id));
        if let Some(limit) = filter.limit {
            orders.truncate(limit.max(0) as usize);
        }
        Ok(orders)
    }

    async fn commit_transition(
        &self,
        order: &Order,
        expected: OrderStatus,
        mut event: AuditEvent,
    ) -> StoreResult<Order> {
        self.check("commit_transition", Some(order.id))?;
        let mut tables = self.tables.lock();
        let current = tables
            .orders
            .get(&order.id)
            .map(|o| o.status)
            .ok_or_else(|| StoreError::NotFound(format!("Order {}", order.id)))?;
        if current != expected {
            return Err(StoreError::StatusConflict {
                order_id: order.id,
                expected,
                current,
            });
        }
        event.id = assign_id(event.id);
        tables.orders.insert(order.id, order.clone());
        tables.audit_log.insert(event.id, event);
        Ok(order.clone())
    }

    async fn get_class(&self, id: i64) -> StoreResult<Option<SchoolClass>> {
        self.check("get_class", Some(id))?;
        Ok(self.tables.lock().classes.get(&id).cloned())
    }

    async fn insert_class(&self, mut class: SchoolClass) -> StoreResult<SchoolClass> {
        class.id = assign_id(class.id);
        self.tables.lock().classes.insert(class.id, class.clone());
        Ok(class)
    }

    async fn get_student(&self, id: i64) -> StoreResult<Option<Student>> {
        self.check("get_student", Some(id))?;
        Ok(self.tables.lock().students.get(&id).cloned())
    }

    async fn insert_student(&self, mut student: Student) -> StoreResult<Student> {
        student.id = assign_id(student.id);
        self.tables
            .lock()
            .students
            .insert(student.id, student.clone());
        Ok(student)
    }

    async fn update_student_collected(
        &self,
        id: i64,
        collected_dark: i64,
        collected_light: i64,
        at: i64,
    ) -> StoreResult<Student> {
        self.check("update_student_collected", Some(id))?;
        let mut tables = self.tables.lock();
        let student = tables
            .students
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("Student {id}")))?;
        student.collected_dark = Some(collected_dark);
        student.collected_light = Some(collected_light);
        student.updated_at = at;
        Ok(student.clone())
    }

    async fn get_machine(&self, id: i64) -> StoreResult<Option<Machine>> {
        Ok(self.tables.lock().machines.get(&id).cloned())
    }

    async fn insert_machine(&self, mut machine: Machine) -> StoreResult<Machine> {
        machine.id = assign_id(machine.id);
        self.tables
            .lock()
            .machines
            .insert(machine.id, machine.clone());
        Ok(machine)
    }

    async fn list_machines(&self, filter: &MachineFilter) -> StoreResult<Vec<Machine>> {
        self.check("list_machines", None)?;
        Ok(self
            .tables
            .lock()
            .machines
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn touch_machine(&self, id: i64, at: i64) -> StoreResult<bool> {
        let mut tables = self.tables.lock();
        match tables.machines.get_mut(&id) {
            Some(machine) => {
                machine.is_online = true;
                machine.last_seen_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_machine_offline(&self, id: i64, cutoff: i64) -> StoreResult<bool> {
        self.check("mark_machine_offline", Some(id))?;
        let mut tables = self.tables.lock();
        match tables.machines.get_mut(&id) {
            Some(machine) if machine.is_online && machine.last_seen_at < cutoff => {
                machine.is_online = false;
                machine.is_printing = false;
                machine.active_session = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_audit_report(&self, id: i64) -> StoreResult<Option<AuditReport>> {
        self.check("get_audit_report", Some(id))?;
        Ok(self.tables.lock().audit_reports.get(&id).cloned())
    }

    async fn find_audit_report(
        &self,
        order_id: i64,
        auditor_id: i64,
    ) -> StoreResult<Option<AuditReport>> {
        self.check("find_audit_report", None)?;
        Ok(self
            .tables
            .lock()
            .audit_reports
            .values()
            .find(|r| r.order_id == order_id && r.auditor_id == auditor_id)
            .cloned())
    }

    async fn insert_audit_report(&self, mut report: AuditReport) -> StoreResult<AuditReport> {
        self.check("insert_audit_report", None)?;
        let mut tables = self.tables.lock();
        let duplicate = tables
            .audit_reports
            .values()
            .any(|r| r.order_id == report.order_id && r.auditor_id == report.auditor_id);
        if duplicate {
            return Err(StoreError::Duplicate(format!(
                "audit_report ({}, {})",
                report.order_id, report.auditor_id
            )));
        }
        report.id = assign_id(report.id);
        tables.audit_reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn recompute_audit_report(&self, report_id: i64, now: i64) -> StoreResult<AuditReport> {
        self.check("recompute_audit_report", Some(report_id))?;
        let mut tables = self.tables.lock();
        let mut report = tables
            .audit_reports
            .get(&report_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Audit report {report_id}")))?;
        let audits: Vec<StudentAudit> = tables
            .student_audits
            .values()
            .filter(|a| a.audit_report_id == report_id)
            .cloned()
            .collect();
        let students: Vec<Student> = tables
            .students
            .values()
            .filter(|s| s.order_id == report.order_id)
            .cloned()
            .collect();
        ReportAggregate::compute(&audits, &students).apply_to(&mut report, now);
        tables.audit_reports.insert(report_id, report.clone());
        Ok(report)
    }

    async fn upsert_student_audit(&self, mut audit: StudentAudit) -> StoreResult<StudentAudit> {
        self.check("upsert_student_audit", Some(audit.student_id))?;
        let mut tables = self.tables.lock();
        let existing = tables
            .student_audits
            .values()
            .find(|a| {
                a.student_id == audit.student_id && a.audit_report_id == audit.audit_report_id
            })
            .map(|a| a.id);
        audit.id = match existing {
            Some(id) => id,
            None => assign_id(audit.id),
        };
        tables.student_audits.insert(audit.id, audit.clone());
        Ok(audit)
    }

    async fn list_student_audits(&self, audit_report_id: i64) -> StoreResult<Vec<StudentAudit>> {
        self.check("list_student_audits", Some(audit_report_id))?;
        Ok(self
            .tables
            .lock()
            .student_audits
            .values()
            .filter(|a| a.audit_report_id == audit_report_id)
            .cloned()
            .collect())
    }

    async fn delete_audit_reports_before(&self, cutoff: i64) -> StoreResult<u64> {
        self.check("delete_audit_reports_before", None)?;
        let mut tables = self.tables.lock();
        let expired: Vec<i64> = tables
            .audit_reports
            .values()
            .filter(|r| r.updated_at < cutoff)
            .map(|r| r.id)
            .collect();
        for id in &expired {
            tables.audit_reports.remove(id);
        }
        tables
            .student_audits
            .retain(|_, a| !expired.contains(&a.audit_report_id));
        Ok(expired.len() as u64)
    }

    async fn insert_staff(&self, mut staff: Staff) -> StoreResult<Staff> {
        staff.id = assign_id(staff.id);
        self.tables.lock().staff.insert(staff.id, staff.clone());
        Ok(staff)
    }

    async fn list_active_staff(&self, roles: &[StaffRole]) -> StoreResult<Vec<Staff>> {
        self.check("list_active_staff", None)?;
        Ok(self
            .tables
            .lock()
            .staff
            .values()
            .filter(|s| s.is_active && roles.contains(&s.role))
            .cloned()
            .collect())
    }

    async fn insert_staff_task(&self, mut task: StaffTask) -> StoreResult<StaffTask> {
        task.id = assign_id(task.id);
        self.tables.lock().staff_tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_staff_tasks(
        &self,
        staff_id: i64,
        start: i64,
        end: i64,
    ) -> StoreResult<Vec<StaffTask>> {
        self.check("list_staff_tasks", Some(staff_id))?;
        Ok(self
            .tables
            .lock()
            .staff_tasks
            .values()
            .filter(|t| t.staff_id == staff_id && t.assigned_at >= start && t.assigned_at < end)
            .cloned()
            .collect())
    }

    async fn list_staff_metrics(
        &self,
        period_start: i64,
        period_end: i64,
    ) -> StoreResult<Vec<StaffMetric>> {
        self.check("list_staff_metrics", None)?;
        Ok(self
            .tables
            .lock()
            .staff_metrics
            .values()
            .filter(|m| m.period_start == period_start && m.period_end == period_end)
            .cloned()
            .collect())
    }

    async fn insert_staff_metric(&self, mut metric: StaffMetric) -> StoreResult<bool> {
        self.check("insert_staff_metric", Some(metric.staff_id))?;
        let mut tables = self.tables.lock();
        let exists = tables.staff_metrics.values().any(|m| {
            m.staff_id == metric.staff_id
                && m.period_start == metric.period_start
                && m.period_end == metric.period_end
        });
        if exists {
            return Ok(false);
        }
        metric.id = assign_id(metric.id);
        tables.staff_metrics.insert(metric.id, metric);
        Ok(true)
    }

    async fn insert_notification(&self, mut notification: Notification) -> StoreResult<Notification> {
        notification.id = assign_id(notification.id);
        self.tables
            .lock()
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_pending_notifications(&self, limit: i64) -> StoreResult<Vec<Notification>> {
        self.check("list_pending_notifications", None)?;
        let tables = self.tables.lock();
        let mut pending: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| !n.is_delivered && !n.is_read)
            .cloned()
            .collect();
        pending.sort_by_key(|n| (n.created_at, n.id));
        pending.truncate(limit.max(0) as usize);
        Ok(pending)
    }

    async fn mark_notifications_delivered(&self, ids: &[i64], at: i64) -> StoreResult<u64> {
        self.check("mark_notifications_delivered", None)?;
        let mut tables = self.tables.lock();
        let mut changed = 0;
        for id in ids {
            if let Some(n) = tables.notifications.get_mut(id)
                && !n.is_delivered
            {
                n.is_delivered = true;
                n.delivered_at = Some(at);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn append_audit_event(&self, mut event: AuditEvent) -> StoreResult<AuditEvent> {
        self.check("append_audit_event", Some(event.target_id))?;
        event.id = assign_id(event.id);
        self.tables.lock().audit_log.insert(event.id, event.clone());
        Ok(event)
    }

    async fn list_audit_events(&self, filter: &AuditEventFilter) -> StoreResult<Vec<AuditEvent>> {
        let tables = self.tables.lock();
        let mut events: Vec<AuditEvent> = tables
            .audit_log
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.timestamp, e.id));
        Ok(events)
    }

    async fn delete_audit_events_before(&self, cutoff: i64) -> StoreResult<u64> {
        self.check("delete_audit_events_before", None)?;
        let mut tables = self.tables.lock();
        let before = tables.audit_log.len();
        tables.audit_log.retain(|_, e| e.timestamp >= cutoff);
        Ok((before - tables.audit_log.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ActorContext, AuditDetails};

    fn submitted_order(id: i64) -> Order {
        Order {
            id,
            school_id: 1,
            reference_code: format!("PO-{id}"),
            status: OrderStatus::Submitted,
            total_students: 0,
            total_garments: 0,
            dark_garments: 0,
            light_garments: 0,
            total_amount: 0.0,
            submitted_at: Some(10),
            confirmed_at: None,
            auto_confirmed_at: None,
            queued_at: None,
            pickup_at: None,
            ongoing_at: None,
            done_at: None,
            packaging_at: None,
            delivery_at: None,
            completed_at: None,
            aborted_at: None,
            created_at: 10,
            updated_at: 10,
        }
    }

    fn event(order_id: i64) -> AuditEvent {
        AuditEvent::new(
            &ActorContext::system(),
            "ORDER_QUEUED_SYSTEM",
            "order",
            order_id,
            AuditDetails::OrderTransition {
                from: OrderStatus::Submitted,
                to: OrderStatus::Queued,
                at: 20,
            },
            20,
        )
    }

    #[tokio::test]
    async fn test_commit_conflict_writes_nothing() {
        let store = MemoryStore::new();
        store.put_order(submitted_order(1));

        let mut next = submitted_order(1);
        next.status = OrderStatus::Queued;
        let err = store
            .commit_transition(&next, OrderStatus::Confirmed, event(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::StatusConflict {
                current: OrderStatus::Submitted,
                ..
            }
        ));

        let stored = store.get_order(1).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Submitted);
        let events = store
            .list_audit_events(&AuditEventFilter::default())
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_targets_one_record() {
        let store = MemoryStore::new();
        store.put_order(submitted_order(1));
        store.put_order(submitted_order(2));
        store.fail_on_record("get_order", 2);

        assert!(store.get_order(1).await.is_ok());
        assert!(store.get_order(2).await.is_err());

        store.clear_failures();
        assert!(store.get_order(2).await.is_ok());
    }

    #[tokio::test]
    async fn test_student_audit_upsert_keeps_id() {
        let store = MemoryStore::new();
        let audit = StudentAudit {
            id: 0,
            audit_report_id: 5,
            student_id: 9,
            class_id: 1,
            submitted_dark: 1,
            submitted_light: 1,
            collected_dark: 0,
            collected_light: 1,
            dark_delta: -1,
            light_delta: 0,
            has_discrepancy: true,
            discrepancy_reason: None,
            auditor_notes: None,
            published_at: 1,
        };
        let first = store.upsert_student_audit(audit.clone()).await.unwrap();
        let second = store
            .upsert_student_audit(StudentAudit {
                collected_dark: 1,
                dark_delta: 0,
                has_discrepancy: false,
                ..audit
            })
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        let rows = store.list_student_audits(5).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].has_discrepancy);
    }
}
