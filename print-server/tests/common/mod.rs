//! Fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use print_server::db::DbService;
use print_server::notify::{NotificationSink, SinkError};
use print_server::{MemoryStore, RecordStore, SqliteStore};
use shared::models::{
    Machine, Notification, NotificationKind, Order, OrderCreate, SchoolClass, Staff, StaffRole,
    StaffTask, Student, TaskStatus,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 2024-06-01 12:00:00 UTC
pub const NOW: i64 = 1_717_243_200_000;

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub async fn sqlite_store() -> Arc<SqliteStore> {
    let db = DbService::new_in_memory().await.expect("in-memory database");
    Arc::new(SqliteStore::new(db.pool))
}

/// File-backed database with the production pool size, for tests that need
/// several connections writing at once
pub async fn file_sqlite_store(dir: &tempfile::TempDir) -> Arc<SqliteStore> {
    let path = dir.path().join("print.db");
    let db = DbService::new(&path.to_string_lossy())
        .await
        .expect("file database");
    Arc::new(SqliteStore::new(db.pool))
}

pub async fn seed_order(store: &dyn RecordStore, submitted_at: Option<i64>) -> Order {
    let create = OrderCreate {
        school_id: 1,
        reference_code: format!("PO-{}", shared::util::snowflake_id()),
        total_students: 2,
        dark_garments: 5,
        light_garments: 4,
        total_amount: 180.0,
        submitted_at,
    };
    store
        .insert_order(create.into_order(submitted_at.unwrap_or(NOW)))
        .await
        .expect("insert order")
}

pub async fn seed_class(store: &dyn RecordStore, order_id: i64, name: &str) -> SchoolClass {
    store
        .insert_class(SchoolClass {
            id: 0,
            order_id,
            name: name.to_string(),
            student_count: 0,
        })
        .await
        .expect("insert class")
}

pub async fn seed_student(
    store: &dyn RecordStore,
    class: &SchoolClass,
    name: &str,
    submitted_dark: i64,
    submitted_light: i64,
) -> Student {
    store
        .insert_student(Student {
            id: 0,
            order_id: class.order_id,
            class_id: class.id,
            name: name.to_string(),
            is_served: false,
            submitted_dark,
            submitted_light,
            collected_dark: None,
            collected_light: None,
            updated_at: NOW,
        })
        .await
        .expect("insert student")
}

pub async fn seed_machine(store: &dyn RecordStore, last_seen_at: i64) -> Machine {
    let id = shared::util::snowflake_id();
    store
        .insert_machine(Machine {
            id,
            device_id: format!("dtf-{id}"),
            name: "DTF printer".to_string(),
            is_online: true,
            is_printing: true,
            active_session: Some(7),
            last_seen_at,
        })
        .await
        .expect("insert machine")
}

pub async fn seed_staff(store: &dyn RecordStore, name: &str, role: StaffRole) -> Staff {
    store
        .insert_staff(Staff {
            id: 0,
            name: name.to_string(),
            role,
            is_active: true,
        })
        .await
        .expect("insert staff")
}

pub async fn seed_task(
    store: &dyn RecordStore,
    staff_id: i64,
    status: TaskStatus,
    assigned_at: i64,
    completed_at: Option<i64>,
) -> StaffTask {
    store
        .insert_staff_task(StaffTask {
            id: 0,
            staff_id,
            order_id: None,
            title: "Print run".to_string(),
            status,
            assigned_at,
            completed_at,
        })
        .await
        .expect("insert task")
}

pub async fn seed_notification(
    store: &dyn RecordStore,
    recipient_id: i64,
    created_at: i64,
) -> Notification {
    store
        .insert_notification(Notification {
            id: 0,
            recipient_id,
            kind: NotificationKind::OrderStatus,
            title: "Order update".to_string(),
            body: "Your order moved forward".to_string(),
            is_read: false,
            is_delivered: false,
            created_at,
            delivered_at: None,
        })
        .await
        .expect("insert notification")
}

/// Sink that records batches and can be switched into failure mode
#[derive(Default)]
pub struct RecordingSink {
    failing: AtomicBool,
    batches: Mutex<Vec<(i64, Vec<i64>)>>,
}

impl RecordingSink {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `(recipient_id, notification ids)` per accepted batch
    pub fn batches(&self) -> Vec<(i64, Vec<i64>)> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(
        &self,
        recipient_id: i64,
        notifications: &[Notification],
    ) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Unavailable("recording sink switched off".into()));
        }
        self.batches
            .lock()
            .push((recipient_id, notifications.iter().map(|n| n.id).collect()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
