use std::path::Path;
use std::sync::Arc;

use crate::core::Config;
use crate::core::tasks::BackgroundTasks;
use crate::db::DbService;
use crate::notify::{LogSink, NotificationSink, WebhookSink};
use crate::orders::OrderLifecycle;
use crate::reconcile::AuditPublisher;
use crate::scheduler::{Scheduler, SweepRunner};
use crate::store::{RecordStore, SqliteStore};
use crate::utils::{AppError, AppResult};

/// Shared server state
///
/// Every service holds the same `Arc<dyn RecordStore>`; cloning the state is
/// a handful of reference-count bumps.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | Immutable configuration |
/// | store | Record store (SQLite in production) |
/// | lifecycle | Order transitions |
/// | publisher | Student audit publishing |
/// | scheduler | Sweep jobs, also triggerable over HTTP |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub lifecycle: OrderLifecycle,
    pub publisher: AuditPublisher,
    pub scheduler: Scheduler,
}

impl ServerState {
    /// Open the database and wire every service
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!(
                    "Cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let db = DbService::new(&config.database_path).await?;
        let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::new(db.pool));
        let sink = build_sink(config)?;
        Ok(Self::with_store(config.clone(), store, sink))
    }

    /// Wire services over an existing store and sink
    pub fn with_store(
        config: Config,
        store: Arc<dyn RecordStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            lifecycle: OrderLifecycle::new(store.clone()),
            publisher: AuditPublisher::new(store.clone()),
            scheduler: Scheduler::new(store.clone(), sink, config.timezone),
            store,
            config,
        }
    }

    /// Register the periodic sweep runner
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let runner = SweepRunner::new(
            self.scheduler.clone(),
            self.config.sweep_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("sweep_runner", runner.run());
        tasks.log_summary();
    }
}

/// Webhook sink when `NOTIFY_WEBHOOK_URL` is set, otherwise the log sink
pub fn build_sink(config: &Config) -> AppResult<Arc<dyn NotificationSink>> {
    match &config.notify_webhook_url {
        Some(url) => {
            let sink = WebhookSink::new(url.clone(), config.notify_timeout())?;
            tracing::info!(url = %url, "Notifications delivered via webhook");
            Ok(Arc::new(sink))
        }
        None => {
            tracing::info!("No NOTIFY_WEBHOOK_URL set, notifications go to the log");
            Ok(Arc::new(LogSink))
        }
    }
}
