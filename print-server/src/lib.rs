//! Uniform Print Server - order lifecycle, reconciliation scheduler and
//! garment audit engine for school-uniform print orders
//!
//! # Module layout
//!
//! ```text
//! print-server/src/
//! ├── core/        # config, state, background tasks, HTTP server
//! ├── api/         # HTTP routes and handlers
//! ├── orders/      # order state machine (plan + compare-and-set commit)
//! ├── scheduler/   # sweep jobs and the periodic runner
//! ├── reconcile/   # discrepancy detection and audit reports
//! ├── notify/      # notification sinks (log, webhook)
//! ├── store/       # RecordStore trait, SQLite and in-memory stores
//! ├── db/          # SQLite pool, migrations, repositories
//! └── utils/       # logging, business time zone helpers
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod notify;
pub mod orders;
pub mod reconcile;
pub mod scheduler;
pub mod store;
pub mod utils;

// Re-export public types
pub use core::{BackgroundTasks, Config, Server, ServerState, build_router};
pub use orders::{OrderLifecycle, TransitionError};
pub use reconcile::{AuditPublisher, PublishError, PublishRequest};
pub use scheduler::{Scheduler, SweepJob, SweepReport, SweepRunner};
pub use store::{MemoryStore, RecordStore, SqliteStore, StoreError};
pub use utils::{AppError, AppResult, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and initialise logging from it
pub fn setup_environment() -> Config {
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), Some(&config.log_dir));
    config
}
