//! Repository Module
//!
//! Free-function CRUD per table over a `SqlitePool`. Runtime-checked queries
//! (`query_as::<_, T>`) so the crate builds without a live database.

pub mod audit_log;
pub mod audit_report;
pub mod machine;
pub mod notification;
pub mod order;
pub mod staff;
pub mod student;

pub use crate::store::{StoreError as RepoError, StoreResult as RepoResult};

/// Keep a caller-provided id, or mint a snowflake when the record is new (`0`)
pub(crate) fn ensure_id(id: i64) -> i64 {
    if id == 0 {
        shared::util::snowflake_id()
    } else {
        id
    }
}
