//! Order lifecycle
//!
//! ```text
//! request(target, actor) → plan_transition → commit_transition (CAS + audit)
//!                                                  ↓
//!                                   updated Order | InvalidTransition
//! ```
//!
//! Human requests and scheduler jobs go through the same path; the
//! scheduler passes the system actor.

pub mod error;
pub mod lifecycle;

pub use error::TransitionError;
pub use lifecycle::{
    AUTO_CONFIRMED_ACTION, OrderLifecycle, TransitionCause, TransitionPlan, action_name,
    plan_transition,
};
