//! Order status pipeline
//!
//! The status set is closed and the allowed edges live in a static table,
//! so an unknown status or an unlisted edge cannot be expressed.
//!
//! ```text
//! UNSUBMITTED → SUBMITTED → CONFIRMED ──────┐
//!                   ├─────→ AUTO_CONFIRMED ─┤
//!                   └───────────────────────┴→ QUEUED → PICKUP → ONGOING
//!       → DONE → PACKAGING → DELIVERY → COMPLETED
//!
//! any non-terminal ──→ ABORTED
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status, ordered by nominal progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Unsubmitted,
    Submitted,
    Confirmed,
    AutoConfirmed,
    Queued,
    Pickup,
    Ongoing,
    Done,
    Packaging,
    Delivery,
    Completed,
    /// Terminal, reachable from any non-terminal status
    Aborted,
}

/// Forward edges. `ABORTED` is handled separately as a universal edge.
const FORWARD_EDGES: &[(OrderStatus, &[OrderStatus])] = &[
    (OrderStatus::Unsubmitted, &[OrderStatus::Submitted]),
    (
        OrderStatus::Submitted,
        &[
            OrderStatus::Confirmed,
            OrderStatus::AutoConfirmed,
            OrderStatus::Queued,
        ],
    ),
    (OrderStatus::Confirmed, &[OrderStatus::Queued]),
    (OrderStatus::AutoConfirmed, &[OrderStatus::Queued]),
    (OrderStatus::Queued, &[OrderStatus::Pickup]),
    (OrderStatus::Pickup, &[OrderStatus::Ongoing]),
    (OrderStatus::Ongoing, &[OrderStatus::Done]),
    (OrderStatus::Done, &[OrderStatus::Packaging]),
    (OrderStatus::Packaging, &[OrderStatus::Delivery]),
    (OrderStatus::Delivery, &[OrderStatus::Completed]),
    (OrderStatus::Completed, &[]),
    (OrderStatus::Aborted, &[]),
];

impl OrderStatus {
    pub const ALL: [OrderStatus; 12] = [
        OrderStatus::Unsubmitted,
        OrderStatus::Submitted,
        OrderStatus::Confirmed,
        OrderStatus::AutoConfirmed,
        OrderStatus::Queued,
        OrderStatus::Pickup,
        OrderStatus::Ongoing,
        OrderStatus::Done,
        OrderStatus::Packaging,
        OrderStatus::Delivery,
        OrderStatus::Completed,
        OrderStatus::Aborted,
    ];

    /// `COMPLETED` and `ABORTED` accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Aborted)
    }

    /// Forward targets allowed from this status (excluding `ABORTED`)
    pub fn forward_targets(self) -> &'static [OrderStatus] {
        FORWARD_EDGES
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    /// Whether the edge `self → target` is in the table
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == OrderStatus::Aborted || self.forward_targets().contains(&target)
    }

    /// Wire name, e.g. `AUTO_CONFIRMED`
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Unsubmitted => "UNSUBMITTED",
            OrderStatus::Submitted => "SUBMITTED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::AutoConfirmed => "AUTO_CONFIRMED",
            OrderStatus::Queued => "QUEUED",
            OrderStatus::Pickup => "PICKUP",
            OrderStatus::Ongoing => "ONGOING",
            OrderStatus::Done => "DONE",
            OrderStatus::Packaging => "PACKAGING",
            OrderStatus::Delivery => "DELIVERY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
