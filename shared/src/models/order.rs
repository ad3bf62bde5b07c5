//! Print Order Model

use serde::{Deserialize, Serialize};

use crate::order::OrderStatus;

/// Print order for one school's uniform batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub school_id: i64,
    /// Human-facing reference, e.g. `PO-2024-0012`
    pub reference_code: String,
    pub status: OrderStatus,
    pub total_students: i64,
    pub total_garments: i64,
    pub dark_garments: i64,
    pub light_garments: i64,
    pub total_amount: f64,
    /// Submission time (Unix millis), null while UNSUBMITTED
    pub submitted_at: Option<i64>,
    pub confirmed_at: Option<i64>,
    pub auto_confirmed_at: Option<i64>,
    pub queued_at: Option<i64>,
    pub pickup_at: Option<i64>,
    pub ongoing_at: Option<i64>,
    pub done_at: Option<i64>,
    pub packaging_at: Option<i64>,
    pub delivery_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub aborted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Stamp column recording entry into `status`
    pub fn stamp(&self, status: OrderStatus) -> Option<i64> {
        match status {
            OrderStatus::Unsubmitted => None,
            OrderStatus::Submitted => self.submitted_at,
            OrderStatus::Confirmed => self.confirmed_at,
            OrderStatus::AutoConfirmed => self.auto_confirmed_at,
            OrderStatus::Queued => self.queued_at,
            OrderStatus::Pickup => self.pickup_at,
            OrderStatus::Ongoing => self.ongoing_at,
            OrderStatus::Done => self.done_at,
            OrderStatus::Packaging => self.packaging_at,
            OrderStatus::Delivery => self.delivery_at,
            OrderStatus::Completed => self.completed_at,
            OrderStatus::Aborted => self.aborted_at,
        }
    }

    /// Set the stamp for `status`. No-op for UNSUBMITTED, which has no column.
    pub fn set_stamp(&mut self, status: OrderStatus, at: i64) {
        let slot = match status {
            OrderStatus::Unsubmitted => return,
            OrderStatus::Submitted => &mut self.submitted_at,
            OrderStatus::Confirmed => &mut self.confirmed_at,
            OrderStatus::AutoConfirmed => &mut self.auto_confirmed_at,
            OrderStatus::Queued => &mut self.queued_at,
            OrderStatus::Pickup => &mut self.pickup_at,
            OrderStatus::Ongoing => &mut self.ongoing_at,
            OrderStatus::Done => &mut self.done_at,
            OrderStatus::Packaging => &mut self.packaging_at,
            OrderStatus::Delivery => &mut self.delivery_at,
            OrderStatus::Completed => &mut self.completed_at,
            OrderStatus::Aborted => &mut self.aborted_at,
        };
        *slot = Some(at);
    }

    /// Latest status stamp present on the order
    pub fn latest_stamp(&self) -> Option<i64> {
        OrderStatus::ALL
            .into_iter()
            .filter_map(|status| self.stamp(status))
            .max()
    }
}

/// Largest garment count accepted for a single field from a client
pub const MAX_GARMENT_COUNT: i64 = 100_000;

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub school_id: i64,
    pub reference_code: String,
    #[serde(default)]
    pub total_students: i64,
    #[serde(default)]
    pub dark_garments: i64,
    #[serde(default)]
    pub light_garments: i64,
    #[serde(default)]
    pub total_amount: f64,
    /// Submission time; `None` creates an UNSUBMITTED draft
    pub submitted_at: Option<i64>,
}

impl OrderCreate {
    /// New order record; the store assigns the id when it is `0`
    pub fn into_order(self, now: i64) -> Order {
        let status = if self.submitted_at.is_some() {
            OrderStatus::Submitted
        } else {
            OrderStatus::Unsubmitted
        };
        Order {
            id: 0,
            school_id: self.school_id,
            reference_code: self.reference_code,
            status,
            total_students: self.total_students,
            total_garments: self.dark_garments.saturating_add(self.light_garments),
            dark_garments: self.dark_garments,
            light_garments: self.light_garments,
            total_amount: self.total_amount,
            submitted_at: self.submitted_at,
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
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Order {
        Order {
            id: 1,
            school_id: 1,
            reference_code: "PO-1".into(),
            status: OrderStatus::Submitted,
            total_students: 0,
            total_garments: 0,
            dark_garments: 0,
            light_garments: 0,
            total_amount: 0.0,
            submitted_at: Some(100),
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
            created_at: 100,
            updated_at: 100,
        }
    }

    #[test]
    fn test_set_and_read_stamp() {
        let mut order = blank();
        order.set_stamp(OrderStatus::Queued, 500);
        assert_eq!(order.queued_at, Some(500));
        assert_eq!(order.stamp(OrderStatus::Queued), Some(500));
        assert_eq!(order.latest_stamp(), Some(500));
    }

    #[test]
    fn test_unsubmitted_has_no_stamp() {
        let mut order = blank();
        order.set_stamp(OrderStatus::Unsubmitted, 900);
        assert_eq!(order.latest_stamp(), Some(100));
    }

    #[test]
    fn test_create_without_submission_is_draft() {
        let create = OrderCreate {
            school_id: 7,
            reference_code: "PO-7".into(),
            total_students: 3,
            dark_garments: 4,
            light_garments: 2,
            total_amount: 0.0,
            submitted_at: None,
        };
        let order = create.into_order(1_000);
        assert_eq!(order.status, OrderStatus::Unsubmitted);
        assert_eq!(order.total_garments, 6);
        assert_eq!(order.latest_stamp(), None);
    }
}
