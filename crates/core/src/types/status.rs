//! Status enums derived from backend flags.

use serde::{Deserialize, Serialize};

/// Combined payment and delivery status of an order.
///
/// The backend tracks two independent booleans (`isPaid`, `isDelivered`);
/// this folds them into one value for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    DeliveredUnpaid,
    Completed,
}

impl OrderStatus {
    /// Derive from the backend's `isPaid`/`isDelivered` flags.
    #[must_use]
    pub const fn from_flags(is_paid: bool, is_delivered: bool) -> Self {
        match (is_paid, is_delivered) {
            (false, false) => Self::Pending,
            (true, false) => Self::Paid,
            (false, true) => Self::DeliveredUnpaid,
            (true, true) => Self::Completed,
        }
    }

    /// Whether the "mark delivered" action still applies.
    #[must_use]
    pub const fn awaiting_delivery(self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::DeliveredUnpaid => "Delivered (unpaid)",
            Self::Completed => "Completed",
        }
    }
}
