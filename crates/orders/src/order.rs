//! Order confirmation, status state machine and history snapshot.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use tradelink_core::{
    AddressId, BasketId, ConfirmationId, DomainError, OrderId,
};

/// Order status lifecycle.
///
/// The status-update operation accepts any -> any transition; no transition
/// graph is enforced. What *is* enforced is that entering a terminal status
/// archives the order into history exactly once — the archival side effect is
/// a pure function of the target state, independent of the source state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Paid,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses trigger archival; nothing further happens after them.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Paid => "paid",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderStatus::New),
            "paid" => Ok(OrderStatus::Paid),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer-supplied identity captured at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub last_name: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerInfo {
    pub fn full_name(&self) -> String {
        format!(
            "{} {} {}",
            self.last_name, self.first_name, self.middle_name
        )
    }
}

/// A physical address, deduplicated by customer email: a repeat customer
/// reuses their prior address rather than creating a new row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub city: String,
    pub street: String,
    pub building: String,
    pub office: String,
}

/// Customer identity + address + the basket reference at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub id: ConfirmationId,
    pub basket_id: BasketId,
    pub customer: CustomerInfo,
    pub address_id: AddressId,
}

/// The order's state-machine instance: 1:1 with both a basket and a
/// confirmation, carrying creation time and the mutable status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMeta {
    pub id: OrderId,
    pub basket_id: BasketId,
    pub confirmation_id: ConfirmationId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

/// Immutable snapshot created at most once per order, when it first reaches a
/// terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistory {
    pub order_id: OrderId,
    pub result_price: u64,
    pub final_status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminality() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for s in [
            OrderStatus::New,
            OrderStatus::Paid,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(s.as_str().parse::<OrderStatus>().unwrap(), s);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
