//! Order Model
//!
//! Status machine:
//!
//! ```text
//! pending --pay--> paid --confirm--> confirmed --ship--> shipped --deliver--> delivered
//!    \________________\___________________\_________________\--cancel--> cancelled
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders accept no further transition
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Stock was decremented at confirm and must be returned if cancelled now
    pub const fn restocks_on_cancel(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Shipped)
    }

    /// Edges of the status machine
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Pending, OrderStatus::Paid)
            | (OrderStatus::Paid, OrderStatus::Confirmed)
            | (OrderStatus::Confirmed, OrderStatus::Shipped)
            | (OrderStatus::Shipped, OrderStatus::Delivered) => true,
            (from, OrderStatus::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::invalid_request(format!("unknown order status: {s}"))
                    .with_detail("status", s)
            })
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    /// Sum of `quantity * price_at_moment`, fixed at creation
    pub total_amount: f64,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
}

/// Order line item (price frozen at creation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price_at_moment: f64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

/// One requested line
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// User-facing status update payload (only `cancelled` is accepted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Pagination query for admin order listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_forward_edges() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn test_cancel_edges() {
        for status in OrderStatus::ALL {
            assert_eq!(
                status.can_transition_to(OrderStatus::Cancelled),
                !status.is_terminal(),
                "cancel from {status}"
            );
        }
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_edges() {
        for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_status_strings() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "refunded".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert!("Pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_restocks_on_cancel() {
        assert!(OrderStatus::Confirmed.restocks_on_cancel());
        assert!(OrderStatus::Shipped.restocks_on_cancel());
        assert!(!OrderStatus::Paid.restocks_on_cancel());
        assert!(!OrderStatus::Delivered.restocks_on_cancel());
    }
}
