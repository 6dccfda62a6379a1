use super::cart::{Cart, CartLine};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// External correlation key for an order.
///
/// Exposed to the client in the success URL and echoed back through the
/// payment provider's event metadata, so it must be URL-safe and
/// collision-resistant rather than sequential. Not the store's row id.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
pub struct OrderReference(String);

impl OrderReference {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderReference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
}

/// A persisted checkout-time snapshot of a cart.
///
/// Created with status `pending` before any payment session exists; the
/// webhook reconciler is the only writer allowed to advance it to `paid`,
/// and that is the only transition.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    #[serde(rename = "order_reference")]
    pub reference: OrderReference,
    pub items: Vec<CartLine>,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Freezes a cart into a new pending order. The snapshot is independent
    /// of the live cart and the total is computed at snapshot time.
    pub fn pending(cart: Cart, user_id: Option<String>, customer_email: Option<String>) -> Self {
        let total = cart.total();
        Self {
            reference: OrderReference::generate(),
            items: cart.into_lines(),
            total,
            status: OrderStatus::Pending,
            customer_email,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::MenuItem;
    use rust_decimal_macros::dec;

    fn cart_with_one_item() -> Cart {
        let mut cart = Cart::new();
        cart.add(&MenuItem {
            id: 1,
            name: "Cachupa".to_string(),
            category: "Main Dishes".to_string(),
            price: dec!(1500),
            description: None,
            popular: true,
            image_url: None,
        });
        cart
    }

    #[test]
    fn test_reference_is_url_safe() {
        let reference = OrderReference::generate();
        assert!(
            reference
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        );
    }

    #[test]
    fn test_references_do_not_collide() {
        let a = OrderReference::generate();
        let b = OrderReference::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_pending_order_snapshots_cart() {
        let order = Order::pending(cart_with_one_item(), None, Some("a@b.cv".to_string()));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, dec!(1500));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.customer_email.as_deref(), Some("a@b.cv"));
    }

    #[test]
    fn test_order_serializes_reference_as_row_key() {
        let order = Order::pending(cart_with_one_item(), None, None);
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json["order_reference"].as_str().unwrap(),
            order.reference.as_str()
        );
        assert_eq!(json["status"], "pending");
        // Snapshotted lines serialize flat, matching the `orders.items` column.
        assert_eq!(json["items"][0]["id"], 1);
        assert_eq!(json["items"][0]["quantity"], 1);
    }
}
