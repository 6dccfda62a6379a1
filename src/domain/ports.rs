use super::menu::MenuItem;
use super::order::{Order, OrderReference, OrderStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only access to the hosted `menu_items` table.
#[async_trait]
pub trait MenuCatalog: Send + Sync {
    /// Lists all sellable items, ordered by category ascending (ties in
    /// store-defined order).
    async fn list_items(&self) -> Result<Vec<MenuItem>>;
}

/// Access to the hosted `orders` table.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<()>;

    async fn get_by_reference(&self, reference: &OrderReference) -> Result<Option<Order>>;

    /// Unconditionally sets the status of the order matching `reference`.
    ///
    /// Returns whether a row matched. A targeted single-row set rather than
    /// a read-modify-write, so concurrent webhook redeliveries are safe
    /// without locking.
    async fn set_status(&self, reference: &OrderReference, status: OrderStatus) -> Result<bool>;
}

/// One line of a hosted checkout session, already converted to the payment
/// provider's minor currency units.
#[derive(Debug, PartialEq, Clone)]
pub struct SessionLineItem {
    pub name: String,
    pub description: Option<String>,
    pub unit_amount: i64,
    pub quantity: u32,
}

/// Everything the provider needs to host a one-time payment page.
#[derive(Debug, PartialEq, Clone)]
pub struct SessionRequest {
    pub line_items: Vec<SessionLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub order_reference: OrderReference,
    pub user_id: Option<String>,
    pub customer_email: Option<String>,
}

/// Provider response: an opaque session id and the page to redirect to.
#[derive(Debug, PartialEq, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
}

/// A verified, parsed webhook event, stripped of provider wire format.
#[derive(Debug, PartialEq, Clone)]
pub enum PaymentEvent {
    /// The hosted checkout completed; the reference comes from the event's
    /// metadata, never from a user-supplied field. `None` when the provider
    /// delivered a completed session without our metadata attached.
    CheckoutCompleted {
        order_reference: Option<OrderReference>,
    },
    /// Any other event type: acknowledged without processing so the
    /// provider does not retry it.
    Ignored { event_type: String },
}

/// Outbound side of the payment provider integration.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession>;

    /// Verifies the raw payload's authenticity against the signature header
    /// and only then parses it. Verification failures never yield an event.
    fn verify_event(&self, payload: &[u8], signature_header: &str) -> Result<PaymentEvent>;
}

pub type DynMenuCatalog = Arc<dyn MenuCatalog>;
pub type DynOrderStore = Arc<dyn OrderStore>;
pub type DynPaymentGateway = Arc<dyn PaymentGateway>;
