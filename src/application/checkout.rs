use crate::domain::cart::Cart;
use crate::domain::menu::{self, ALL_CATEGORIES, MenuItem};
use crate::domain::money;
use crate::domain::order::{Order, OrderReference, OrderStatus};
use crate::domain::ports::{
    DynMenuCatalog, DynOrderStore, DynPaymentGateway, PaymentEvent, SessionLineItem,
    SessionRequest,
};
use crate::error::{OrderError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Checkout-flow knobs that vary per deployment.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Confirmation page the provider redirects back to; the order
    /// reference is appended as a `reference` query parameter.
    pub success_url: String,
    /// Where an abandoned provider session sends the browser.
    pub cancel_url: String,
    /// Store-currency units per one payment-currency unit.
    pub exchange_rate: Decimal,
}

/// Menu as rendered to a visitor. `available` is false when the catalog
/// store could not be reached and the menu degraded to empty.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct MenuView {
    pub items: Vec<MenuItem>,
    pub categories: Vec<String>,
    pub available: bool,
}

/// Result of starting a checkout: the caller navigates the browser to
/// `redirect_url` and later looks the order up by `order_reference`.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CheckoutCreated {
    pub order_reference: OrderReference,
    pub redirect_url: String,
}

/// The main entry point of the ordering core.
///
/// `CheckoutService` orchestrates the catalog read, the pending-order write
/// and the hosted payment session, and reconciles the provider's
/// asynchronous completion events back into order status.
#[derive(Clone)]
pub struct CheckoutService {
    catalog: DynMenuCatalog,
    orders: DynOrderStore,
    gateway: DynPaymentGateway,
    settings: CheckoutSettings,
}

impl CheckoutService {
    pub fn new(
        catalog: DynMenuCatalog,
        orders: DynOrderStore,
        gateway: DynPaymentGateway,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            catalog,
            orders,
            gateway,
            settings,
        }
    }

    /// Loads the menu, optionally filtered by category.
    ///
    /// A catalog failure never escapes: the view degrades to an empty menu
    /// with `available: false` and the condition is logged.
    pub async fn menu(&self, category: Option<&str>) -> MenuView {
        let items = match self.catalog.list_items().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "menu catalog unavailable, serving empty menu");
                return MenuView {
                    items: Vec::new(),
                    categories: Vec::new(),
                    available: false,
                };
            }
        };

        let categories = menu::categories(&items);
        let selected = category.unwrap_or(ALL_CATEGORIES);
        let items = menu::filter_by_category(&items, selected)
            .into_iter()
            .cloned()
            .collect();

        MenuView {
            items,
            categories,
            available: true,
        }
    }

    /// Starts a checkout for a cart snapshot.
    ///
    /// The pending order row is written before the provider is contacted;
    /// if that write fails there are no external side effects. A provider
    /// failure afterwards leaves the pending order behind by design.
    pub async fn create_checkout(
        &self,
        cart: Cart,
        user_id: Option<String>,
        customer_email: Option<String>,
    ) -> Result<CheckoutCreated> {
        if cart.is_empty() {
            return Err(OrderError::InvalidCartState("cart is empty".to_string()));
        }
        if let Some(line) = cart.lines().iter().find(|l| l.item.price < Decimal::ZERO) {
            return Err(OrderError::InvalidCartState(format!(
                "negative price on item {}",
                line.item.id
            )));
        }
        if let Some(line) = cart.lines().iter().find(|l| l.quantity == 0) {
            return Err(OrderError::InvalidCartState(format!(
                "zero quantity on item {}",
                line.item.id
            )));
        }

        let order = Order::pending(cart, user_id, customer_email);
        let reference = order.reference.clone();

        let line_items = order
            .items
            .iter()
            .map(|line| SessionLineItem {
                name: line.item.name.clone(),
                description: line.item.description.clone(),
                unit_amount: money::to_minor_units(line.item.price, self.settings.exchange_rate),
                quantity: line.quantity,
            })
            .collect();
        let request = SessionRequest {
            line_items,
            success_url: format!("{}?reference={}", self.settings.success_url, reference),
            cancel_url: self.settings.cancel_url.clone(),
            order_reference: reference.clone(),
            user_id: order.user_id.clone(),
            customer_email: order.customer_email.clone(),
        };

        self.orders.insert(order).await?;

        let session = match self.gateway.create_session(request).await {
            Ok(session) => session,
            Err(e) => {
                // The pending row stays behind; there is no compensating
                // delete and the caller may retry manually.
                warn!(%reference, error = %e, "payment session failed, order stays pending");
                return Err(e);
            }
        };

        info!(%reference, session_id = %session.session_id, "checkout session created");
        Ok(CheckoutCreated {
            order_reference: reference,
            redirect_url: session.redirect_url,
        })
    }

    /// Reconciles one provider webhook delivery.
    ///
    /// Authenticity is checked before anything else; unauthentic or
    /// unparseable payloads error out unprocessed. Authentic events always
    /// succeed, even when the referenced order cannot be found, because the
    /// provider retries on non-2xx and a permanently missing order must not
    /// cause a retry storm.
    pub async fn handle_payment_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<()> {
        let event = self.gateway.verify_event(payload, signature_header)?;

        match event {
            PaymentEvent::CheckoutCompleted {
                order_reference: Some(reference),
            } => {
                // Unconditional set keyed by reference: redelivering the
                // same event leaves the order paid.
                let matched = self.orders.set_status(&reference, OrderStatus::Paid).await?;
                if matched {
                    info!(%reference, "order marked paid");
                } else {
                    warn!(%reference, "completed checkout for unknown order reference");
                }
            }
            PaymentEvent::CheckoutCompleted {
                order_reference: None,
            } => {
                warn!("completed checkout event carried no order reference");
            }
            PaymentEvent::Ignored { event_type } => {
                debug!(%event_type, "ignoring webhook event type");
            }
        }

        Ok(())
    }

    /// Confirmation-page read. The order may legitimately still be
    /// `pending` when the webhook has not arrived yet.
    pub async fn order_by_reference(&self, reference: &OrderReference) -> Result<Option<Order>> {
        self.orders.get_by_reference(reference).await
    }
}
