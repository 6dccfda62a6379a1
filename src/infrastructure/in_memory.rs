use crate::domain::menu::MenuItem;
use crate::domain::order::{Order, OrderReference, OrderStatus};
use crate::domain::ports::{MenuCatalog, OrderStore};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory menu catalog.
///
/// Serves a fixed item list, sorted by category the way the hosted table
/// would return it. Used for local development and tests; `failing()`
/// builds one that simulates an unreachable store.
#[derive(Default, Clone)]
pub struct InMemoryMenuCatalog {
    items: Vec<MenuItem>,
    unreachable: bool,
}

impl InMemoryMenuCatalog {
    pub fn with_items(mut items: Vec<MenuItem>) -> Self {
        items.sort_by(|a, b| a.category.cmp(&b.category));
        Self {
            items,
            unreachable: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            items: Vec::new(),
            unreachable: true,
        }
    }
}

#[async_trait]
impl MenuCatalog for InMemoryMenuCatalog {
    async fn list_items(&self) -> Result<Vec<MenuItem>> {
        if self.unreachable {
            return Err(OrderError::CatalogUnavailable(
                "simulated store failure".to_string(),
            ));
        }
        Ok(self.items.clone())
    }
}

/// A thread-safe in-memory order store keyed by order reference.
///
/// `Arc<RwLock<HashMap>>` for shared concurrent access, matching how the
/// webhook handler and checkout handler share one store.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderReference, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    pub async fn pending_count(&self) -> usize {
        self.orders
            .read()
            .await
            .values()
            .filter(|o| o.status == OrderStatus::Pending)
            .count()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.reference.clone(), order);
        Ok(())
    }

    async fn get_by_reference(&self, reference: &OrderReference) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(reference).cloned())
    }

    async fn set_status(&self, reference: &OrderReference, status: OrderStatus) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(reference) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
