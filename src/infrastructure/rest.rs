use crate::domain::menu::MenuItem;
use crate::domain::order::{Order, OrderReference, OrderStatus};
use crate::domain::ports::{MenuCatalog, OrderStore};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Base URL of the hosted row store's REST endpoint,
    /// e.g. `https://<project>.example.co/rest/v1`.
    pub base_url: String,
    /// Service key sent as both `apikey` and bearer token.
    pub api_key: String,
}

/// Hosted row store reached over PostgREST conventions.
///
/// One client serves both ports: `menu_items` reads for the catalog and
/// `orders` writes/reads for checkout, the row filter expressed as an
/// `order_reference=eq.<ref>` query parameter.
#[derive(Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(config: RestStoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{table}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl MenuCatalog for RestStore {
    async fn list_items(&self) -> Result<Vec<MenuItem>> {
        let response = self
            .request(reqwest::Method::GET, "menu_items")
            .query(&[("select", "*"), ("order", "category.asc")])
            .send()
            .await
            .map_err(|e| OrderError::CatalogUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrderError::CatalogUnavailable(format!(
                "store returned {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| OrderError::CatalogUnavailable(e.to_string()))
    }
}

#[async_trait]
impl OrderStore for RestStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, "orders")
            .header("Prefer", "return=minimal")
            .json(&order)
            .send()
            .await
            .map_err(|e| OrderError::OrderPersistenceFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderError::OrderPersistenceFailed(format!(
                "store returned {status}: {body}"
            )));
        }
        Ok(())
    }

    async fn get_by_reference(&self, reference: &OrderReference) -> Result<Option<Order>> {
        let response = self
            .request(reqwest::Method::GET, "orders")
            .query(&[
                ("select", "*"),
                ("order_reference", &format!("eq.{reference}")),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| OrderError::OrderStoreFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrderError::OrderStoreFailed(format!(
                "store returned {status}"
            )));
        }
        let mut rows: Vec<Order> = response
            .json()
            .await
            .map_err(|e| OrderError::OrderStoreFailed(e.to_string()))?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn set_status(&self, reference: &OrderReference, status: OrderStatus) -> Result<bool> {
        let response = self
            .request(reqwest::Method::PATCH, "orders")
            .query(&[("order_reference", &format!("eq.{reference}"))])
            .header("Prefer", "return=representation")
            .json(&json!({ "status": status }))
            .send()
            .await
            .map_err(|e| OrderError::OrderStoreFailed(e.to_string()))?;

        let http_status = response.status();
        if !http_status.is_success() {
            return Err(OrderError::OrderStoreFailed(format!(
                "store returned {http_status}"
            )));
        }
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| OrderError::OrderStoreFailed(e.to_string()))?;
        Ok(!rows.is_empty())
    }
}
