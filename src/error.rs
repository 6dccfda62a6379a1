use thiserror::Error;

/// Errors produced by the ordering core.
///
/// Every variant is caught at its originating boundary: catalog failures
/// degrade to an empty menu, checkout failures become an HTTP status, and
/// webhook rejections become a 400 without touching any order.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("menu catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("invalid cart state: {0}")]
    InvalidCartState(String),
    #[error("failed to persist order: {0}")]
    OrderPersistenceFailed(String),
    #[error("order store error: {0}")]
    OrderStoreFailed(String),
    #[error("payment session creation failed: {0}")]
    PaymentSessionFailed(String),
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),
    #[error("malformed webhook event: {0}")]
    EventParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OrderError>;
