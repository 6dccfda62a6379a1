use crate::application::checkout::CheckoutService;
use crate::domain::cart::{Cart, CartLine};
use crate::domain::menu::MenuItem;
use crate::domain::money::format_amount;
use crate::domain::order::{Order, OrderReference};
use crate::error::OrderError;
use crate::infrastructure::stripe::SIGNATURE_HEADER;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

/// Builds the public router over a shared [`CheckoutService`].
pub fn router(service: CheckoutService) -> Router {
    Router::new()
        .route("/api/menu", get(get_menu))
        .route(
            "/api/checkout",
            post(create_checkout).options(checkout_preflight),
        )
        .route("/api/orders/{reference}", get(get_order))
        .route("/webhooks/payment", post(payment_webhook))
        .with_state(service)
}

/// Permissive CORS, applied to the browser-called checkout endpoint only.
fn cors_headers() -> [(HeaderName, &'static str); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "authorization, x-client-info, apikey, content-type",
        ),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
    ]
}

fn error_status(error: &OrderError) -> StatusCode {
    match error {
        OrderError::InvalidCartState(_)
        | OrderError::InvalidSignature(_)
        | OrderError::EventParse(_) => StatusCode::BAD_REQUEST,
        OrderError::PaymentSessionFailed(_) => StatusCode::BAD_GATEWAY,
        // Catalog failures degrade inside the menu handler and only end up
        // here if a future caller surfaces them directly.
        OrderError::CatalogUnavailable(_)
        | OrderError::OrderPersistenceFailed(_)
        | OrderError::OrderStoreFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(error: &OrderError) -> Json<serde_json::Value> {
    Json(json!({ "error": error.to_string() }))
}

#[derive(Deserialize)]
struct MenuQuery {
    category: Option<String>,
}

#[derive(Serialize)]
struct MenuItemView {
    #[serde(flatten)]
    item: MenuItem,
    display_price: String,
}

#[derive(Serialize)]
struct MenuPayload {
    items: Vec<MenuItemView>,
    categories: Vec<String>,
    available: bool,
}

async fn get_menu(
    State(service): State<CheckoutService>,
    Query(query): Query<MenuQuery>,
) -> Json<MenuPayload> {
    let view = service.menu(query.category.as_deref()).await;
    Json(MenuPayload {
        items: view
            .items
            .into_iter()
            .map(|item| MenuItemView {
                display_price: format_amount(item.price),
                item,
            })
            .collect(),
        categories: view.categories,
        available: view.available,
    })
}

#[derive(Deserialize)]
struct CheckoutRequest {
    items: Vec<CartLine>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
}

async fn checkout_preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, cors_headers())
}

async fn create_checkout(
    State(service): State<CheckoutService>,
    Json(request): Json<CheckoutRequest>,
) -> Response {
    let cart = Cart::from_lines(request.items);
    match service
        .create_checkout(cart, request.user_id, request.customer_email)
        .await
    {
        Ok(created) => (StatusCode::OK, cors_headers(), Json(created)).into_response(),
        Err(e) => (error_status(&e), cors_headers(), error_body(&e)).into_response(),
    }
}

#[derive(Serialize)]
struct OrderView {
    #[serde(flatten)]
    order: Order,
    display_total: String,
}

async fn get_order(
    State(service): State<CheckoutService>,
    Path(reference): Path<String>,
) -> Response {
    let reference = OrderReference::from(reference);
    match service.order_by_reference(&reference).await {
        Ok(Some(order)) => {
            let display_total = format_amount(order.total);
            (
                StatusCode::OK,
                Json(OrderView {
                    order,
                    display_total,
                }),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "order not found" })),
        )
            .into_response(),
        Err(e) => (error_status(&e), error_body(&e)).into_response(),
    }
}

async fn payment_webhook(
    State(service): State<CheckoutService>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // The raw body goes into verification untouched; axum never pre-parses
    // it here.
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!("webhook delivery without {SIGNATURE_HEADER} header");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("missing {SIGNATURE_HEADER} header") })),
        )
            .into_response();
    };

    match service.handle_payment_webhook(&body, signature).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "received": true }))).into_response(),
        Err(e) => (error_status(&e), error_body(&e)).into_response(),
    }
}
