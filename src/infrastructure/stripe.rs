use crate::domain::order::OrderReference;
use crate::domain::ports::{CheckoutSession, PaymentEvent, PaymentGateway, SessionRequest};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Event type that advances an order to paid; everything else is ignored.
const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Maximum age of a signed webhook timestamp, guarding against replays.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Overridable for tests; defaults to the public API.
    pub api_base: Option<String>,
}

/// Stripe-hosted checkout integration.
///
/// Creates one-time-payment Checkout Sessions over the REST API and
/// verifies incoming webhook payloads with the `t=<unix>,v1=<hmac>`
/// signature scheme before parsing them.
#[derive(Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: config.secret_key,
            webhook_secret: config.webhook_secret,
            api_base: config
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    fn session_form(request: &SessionRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            (
                "metadata[orderReference]".to_string(),
                request.order_reference.to_string(),
            ),
        ];
        if let Some(user_id) = &request.user_id {
            form.push(("metadata[userId]".to_string(), user_id.clone()));
        }
        if let Some(email) = &request.customer_email {
            form.push(("customer_email".to_string(), email.clone()));
        }
        for (i, line) in request.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                crate::domain::money::PAYMENT_CURRENCY.to_string(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                line.name.clone(),
            ));
            if let Some(description) = &line.description {
                form.push((
                    format!("line_items[{i}][price_data][product_data][description]"),
                    description.clone(),
                ));
            }
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                line.unit_amount.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), line.quantity.to_string()));
        }
        form
    }

    fn verify_signature(&self, payload: &[u8], signature_header: &str) -> Result<()> {
        let mut timestamp: Option<i64> = None;
        let mut signature: Option<Vec<u8>> = None;
        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse().ok(),
                Some(("v1", value)) => signature = hex::decode(value).ok(),
                _ => {}
            }
        }
        let timestamp = timestamp.ok_or_else(|| {
            OrderError::InvalidSignature("missing or malformed timestamp".to_string())
        })?;
        let signature = signature.ok_or_else(|| {
            OrderError::InvalidSignature("missing or malformed v1 signature".to_string())
        })?;

        let age = chrono::Utc::now().timestamp() - timestamp;
        if age.abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(OrderError::InvalidSignature(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| OrderError::InvalidSignature("invalid signing secret".to_string()))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&signature)
            .map_err(|_| OrderError::InvalidSignature("signature mismatch".to_string()))
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: String,
}

#[derive(Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: EventData,
}

#[derive(Deserialize, Default)]
struct EventData {
    #[serde(default)]
    object: EventObject,
}

#[derive(Deserialize, Default)]
struct EventObject {
    #[serde(default)]
    metadata: EventMetadata,
}

#[derive(Deserialize, Default)]
struct EventMetadata {
    #[serde(rename = "orderReference")]
    order_reference: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession> {
        let form = Self::session_form(&request);
        let response = self
            .http
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| OrderError::PaymentSessionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderError::PaymentSessionFailed(format!(
                "provider returned {status}: {body}"
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| OrderError::PaymentSessionFailed(e.to_string()))?;
        Ok(CheckoutSession {
            session_id: session.id,
            redirect_url: session.url,
        })
    }

    fn verify_event(&self, payload: &[u8], signature_header: &str) -> Result<PaymentEvent> {
        self.verify_signature(payload, signature_header)?;

        let event: WebhookEvent = serde_json::from_slice(payload)?;
        if event.event_type == CHECKOUT_COMPLETED {
            Ok(PaymentEvent::CheckoutCompleted {
                order_reference: event
                    .data
                    .object
                    .metadata
                    .order_reference
                    .map(OrderReference::from),
            })
        } else {
            Ok(PaymentEvent::Ignored {
                event_type: event.event_type,
            })
        }
    }
}
