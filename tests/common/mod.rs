use async_trait::async_trait;
use hmac::{Hmac, Mac};
use morabeza::application::checkout::{CheckoutService, CheckoutSettings};
use morabeza::domain::menu::MenuItem;
use morabeza::domain::ports::{CheckoutSession, PaymentEvent, PaymentGateway, SessionRequest};
use morabeza::error::{OrderError, Result};
use morabeza::infrastructure::in_memory::{InMemoryMenuCatalog, InMemoryOrderStore};
use morabeza::infrastructure::stripe::{StripeConfig, StripeGateway};
use rust_decimal_macros::dec;
use sha2::Sha256;
use std::sync::{Arc, Mutex};

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";

pub fn menu_items() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: 1,
            name: "Cachupa Rica".to_string(),
            category: "Main Dishes".to_string(),
            price: dec!(1500),
            description: Some("Slow-cooked corn and bean stew".to_string()),
            popular: true,
            image_url: None,
        },
        MenuItem {
            id: 2,
            name: "Lagosta Grelhada".to_string(),
            category: "Main Dishes".to_string(),
            price: dec!(3000),
            description: None,
            popular: false,
            image_url: None,
        },
        MenuItem {
            id: 3,
            name: "Pudim de Leite".to_string(),
            category: "Desserts".to_string(),
            price: dec!(800),
            description: None,
            popular: false,
            image_url: None,
        },
    ]
}

pub fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    )
}

pub fn signed_header(payload: &[u8]) -> String {
    compute_signature(payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp())
}

pub fn completed_event(reference: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "type": "checkout.session.completed",
        "data": {"object": {"metadata": {"orderReference": reference}}}
    }))
    .expect("event serializes")
}

/// Gateway double: records session requests (optionally failing them) and
/// delegates webhook verification to a real Stripe gateway so signature
/// checks stay end-to-end.
pub struct RecordingGateway {
    pub sessions: Mutex<Vec<SessionRequest>>,
    pub fail_sessions: bool,
    verifier: StripeGateway,
}

impl RecordingGateway {
    pub fn new(fail_sessions: bool) -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(Vec::new()),
            fail_sessions,
            verifier: StripeGateway::new(StripeConfig {
                secret_key: "sk_test_xxx".to_string(),
                webhook_secret: WEBHOOK_SECRET.to_string(),
                api_base: None,
            }),
        })
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().expect("lock poisoned").len()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession> {
        let reference = request.order_reference.clone();
        self.sessions.lock().expect("lock poisoned").push(request);
        if self.fail_sessions {
            return Err(OrderError::PaymentSessionFailed(
                "stubbed provider outage".to_string(),
            ));
        }
        Ok(CheckoutSession {
            session_id: "cs_test_123".to_string(),
            redirect_url: format!("https://checkout.example/pay/{reference}"),
        })
    }

    fn verify_event(&self, payload: &[u8], signature_header: &str) -> Result<PaymentEvent> {
        self.verifier.verify_event(payload, signature_header)
    }
}

pub fn test_settings() -> CheckoutSettings {
    CheckoutSettings {
        success_url: "https://morabeza.cv/success".to_string(),
        cancel_url: "https://morabeza.cv/cart".to_string(),
        exchange_rate: dec!(102.47),
    }
}

pub fn test_service(
    fail_sessions: bool,
) -> (CheckoutService, Arc<InMemoryOrderStore>, Arc<RecordingGateway>) {
    let orders = Arc::new(InMemoryOrderStore::new());
    let gateway = RecordingGateway::new(fail_sessions);
    let service = CheckoutService::new(
        Arc::new(InMemoryMenuCatalog::with_items(menu_items())),
        orders.clone(),
        gateway.clone(),
        test_settings(),
    );
    (service, orders, gateway)
}
