use crate::application::checkout::CheckoutSettings;
use crate::infrastructure::rest::RestStoreConfig;
use crate::infrastructure::stripe::StripeConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use thiserror::Error;

/// Store-currency units per one payment-currency unit, used when
/// `EXCHANGE_RATE` is not set. Keep this updated based on current rates.
pub const DEFAULT_EXCHANGE_RATE: Decimal = dec!(102.47);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Deployment settings, read from the environment at startup.
///
/// Secrets (`STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET`) and the hosted
/// store coordinates (`STORE_URL`, `STORE_API_KEY`) never travel through
/// CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub stripe: StripeConfig,
    /// When absent, the server falls back to in-memory stores.
    pub store: Option<RestStoreConfig>,
    pub checkout: CheckoutSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let site_url = required("SITE_URL")?;
        let site_url = site_url.trim_end_matches('/');

        let exchange_rate = match env::var("EXCHANGE_RATE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("EXCHANGE_RATE", raw))?,
            Err(_) => DEFAULT_EXCHANGE_RATE,
        };

        let store = match env::var("STORE_URL") {
            Ok(base_url) => Some(RestStoreConfig {
                base_url,
                api_key: required("STORE_API_KEY")?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            stripe: StripeConfig {
                secret_key: required("STRIPE_SECRET_KEY")?,
                webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
                api_base: env::var("STRIPE_API_BASE").ok(),
            },
            store,
            checkout: CheckoutSettings {
                success_url: format!("{site_url}/success"),
                cancel_url: format!("{site_url}/cart"),
                exchange_rate,
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
