//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `KHUSHIV_API_URL` - Backend base URL (default: `http://localhost:5000/api`)
//! - `KHUSHIV_DATA_DIR` - Directory for persisted state (default: `.khushiv`)
//! - `KHUSHIV_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `KHUSHIV_SEARCH_DEBOUNCE_MS` - Quiet period before a search runs (default: 500)
//! - `KHUSHIV_FALLBACK_MAX_QTY` - Quantity ceiling for items without stock data (default: 5)
//! - `KHUSHIV_VERIFY_STOCK` - Re-check live stock before placing an order (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_DATA_DIR: &str = ".khushiv";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_FALLBACK_MAX_QTY: u32 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Directory holding the persisted `user` and `cartItems` blobs
    pub data_dir: PathBuf,
    /// Cart behaviour
    pub cart: CartConfig,
    /// Product search behaviour
    pub search: SearchConfig,
    /// Checkout behaviour
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; always ends with `/` so endpoint paths join beneath it.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Cart configuration.
#[derive(Debug, Clone, Copy)]
pub struct CartConfig {
    /// Largest selectable quantity for items that report no stock.
    pub fallback_max_qty: u32,
}

/// Product search configuration.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Quiet period after the last input before a search is issued.
    pub debounce: Duration,
}

/// Checkout configuration.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
    /// Re-fetch each product and compare stock before submitting an order.
    pub verify_stock: bool,
}

impl ClientConfig {
    /// Default configuration pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            api: ApiConfig {
                base_url: normalize_base_url(base_url),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cart: CartConfig {
                fallback_max_qty: DEFAULT_FALLBACK_MAX_QTY,
            },
            search: SearchConfig {
                debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            },
            checkout: CheckoutConfig { verify_stock: true },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("KHUSHIV_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = Url::parse(&api_url).map_err(|e| invalid("KHUSHIV_API_URL", e))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid("KHUSHIV_API_URL", "scheme must be http or https"));
        }

        let mut config = Self::new(base_url);

        if let Some(dir) = lookup("KHUSHIV_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.api.timeout = Duration::from_secs(parse_or(
            &lookup,
            "KHUSHIV_REQUEST_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        config.search.debounce = Duration::from_millis(parse_or(
            &lookup,
            "KHUSHIV_SEARCH_DEBOUNCE_MS",
            DEFAULT_DEBOUNCE_MS,
        )?);
        config.cart.fallback_max_qty =
            parse_or(&lookup, "KHUSHIV_FALLBACK_MAX_QTY", DEFAULT_FALLBACK_MAX_QTY)?;
        if config.cart.fallback_max_qty == 0 {
            return Err(invalid("KHUSHIV_FALLBACK_MAX_QTY", "must be at least 1"));
        }
        config.checkout.verify_stock = match lookup("KHUSHIV_VERIFY_STOCK") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| invalid("KHUSHIV_VERIFY_STOCK", "expected true or false"))?,
            None => true,
        };
        config.sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());
        config.sentry_environment = lookup("SENTRY_ENVIRONMENT");

        Ok(config)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    lookup(key).map_or(Ok(default), |value| {
        value.trim().parse().map_err(|e: T::Err| invalid(key, e))
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Ensure the base path ends with `/` so `Url::join` appends instead of
/// replacing the last segment (`/api` + `users/login` -> `/api/users/login`).
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
