//! Unified error handling.
//!
//! Each component has its own error enum; `AppError` wraps them for callers
//! that drive several components (the CLI). Every variant resolves to a
//! plain message through [`AppError::user_message`].

use thiserror::Error;

use crate::admin::AdminError;
use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::stores::SessionError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Login or signup failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Order could not be placed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Admin operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// Bad input from the caller.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found locally (e.g. a product that is not in the cart).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Reading local input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
            Self::Session(e) => e.user_message(),
            Self::Checkout(e) => e.user_message(),
            Self::Admin(e) => e.user_message(),
            Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Io(e) => format!("Could not read input: {e}"),
        }
    }

    /// Whether this error points at a bug or a misbehaving backend rather
    /// than ordinary user input, and so is worth reporting.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        if matches!(self, Self::Io(_)) {
            return true;
        }
        match self.api_error() {
            Some(ApiError::Decode(_) | ApiError::Url(_)) => true,
            Some(ApiError::Rejected { status, .. }) => *status >= 500,
            Some(ApiError::Transport(_)) | None => false,
        }
    }

    /// Whether the backend refused the stored token on an authenticated
    /// call, meaning the shopper has to log in again.
    ///
    /// A 401 from login or signup is a credentials problem, not this.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        !matches!(self, Self::Session(_))
            && self.api_error().is_some_and(ApiError::is_unauthorized)
    }

    fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e)
            | Self::Session(SessionError::Api(e))
            | Self::Checkout(CheckoutError::Api(e))
            | Self::Admin(AdminError::Api(e)) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
