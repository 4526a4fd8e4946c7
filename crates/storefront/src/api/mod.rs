//! REST client for the storefront backend.
//!
//! # Architecture
//!
//! - Thin `reqwest` wrapper; one method per endpoint, no retry, no caching
//! - Authenticated calls take the caller's [`AuthToken`](khushiv_core::AuthToken)
//!   and send it as `Authorization: Bearer <token>`
//! - Failures are classified into transport errors and backend rejections so
//!   the stores can pick the message shown to the shopper
//!
//! # Endpoints
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | POST | `/users/login` | - |
//! | POST | `/users/signup` | - |
//! | GET | `/products` | - |
//! | GET | `/products?keyword&maxPrice` | - |
//! | GET | `/products/:id` | - |
//! | POST | `/products` | admin |
//! | DELETE | `/products/:id` | admin |
//! | POST | `/orders` | user |
//! | GET | `/orders` | admin |
//! | PUT | `/orders/:id/deliver` | admin |

mod client;

pub use client::ApiClient;

use serde::Deserialize;
use thiserror::Error;

/// Message shown when the backend cannot be reached at all.
pub const TRANSPORT_MESSAGE: &str = "Unable to reach the server. Please try again.";

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure, timeout, or connection refused.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {}", message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        status: u16,
        /// The backend's `message` field, when the body carried one.
        message: Option<String>,
    },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message suitable for showing to the shopper.
    ///
    /// Backend rejections use the backend-supplied message when present;
    /// everything else maps to a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Rejected { status, .. } => format!("Request failed (HTTP {status})"),
            Self::Decode(_) => "Unexpected response from the server.".to_string(),
            Self::Url(_) => "Invalid server address.".to_string(),
        }
    }

    /// HTTP status of a backend rejection.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the token (expired or missing).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

/// Error body returned by the backend (`{"message": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract the `message` field from an error body, if any.
fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}
