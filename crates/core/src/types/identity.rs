//! Authenticated session identity.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Bearer token issued by the backend on login/signup.
///
/// Implements `Debug` manually to redact the token value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the raw token for building an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Bearer <token>` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// The logged-in user, as returned by `/users/login` and `/users/signup`.
///
/// This is also the exact shape persisted under the `user` key, so a stored
/// identity can be adopted on startup without contacting the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Backend-issued user id, when the backend includes one.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Display name.
    pub name: String,
    /// Email address as registered with the backend.
    pub email: String,
    /// Authorization token sent as `Authorization: Bearer <token>`.
    pub token: AuthToken,
    /// Whether the user may open the admin dashboard.
    #[serde(default)]
    pub is_admin: bool,
}
