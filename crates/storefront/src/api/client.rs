//! Backend REST client implementation.

use std::sync::Arc;

use khushiv_core::{AuthToken, Identity, Order, OrderId, OrderRequest, Product, ProductId};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{ApiError, parse_error_message};
use crate::catalog::ProductQuery;
use crate::config::ApiConfig;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST backend.
///
/// Cheaply cloneable; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("khushiv-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL all endpoint paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&AuthToken>,
    ) -> Result<RequestBuilder, ApiError> {
        let mut builder = self.inner.client.request(method, self.url(path)?);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }
        Ok(builder)
    }

    /// Send a request and decode a JSON response body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Decode(e)
        })
    }

    /// Send a request and return the response body on success.
    async fn send_raw(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Backend request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = parse_error_message(&body);
            debug!(
                status = %status,
                message = message.as_deref().unwrap_or(""),
                "Backend rejected request"
            );
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Exchange credentials for an identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Identity, ApiError> {
        let body = LoginBody {
            email,
            password: password.expose_secret(),
        };
        let builder = self.request(Method::POST, "users/login", None)?.json(&body);
        self.send(builder).await
    }

    /// Register a new account and receive its identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the registration.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, ApiError> {
        let body = SignupBody {
            name,
            email,
            password: password.expose_secret(),
        };
        let builder = self
            .request(Method::POST, "users/signup", None)?
            .json(&body);
        self.send(builder).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(keyword = %query.keyword))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let mut url = self.url("products")?;
        url.query_pairs_mut()
            .append_pair("keyword", &query.keyword)
            .append_pair("maxPrice", &query.max_price.amount().normalize().to_string());
        let builder = self.inner.client.get(url);
        self.send(builder).await
    }

    /// List the whole catalog without filters (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_all_products(&self) -> Result<Vec<Product>, ApiError> {
        let builder = self.request(Method::GET, "products", None)?;
        self.send(builder).await
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let builder = self.request(Method::GET, &format!("products/{id}"), None)?;
        self.send(builder).await
    }

    /// Create a placeholder product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is not an admin's.
    #[instrument(skip(self, token))]
    pub async fn create_sample_product(&self, token: &AuthToken) -> Result<Product, ApiError> {
        let builder = self
            .request(Method::POST, "products", Some(token))?
            .json(&serde_json::json!({}));
        self.send(builder).await
    }

    /// Delete a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is not an admin's.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &AuthToken, id: &ProductId) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &format!("products/{id}"), Some(token))?;
        self.send_raw(builder).await.map(|_| ())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order for the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the order.
    #[instrument(skip(self, token, order), fields(items = order.order_items.len(), total = %order.total_price))]
    pub async fn create_order(
        &self,
        token: &AuthToken,
        order: &OrderRequest,
    ) -> Result<Order, ApiError> {
        let builder = self
            .request(Method::POST, "orders", Some(token))?
            .json(order);
        self.send(builder).await
    }

    /// List every order (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is not an admin's.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        let builder = self.request(Method::GET, "orders", Some(token))?;
        self.send(builder).await
    }

    /// Mark an order as delivered (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is not an admin's.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn mark_delivered(&self, token: &AuthToken, id: &OrderId) -> Result<Order, ApiError> {
        let builder = self
            .request(Method::PUT, &format!("orders/{id}/deliver"), Some(token))?
            .json(&serde_json::json!({}));
        self.send(builder).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
