//! Order placement.
//!
//! [`Checkout::place_order`] turns the current cart into a backend order:
//!
//! 1. Without a session the shopper is sent to login (returning to checkout)
//! 2. An empty cart or a blank address field is rejected locally
//! 3. Optionally, each line is re-checked against live stock
//! 4. `POST /orders` with the shopper's token
//! 5. On success the ordered lines leave the cart (lines changed meanwhile
//!    stay) and the shopper is sent home unless the session changed while
//!    the order was in flight; on failure the cart is left untouched

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use khushiv_core::{AuthToken, Order, OrderRequest, ProductId, ShippingAddress};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::CheckoutConfig;
use crate::navigation::{Navigator, Route};
use crate::stores::{CartStore, SessionStore};

/// Reasons an order could not be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Not logged in")]
    Unauthenticated,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Shipping address is missing {0}")]
    InvalidAddress(&'static str),

    #[error("Only {available} of {name} ({product_id}) in stock, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: u32,
        available: u32,
    },

    /// Another order from this checkout is still being submitted.
    #[error("Order already in progress")]
    InProgress,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please log in to place your order.".to_string(),
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::InvalidAddress(field) => format!("Please fill in the {field} field."),
            Self::InsufficientStock {
                name, available, ..
            } => format!("Only {available} of {name} left in stock."),
            Self::InProgress => "Your order is already being placed.".to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}

/// Places orders from the shared cart on behalf of the current session.
pub struct Checkout {
    api: ApiClient,
    session: SessionStore,
    cart: CartStore,
    navigator: Arc<dyn Navigator>,
    config: CheckoutConfig,
    placing: AtomicBool,
}

impl Checkout {
    #[must_use]
    pub fn new(
        api: ApiClient,
        session: SessionStore,
        cart: CartStore,
        navigator: Arc<dyn Navigator>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            api,
            session,
            cart,
            navigator,
            config,
            placing: AtomicBool::new(false),
        }
    }

    /// Submit the current cart as an order shipped to `address`.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] describing the first check that failed or
    /// the backend error. Nothing is cleared unless the order was created.
    #[instrument(skip(self, address))]
    pub async fn place_order(&self, address: ShippingAddress) -> Result<Order, CheckoutError> {
        let Some(token) = self.session.token() else {
            info!("Checkout requires login");
            self.navigator.navigate(Route::login_then(Route::Checkout));
            return Err(CheckoutError::Unauthenticated);
        };

        let epoch = self.session.epoch();
        let cart = self.cart.snapshot();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let Some(field) = address.first_missing_field() {
            return Err(CheckoutError::InvalidAddress(field));
        }

        if self.placing.swap(true, Ordering::AcqRel) {
            return Err(CheckoutError::InProgress);
        }
        let order = {
            let _placing = PlacingGuard(&self.placing);
            self.submit(&token, OrderRequest::from_cart(&cart, address))
                .await?
        };

        self.cart.remove_ordered(&cart);
        info!(order_id = %order.id, total = %order.total_price, "Order placed");
        if self.session.epoch() == epoch {
            self.navigator.navigate(Route::Home);
        } else {
            debug!("Session changed while the order was placed, not navigating");
        }
        Ok(order)
    }

    async fn submit(
        &self,
        token: &AuthToken,
        request: OrderRequest,
    ) -> Result<Order, CheckoutError> {
        if self.config.verify_stock {
            self.verify_stock(&request).await?;
        }
        self.api.create_order(token, &request).await.map_err(|e| {
            warn!(error = %e, "Order submission failed");
            CheckoutError::Api(e)
        })
    }

    /// Fail if any line asks for more than the live stock.
    async fn verify_stock(&self, request: &OrderRequest) -> Result<(), CheckoutError> {
        for line in &request.order_items {
            let product = self.api.get_product(&line.product_id).await?;
            let requested = line.qty.get();
            if requested > product.count_in_stock {
                warn!(
                    product_id = %line.product_id,
                    requested,
                    available = product.count_in_stock,
                    "Insufficient stock"
                );
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    name: product.name,
                    requested,
                    available: product.count_in_stock,
                });
            }
        }
        Ok(())
    }
}

/// Clears the in-progress flag even if the submitting future is dropped.
struct PlacingGuard<'a>(&'a AtomicBool);

impl Drop for PlacingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
