//! Admin dashboard.
//!
//! Every operation first checks that the current session belongs to an
//! administrator. If it does not, the shopper is sent to [`Route::Home`] and
//! the call fails with [`AdminError::Forbidden`] without reaching the
//! backend.
//!
//! Deleting a product is not confirmed here; asking the operator is the
//! view's job.

pub mod table;

use std::sync::Arc;

use khushiv_core::{AuthToken, Order, OrderId, Product, ProductId};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::navigation::{Navigator, Route};
use crate::stores::SessionStore;

pub use table::{OrderRow, ProductRow, TableColumn, TableRow};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Admin access required")]
    Forbidden,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AdminError {
    /// Message suitable for showing to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Forbidden => "Admin access required.".to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
}

impl DashboardData {
    #[must_use]
    pub fn product_rows(&self) -> Vec<ProductRow> {
        self.products.iter().map(ProductRow::from).collect()
    }

    #[must_use]
    pub fn order_rows(&self) -> Vec<OrderRow> {
        self.orders.iter().map(OrderRow::from).collect()
    }

    /// Orders that can still be marked delivered.
    pub fn awaiting_delivery(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.status().awaiting_delivery())
    }
}

/// Admin operations on behalf of the current session.
#[derive(Clone)]
pub struct AdminDashboard {
    api: ApiClient,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl AdminDashboard {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            session,
            navigator,
        }
    }

    /// Fetch the full catalog and every order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] for non-admins, or the backend error.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<DashboardData, AdminError> {
        let token = self.admin_token()?;
        let (products, orders) = tokio::try_join!(
            self.api.list_all_products(),
            self.api.list_orders(&token),
        )?;
        info!(products = products.len(), orders = orders.len(), "Dashboard loaded");
        Ok(DashboardData { products, orders })
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] for non-admins, or the backend error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminError> {
        let token = self.admin_token()?;
        self.api.delete_product(&token, id).await?;
        info!("Product deleted");
        Ok(())
    }

    /// Create a placeholder product for the operator to edit.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] for non-admins, or the backend error.
    #[instrument(skip(self))]
    pub async fn create_sample_product(&self) -> Result<Product, AdminError> {
        let token = self.admin_token()?;
        let product = self.api.create_sample_product(&token).await?;
        info!(product_id = %product.id, "Sample product created");
        Ok(product)
    }

    /// Mark an order delivered.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] for non-admins, or the backend error.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn mark_delivered(&self, id: &OrderId) -> Result<Order, AdminError> {
        let token = self.admin_token()?;
        let order = self.api.mark_delivered(&token, id).await?;
        info!("Order marked delivered");
        Ok(order)
    }

    fn admin_token(&self) -> Result<AuthToken, AdminError> {
        match self.session.identity() {
            Some(identity) if identity.is_admin => Ok(identity.token),
            other => {
                warn!(authenticated = other.is_some(), "Admin dashboard access denied");
                self.navigator.navigate(Route::Home);
                Err(AdminError::Forbidden)
            }
        }
    }
}
