//! Application state shared across views.

use std::sync::Arc;

use khushiv_core::{Product, Quantity};

use crate::admin::AdminDashboard;
use crate::api::{ApiClient, ApiError};
use crate::catalog::SearchDebouncer;
use crate::checkout::Checkout;
use crate::config::ClientConfig;
use crate::navigation::Navigator;
use crate::persistence::PersistentBridge;
use crate::stores::{CartStore, SessionStore};

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and owns the two stores, the
/// backend client and the persistence bridge they share. Views receive it
/// instead of reaching for globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    api: ApiClient,
    bridge: PersistentBridge,
    session: SessionStore,
    cart: CartStore,
    navigator: Arc<dyn Navigator>,
}

impl AppState {
    /// Create the application state and rehydrate both stores.
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration
    /// * `bridge` - Persistence backend for the session and cart
    /// * `navigator` - Receiver of navigation requests
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: ClientConfig,
        bridge: PersistentBridge,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let session = SessionStore::restore(api.clone(), bridge.clone(), Arc::clone(&navigator));
        let cart = CartStore::open(bridge.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                bridge,
                session,
                cart,
                navigator,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn bridge(&self) -> &PersistentBridge {
        &self.inner.bridge
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    /// Checkout over the shared session and cart.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        Checkout::new(
            self.inner.api.clone(),
            self.inner.session.clone(),
            self.inner.cart.clone(),
            Arc::clone(&self.inner.navigator),
            self.inner.config.checkout,
        )
    }

    /// Admin dashboard for the current session.
    #[must_use]
    pub fn admin(&self) -> AdminDashboard {
        AdminDashboard::new(
            self.inner.api.clone(),
            self.inner.session.clone(),
            Arc::clone(&self.inner.navigator),
        )
    }

    /// Debounced product search against the backend.
    #[must_use]
    pub fn product_search(&self) -> SearchDebouncer {
        let api = self.inner.api.clone();
        SearchDebouncer::new(self.inner.config.search.debounce, move |query| {
            let api = api.clone();
            async move { api.list_products(&query).await }
        })
    }

    /// Largest quantity selectable for `product`.
    #[must_use]
    pub fn max_quantity(&self, product: &Product) -> Quantity {
        Quantity::ceiling(
            product.count_in_stock,
            self.inner.config.cart.fallback_max_qty,
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("session", &self.inner.session)
            .field("cart", &self.inner.cart)
            .finish_non_exhaustive()
    }
}
