//! Cart store.
//!
//! Owns the shopper's [`Cart`] and mirrors it to the persistence bridge
//! under [`keys::CART_ITEMS`].
//!
//! # Hydration
//!
//! A store starts *unhydrated*. [`CartStore::hydrate`] performs the one-time
//! load of the persisted snapshot; until it has run, mutations stay in memory
//! and are never written through. This keeps an early mutation (or the empty
//! initial cart) from clobbering a non-empty snapshot left by a previous run.
//! [`CartStore::open`] creates and hydrates in one step.

use std::sync::{Arc, Mutex, PoisonError};

use khushiv_core::{Cart, CartLine, Price, Product, ProductId, Quantity};
use tracing::{debug, info, instrument};

use crate::persistence::{PersistentBridge, keys};

/// Shared handle to the cart state.
///
/// Cheaply cloneable; all clones observe and mutate the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    bridge: PersistentBridge,
    state: Mutex<CartState>,
}

#[derive(Default)]
struct CartState {
    cart: Cart,
    hydrated: bool,
}

impl CartStore {
    /// Create an empty, unhydrated store.
    #[must_use]
    pub fn new(bridge: PersistentBridge) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                bridge,
                state: Mutex::new(CartState::default()),
            }),
        }
    }

    /// Create a store and immediately rehydrate it from the bridge.
    #[must_use]
    pub fn open(bridge: PersistentBridge) -> Self {
        let store = Self::new(bridge);
        store.hydrate();
        store
    }

    /// Load the persisted snapshot, once.
    ///
    /// If a valid snapshot exists it replaces the in-memory cart; a missing
    /// or malformed snapshot leaves the in-memory cart as it is (malformed
    /// snapshots are discarded by the bridge). Subsequent calls are no-ops.
    ///
    /// Returns `true` if a snapshot was restored by this call.
    #[instrument(skip(self))]
    pub fn hydrate(&self) -> bool {
        let mut state = self.state();
        if state.hydrated {
            return false;
        }

        let restored = self.inner.bridge.load::<Cart>(keys::CART_ITEMS);
        state.hydrated = true;

        match restored {
            Some(cart) => {
                info!(lines = cart.len(), "Restored persisted cart");
                state.cart = cart;
                true
            }
            None => {
                debug!("No persisted cart");
                false
            }
        }
    }

    /// Whether [`hydrate`](Self::hydrate) has run.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.state().hydrated
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `product` with `qty`, or overwrite the quantity of its line.
    ///
    /// The quantity is not checked against stock here; callers clamp it
    /// with [`Quantity::clamp`] before dispatching.
    #[instrument(skip(self, product), fields(product_id = %product.id, qty = %qty))]
    pub fn add_to_cart(&self, product: &Product, qty: Quantity) {
        self.mutate(|cart| cart.add(product, qty));
    }

    /// Overwrite the quantity of an existing line; `0` removes the line.
    ///
    /// Returns `false` if the product is not in the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn update_quantity(&self, product_id: &ProductId, qty: u32) -> bool {
        self.mutate(|cart| cart.set_quantity(product_id, qty))
    }

    /// Remove the line for `product_id`; no-op if it is absent.
    ///
    /// Returns `true` if a line was removed.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_from_cart(&self, product_id: &ProductId) -> bool {
        self.mutate(|cart| cart.remove(product_id))
    }

    /// Remove every line.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) {
        self.mutate(Cart::clear);
    }

    /// Delete the persisted snapshot without touching the in-memory cart.
    pub fn forget_persisted(&self) {
        self.inner.bridge.remove(keys::CART_ITEMS);
    }

    /// Drop the lines of a placed order that are still unchanged.
    ///
    /// Lines added or re-quantified after `ordered` was taken survive. If
    /// nothing survives the snapshot is removed, otherwise it is rewritten.
    /// Returns the number of lines removed.
    #[instrument(skip(self, ordered), fields(ordered = ordered.len()))]
    pub fn remove_ordered(&self, ordered: &Cart) -> usize {
        let mut state = self.state();
        let removed = state.cart.remove_ordered(ordered);
        if state.cart.is_empty() {
            self.inner.bridge.remove(keys::CART_ITEMS);
        } else if state.hydrated {
            info!(remaining = state.cart.len(), "Cart changed while the order was placed");
            self.inner.bridge.save(keys::CART_ITEMS, &state.cart);
        }
        removed
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Cart total, recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Price {
        self.state().cart.total()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.state().cart.item_count()
    }

    /// Copy of the lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.state().cart.lines().to_vec()
    }

    /// Copy of the whole cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.state().cart.clone()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().cart.is_empty()
    }

    /// Apply `f` to the cart and write the result through once hydrated.
    fn mutate<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut state = self.state();
        let result = f(&mut state.cart);
        if state.hydrated {
            self.inner.bridge.save(keys::CART_ITEMS, &state.cart);
        } else {
            debug!("Cart not hydrated yet, skipping write-through");
        }
        result
    }

    fn state(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("CartStore")
            .field("lines", &state.cart.len())
            .field("hydrated", &state.hydrated)
            .finish()
    }
}
