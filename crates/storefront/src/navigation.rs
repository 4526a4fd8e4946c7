//! Navigation port.
//!
//! Stores request navigation (to the landing page after login, to the login
//! page after logout or when checkout needs a session) through a
//! [`Navigator`] instead of driving a router themselves. The view layer
//! decides what a route means for it.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use khushiv_core::ProductId;
use tracing::debug;

/// A view the storefront can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login {
        /// Where to go after a successful login.
        redirect: Option<Box<Route>>,
    },
    Signup,
    Products,
    Product(ProductId),
    Cart,
    Checkout,
    Admin,
}

impl Route {
    /// Login page that returns to `route` afterwards.
    #[must_use]
    pub fn login_then(route: Self) -> Self {
        Self::Login {
            redirect: Some(Box::new(route)),
        }
    }

    /// Plain login page.
    #[must_use]
    pub const fn login() -> Self {
        Self::Login { redirect: None }
    }

    fn slug(&self) -> String {
        self.to_string().trim_start_matches('/').to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Login { redirect: None } => f.write_str("/login"),
            Self::Login {
                redirect: Some(next),
            } => write!(f, "/login?redirect={}", next.slug()),
            Self::Signup => f.write_str("/signup"),
            Self::Products => f.write_str("/products"),
            Self::Product(id) => write!(f, "/products/{id}"),
            Self::Cart => f.write_str("/cart"),
            Self::Checkout => f.write_str("/checkout"),
            Self::Admin => f.write_str("/admin"),
        }
    }
}

/// Receives navigation requests from the stores.
pub trait Navigator: Send + Sync {
    /// Request navigation to `route`.
    fn navigate(&self, route: Route);
}

/// [`Navigator`] that records every requested route.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently requested route.
    #[must_use]
    pub fn last(&self) -> Option<Route> {
        self.history().last().cloned()
    }

    /// All requested routes, oldest first.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.history().clone()
    }

    /// Drain the recorded routes.
    pub fn take(&self) -> Vec<Route> {
        std::mem::take(&mut *self.history())
    }

    fn history(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        debug!(route = %route, "Navigation requested");
        self.history().push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.to_string(), "/");
        assert_eq!(Route::login().to_string(), "/login");
        assert_eq!(
            Route::login_then(Route::Checkout).to_string(),
            "/login?redirect=checkout"
        );
        assert_eq!(
            Route::Product(ProductId::new("p1")).to_string(),
            "/products/p1"
        );
    }

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        nav.navigate(Route::Cart);
        nav.navigate(Route::Home);

        assert_eq!(nav.last(), Some(Route::Home));
        assert_eq!(nav.take(), vec![Route::Cart, Route::Home]);
        assert!(nav.routes().is_empty());
    }
}
