//! Integration test harness for the KHUSHIV storefront client.
//!
//! [`FakeBackend`] is an in-process axum server that implements the REST
//! contract the client talks to, seeded with a small catalog and two
//! accounts. [`TestApp`] wires an [`AppState`] against it with an in-memory
//! persistence backend and a recording navigator.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p khushiv-integration-tests
//! ```
//!
//! No external services are needed; every test starts its own backend on
//! an ephemeral port.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use khushiv_core::{
    AuthToken, Identity, Order, OrderId, OrderRequest, OrderUser, Price, Product, ProductId,
    UserId,
};
use khushiv_storefront::config::ClientConfig;
use khushiv_storefront::navigation::RecordingNavigator;
use khushiv_storefront::persistence::{KeyValueStore, MemoryStore, PersistentBridge};
use khushiv_storefront::state::AppState;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use url::Url;

// ============================================================================
// Seed data
// ============================================================================

pub const CUSTOMER_EMAIL: &str = "asha@example.com";
pub const CUSTOMER_PASSWORD: &str = "secret123";
pub const ADMIN_EMAIL: &str = "admin@khushiv.in";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Silk saree, $120.00, 5 in stock.
pub const SAREE_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f1";
/// Cotton kurta, $25.50, 10 in stock.
pub const KURTA_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f2";
/// Dupatta, $15.00, out of stock.
pub const DUPATTA_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f3";
/// Bridal lehenga, $1500.00, above the default price filter.
pub const LEHENGA_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f4";

fn seed_product(id: &str, name: &str, cents: i64, stock: u32, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::from_cents(cents),
        image: format!("/images/{id}.jpg"),
        description: format!("{name} from the KHUSHIV collection."),
        brand: "KHUSHIV".to_string(),
        category: category.to_string(),
        count_in_stock: stock,
        rating: 4.5,
        num_reviews: 12,
    }
}

fn seed_products() -> Vec<Product> {
    vec![
        seed_product(SAREE_ID, "Banarasi Silk Saree", 12000, 5, "Sarees"),
        seed_product(KURTA_ID, "Cotton Kurta", 2550, 10, "Kurtas"),
        seed_product(DUPATTA_ID, "Embroidered Dupatta", 1500, 0, "Accessories"),
        seed_product(LEHENGA_ID, "Bridal Lehenga", 150_000, 2, "Lehengas"),
    ]
}

#[derive(Debug, Clone)]
struct Account {
    id: UserId,
    name: String,
    email: String,
    password: String,
    token: String,
    is_admin: bool,
}

impl Account {
    fn identity(&self) -> Identity {
        Identity {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            email: self.email.clone(),
            token: AuthToken::new(&self.token),
            is_admin: self.is_admin,
        }
    }
}

fn seed_accounts() -> Vec<Account> {
    vec![
        Account {
            id: UserId::new("75a1f0c2e4b0a1b2c3d4e501"),
            name: "Asha Rao".to_string(),
            email: CUSTOMER_EMAIL.to_string(),
            password: CUSTOMER_PASSWORD.to_string(),
            token: "customer-token".to_string(),
            is_admin: false,
        },
        Account {
            id: UserId::new("75a1f0c2e4b0a1b2c3d4e502"),
            name: "Store Admin".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            token: "admin-token".to_string(),
            is_admin: true,
        },
    ]
}

// ============================================================================
// Fake backend
// ============================================================================

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "message": message })))
}

#[derive(Default)]
struct Data {
    accounts: Vec<Account>,
    products: Vec<Product>,
    orders: Vec<Order>,
    /// `"<METHOD> <path>"` of every request, oldest first.
    requests: Vec<String>,
    /// Raw `POST /orders` bodies.
    order_bodies: Vec<Value>,
    /// Status and message returned by `POST /orders` instead of succeeding.
    order_failure: Option<(StatusCode, String)>,
    /// When set, login responses wait for this to be notified.
    login_gate: Option<Arc<Notify>>,
    /// When set, `POST /orders` waits for this to be notified.
    order_gate: Option<Arc<Notify>>,
}

struct Backend {
    data: Mutex<Data>,
    login_arrived: Notify,
    order_arrived: Notify,
    next_id: AtomicU64,
}

impl Backend {
    fn data(&self) -> std::sync::MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, request: impl Into<String>) {
        self.data().requests.push(request.into());
    }

    fn new_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}{n:020x}")
    }

    fn account_for(&self, headers: &HeaderMap) -> Result<Account, Failure> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Not authorized, no token"))?;
        self.data()
            .accounts
            .iter()
            .find(|a| a.token == token)
            .cloned()
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Not authorized, token failed"))
    }

    fn admin_for(&self, headers: &HeaderMap) -> Result<Account, Failure> {
        let account = self.account_for(headers)?;
        if account.is_admin {
            Ok(account)
        } else {
            Err(failure(StatusCode::UNAUTHORIZED, "Not authorized as an admin"))
        }
    }
}

type Shared = Arc<Backend>;

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SignupBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductFilter {
    keyword: Option<String>,
    max_price: Option<String>,
}

async fn login(
    State(backend): State<Shared>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Identity>, Failure> {
    backend.record("POST /users/login");
    let gate = backend.data().login_gate.clone();
    backend.login_arrived.notify_one();
    if let Some(gate) = gate {
        gate.notified().await;
    }

    backend
        .data()
        .accounts
        .iter()
        .find(|a| a.email == body.email && a.password == body.password)
        .map(|a| Json(a.identity()))
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid email or password"))
}

async fn signup(
    State(backend): State<Shared>,
    Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<Identity>), Failure> {
    backend.record("POST /users/signup");
    if body.password.len() < 6 {
        return Err(failure(StatusCode::BAD_REQUEST, "Password too short"));
    }
    let id = backend.new_id("7");
    let mut data = backend.data();
    if data.accounts.iter().any(|a| a.email == body.email) {
        return Err(failure(StatusCode::BAD_REQUEST, "User already exists"));
    }
    let account = Account {
        id: UserId::new(id.clone()),
        name: body.name,
        email: body.email,
        password: body.password,
        token: format!("token-{id}"),
        is_admin: false,
    };
    let identity = account.identity();
    data.accounts.push(account);
    Ok((StatusCode::CREATED, Json(identity)))
}

async fn list_products(
    State(backend): State<Shared>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, Failure> {
    backend.record("GET /products");
    let keyword = filter.keyword.unwrap_or_default().to_lowercase();
    let max_price = filter
        .max_price
        .filter(|m| !m.is_empty())
        .map(|m| Decimal::from_str(&m))
        .transpose()
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "Invalid maxPrice"))?;

    let products = backend
        .data()
        .products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&keyword))
        .filter(|p| max_price.is_none_or(|max| p.price.amount() <= max))
        .cloned()
        .collect();
    Ok(Json(products))
}

async fn get_product(
    State(backend): State<Shared>,
    Path(id): Path<String>,
) -> Result<Json<Product>, Failure> {
    backend.record(format!("GET /products/{id}"));
    backend
        .data()
        .products
        .iter()
        .find(|p| p.id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Product not found"))
}

async fn create_product(
    State(backend): State<Shared>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Product>), Failure> {
    backend.record("POST /products");
    backend.admin_for(&headers)?;
    let product = Product {
        id: ProductId::new(backend.new_id("6")),
        name: "Sample name".to_string(),
        price: Price::ZERO,
        image: "/images/sample.jpg".to_string(),
        description: "Sample description".to_string(),
        brand: "Sample brand".to_string(),
        category: "Sample category".to_string(),
        count_in_stock: 0,
        rating: 0.0,
        num_reviews: 0,
    };
    backend.data().products.push(product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn delete_product(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    backend.record(format!("DELETE /products/{id}"));
    backend.admin_for(&headers)?;
    let mut data = backend.data();
    let before = data.products.len();
    data.products.retain(|p| p.id.as_str() != id);
    if data.products.len() == before {
        return Err(failure(StatusCode::NOT_FOUND, "Product not found"));
    }
    Ok(Json(json!({ "message": "Product removed" })))
}

async fn create_order(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Order>), Failure> {
    backend.record("POST /orders");
    let account = backend.account_for(&headers)?;
    backend.data().order_bodies.push(body.clone());
    let gate = backend.data().order_gate.clone();
    backend.order_arrived.notify_one();
    if let Some(gate) = gate {
        gate.notified().await;
    }

    if let Some((status, message)) = backend.data().order_failure.clone() {
        return Err(failure(status, &message));
    }
    let request: OrderRequest = serde_json::from_value(body)
        .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?;
    if request.order_items.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "No order items"));
    }

    let order = Order {
        id: OrderId::new(backend.new_id("8")),
        user: Some(OrderUser {
            id: Some(account.id),
            name: account.name,
        }),
        order_items: request.order_items,
        shipping_address: Some(request.shipping_address),
        total_price: request.total_price,
        is_paid: false,
        is_delivered: false,
        created_at: Utc::now(),
    };
    backend.data().orders.push(order.clone());
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(backend): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, Failure> {
    backend.record("GET /orders");
    backend.admin_for(&headers)?;
    Ok(Json(backend.data().orders.clone()))
}

async fn deliver_order(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Order>, Failure> {
    backend.record(format!("PUT /orders/{id}/deliver"));
    backend.admin_for(&headers)?;
    let mut data = backend.data();
    let order = data
        .orders
        .iter_mut()
        .find(|o| o.id.as_str() == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Order not found"))?;
    order.is_delivered = true;
    Ok(Json(order.clone()))
}

fn router(backend: Shared) -> Router {
    Router::new()
        .route("/api/users/login", post(login))
        .route("/api/users/signup", post(signup))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", get(get_product).delete(delete_product))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}/deliver", put(deliver_order))
        .with_state(backend)
}

/// In-process backend serving the storefront REST contract.
///
/// The server task is aborted when the value is dropped.
pub struct FakeBackend {
    base_url: Url,
    backend: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a seeded backend on an ephemeral localhost port.
    pub async fn start() -> Self {
        let backend = Arc::new(Backend {
            data: Mutex::new(Data {
                accounts: seed_accounts(),
                products: seed_products(),
                ..Data::default()
            }),
            login_arrived: Notify::new(),
            order_arrived: Notify::new(),
            next_id: AtomicU64::new(1),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local address");
        let app = router(Arc::clone(&backend));
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Fake backend crashed");
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/api")).expect("Invalid base URL"),
            backend,
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `"<METHOD> <path>"` of every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.backend.data().requests.clone()
    }

    /// Number of received requests starting with `prefix`.
    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    /// JSON bodies of every `POST /orders`.
    #[must_use]
    pub fn order_bodies(&self) -> Vec<Value> {
        self.backend.data().order_bodies.clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.backend.data().orders.clone()
    }

    #[must_use]
    pub fn product(&self, id: &str) -> Option<Product> {
        self.backend
            .data()
            .products
            .iter()
            .find(|p| p.id.as_str() == id)
            .cloned()
    }

    /// Change the stock of a seeded product.
    pub fn set_stock(&self, id: &str, stock: u32) {
        if let Some(product) = self
            .backend
            .data()
            .products
            .iter_mut()
            .find(|p| p.id.as_str() == id)
        {
            product.count_in_stock = stock;
        }
    }

    /// Make `POST /orders` fail with `status` and `message`.
    pub fn fail_orders(&self, status: StatusCode, message: &str) {
        self.backend.data().order_failure = Some((status, message.to_string()));
    }

    /// Hold login responses until [`release_logins`](Self::release_logins).
    pub fn hold_logins(&self) {
        self.backend.data().login_gate = Some(Arc::new(Notify::new()));
    }

    /// Let a held login respond.
    pub fn release_logins(&self) {
        if let Some(gate) = self.backend.data().login_gate.take() {
            gate.notify_one();
        }
    }

    /// Wait until a login request has reached the backend.
    pub async fn login_arrived(&self) {
        self.backend.login_arrived.notified().await;
    }

    /// Hold order responses until [`release_orders`](Self::release_orders).
    pub fn hold_orders(&self) {
        self.backend.data().order_gate = Some(Arc::new(Notify::new()));
    }

    /// Let a held order respond.
    pub fn release_orders(&self) {
        if let Some(gate) = self.backend.data().order_gate.take() {
            gate.notify_one();
        }
    }

    /// Wait until an order request has reached the backend.
    pub async fn order_arrived(&self) {
        self.backend.order_arrived.notified().await;
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// ============================================================================
// Client harness
// ============================================================================

/// Client state wired against a [`FakeBackend`].
pub struct TestApp {
    pub backend: FakeBackend,
    pub state: AppState,
    pub navigator: Arc<RecordingNavigator>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// Start a backend and a client with empty persistence.
    pub async fn start() -> Self {
        let backend = FakeBackend::start().await;
        let store = Arc::new(MemoryStore::new());
        Self::connect(backend, store)
    }

    /// Client over `backend` and an existing persistence store.
    #[must_use]
    pub fn connect(backend: FakeBackend, store: Arc<MemoryStore>) -> Self {
        let navigator = Arc::new(RecordingNavigator::new());
        let state = AppState::new(
            config_for(&backend),
            PersistentBridge::new(store.clone()),
            navigator.clone(),
        )
        .expect("Failed to build client state");
        Self {
            backend,
            state,
            navigator,
            store,
        }
    }

    /// Simulate an application restart: a fresh client over the same
    /// backend and persisted data.
    #[must_use]
    pub fn restart(self) -> Self {
        Self::connect(self.backend, self.store)
    }

    /// Raw persisted value under `key`.
    #[must_use]
    pub fn persisted(&self, key: &str) -> Option<String> {
        self.store.read(key)
    }

    /// Log in as the seeded customer.
    pub async fn login_customer(&self) -> Identity {
        self.state
            .session()
            .login(CUSTOMER_EMAIL, &SecretString::from(CUSTOMER_PASSWORD.to_string()))
            .await
            .expect("Customer login failed")
    }

    /// Log in as the seeded administrator.
    pub async fn login_admin(&self) -> Identity {
        self.state
            .session()
            .login(ADMIN_EMAIL, &SecretString::from(ADMIN_PASSWORD.to_string()))
            .await
            .expect("Admin login failed")
    }

    /// Fetch a seeded product through the client.
    pub async fn product(&self, id: &str) -> Product {
        self.state
            .api()
            .get_product(&ProductId::new(id))
            .await
            .expect("Failed to fetch product")
    }
}

/// Client configuration pointing at `backend`.
#[must_use]
pub fn config_for(backend: &FakeBackend) -> ClientConfig {
    let mut config = ClientConfig::new(backend.base_url().clone());
    config.api.timeout = std::time::Duration::from_secs(5);
    config
}
