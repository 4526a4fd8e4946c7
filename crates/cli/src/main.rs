//! KHUSHIV CLI - browse the catalog, manage a cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! khushiv products --keyword saree
//! khushiv product 65a1f0c2e4b0a1b2c3d4e5f6
//!
//! # Shop
//! khushiv login -e asha@example.com
//! khushiv cart add 65a1f0c2e4b0a1b2c3d4e5f6 --qty 2
//! khushiv checkout --address "12 MG Road" --city Pune --postal-code 411001 --country India
//!
//! # Administer
//! khushiv admin orders
//! ```
//!
//! Session and cart persist between runs under `KHUSHIV_DATA_DIR`.
//!
//! # Commands
//!
//! - `products`, `product`, `search` - Catalog
//! - `cart` - Show and edit the cart
//! - `login`, `signup`, `logout`, `whoami` - Session
//! - `checkout` - Place an order for the cart
//! - `admin` - Dashboard for administrators

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use khushiv_core::ShippingAddress;
use khushiv_storefront::config::ClientConfig;
use khushiv_storefront::error::AppError;
use khushiv_storefront::navigation::RecordingNavigator;
use khushiv_storefront::persistence::{FileStore, PersistentBridge};
use khushiv_storefront::state::AppState;
use rust_decimal::Decimal;

mod commands;
mod output;
mod telemetry;

#[derive(Parser)]
#[command(name = "khushiv")]
#[command(author, version, about = "KHUSHIV storefront CLI")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Search term (matches names case-insensitively)
        #[arg(short, long, default_value = "")]
        keyword: String,

        /// Only show products at or below this price
        #[arg(long)]
        max_price: Option<Decimal>,
    },
    /// Show one product
    Product {
        /// Product ID
        id: String,
    },
    /// Interactive search: one query per line on stdin
    Search {
        /// Only show products at or below this price
        #[arg(long)]
        max_price: Option<Decimal>,
    },
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Place an order for the cart
    Checkout {
        #[arg(long)]
        address: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        postal_code: String,

        #[arg(long)]
        country: String,
    },
    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart (default)
    Show,
    /// Add a product, or replace its quantity
    Add {
        /// Product ID
        id: String,

        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Change the quantity of a line (0 removes it)
    Update {
        /// Product ID
        id: String,

        qty: u32,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Product table
    Products,
    /// Order table
    Orders,
    /// Create a sample product
    CreateProduct,
    /// Delete a product
    DeleteProduct {
        /// Product ID
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Mark an order delivered
    Deliver {
        /// Order ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_tracing(cli.verbose);
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry before tracing so the tracing layer can forward events
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(cli.verbose);

    let navigator = Arc::new(RecordingNavigator::new());
    let bridge = PersistentBridge::new(Arc::new(FileStore::new(config.data_dir.clone())));
    let state = match AppState::new(config, bridge, navigator.clone()) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create HTTP client");
            return ExitCode::FAILURE;
        }
    };

    if let Some(identity) = state.session().identity() {
        telemetry::set_sentry_user(&identity);
    }

    let result = run(cli.command, &state).await;
    output::navigation(&navigator.take());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

const SESSION_EXPIRED_HINT: &str = "Your session has expired. Run `khushiv login` to sign in again.";

fn report(error: &AppError) {
    if error.is_unexpected() {
        let event_id = sentry::capture_error(error);
        tracing::error!(error = %error, sentry_event_id = %event_id, "Command failed");
    } else {
        tracing::debug!(error = %error, "Command failed");
    }
    output::message(&error.user_message());
    if error.is_session_expired() {
        output::message(SESSION_EXPIRED_HINT);
    }
}

async fn run(command: Commands, state: &AppState) -> Result<(), AppError> {
    match command {
        Commands::Products { keyword, max_price } => {
            commands::catalog::list(state, keyword, max_price).await?;
        }
        Commands::Product { id } => commands::catalog::show(state, id).await?,
        Commands::Search { max_price } => commands::catalog::search(state, max_price).await?,
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(state),
            CartAction::Add { id, qty } => commands::cart::add(state, id, qty).await?,
            CartAction::Update { id, qty } => commands::cart::update(state, id, qty)?,
            CartAction::Remove { id } => commands::cart::remove(state, id),
            CartAction::Clear => commands::cart::clear(state),
        },
        Commands::Login { email, password } => {
            commands::account::login(state, &email, password).await?;
        }
        Commands::Signup {
            name,
            email,
            password,
        } => commands::account::signup(state, &name, &email, password).await?,
        Commands::Logout => commands::account::logout(state),
        Commands::Whoami => commands::account::whoami(state),
        Commands::Checkout {
            address,
            city,
            postal_code,
            country,
        } => {
            let address = ShippingAddress {
                address,
                city,
                postal_code,
                country,
            };
            commands::checkout::place_order(state, address).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Products => commands::admin::products(state).await?,
            AdminAction::Orders => commands::admin::orders(state).await?,
            AdminAction::CreateProduct => commands::admin::create_product(state).await?,
            AdminAction::DeleteProduct { id, yes } => {
                commands::admin::delete_product(state, id, yes).await?;
            }
            AdminAction::Deliver { id } => commands::admin::deliver(state, id).await?,
        },
    }
    Ok(())
}
