//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! khushiv login -e asha@example.com
//! khushiv signup -n "Asha Rao" -e asha@example.com
//! khushiv whoami
//! khushiv logout
//! ```
//!
//! Without `--password` the password is read from stdin.

use khushiv_storefront::error::Result;
use khushiv_storefront::state::AppState;

use crate::{output, telemetry};

pub async fn login(state: &AppState, email: &str, password: Option<String>) -> Result<()> {
    let password = super::password(password)?;
    let identity = state.session().login(email, &password).await?;
    telemetry::set_sentry_user(&identity);
    output::message(&format!("Welcome back, {}.", identity.name));
    Ok(())
}

pub async fn signup(
    state: &AppState,
    name: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = super::password(password)?;
    let identity = state.session().signup(name, email, &password).await?;
    telemetry::set_sentry_user(&identity);
    output::message(&format!("Welcome, {}.", identity.name));
    Ok(())
}

pub fn logout(state: &AppState) {
    state.session().logout();
    telemetry::clear_sentry_user();
    output::message("Logged out.");
}

pub fn whoami(state: &AppState) {
    output::identity(state.session().identity().as_ref());
}
