//! Command implementations.
//!
//! Each command drives the shared [`AppState`](khushiv_storefront::state::AppState)
//! and prints through [`crate::output`].

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;

use std::io::BufRead;

use secrecy::SecretString;

/// Use the password given on the command line, or read one line from stdin.
pub fn password(arg: Option<String>) -> std::io::Result<SecretString> {
    if let Some(password) = arg {
        return Ok(SecretString::from(password));
    }
    crate::output::message("Password:");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_string()))
}
