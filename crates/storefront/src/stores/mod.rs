//! Client-side state containers.
//!
//! - [`SessionStore`] - who the shopper is
//! - [`CartStore`] - what they intend to buy
//!
//! Both are cloneable handles. State lives behind a `std::sync::Mutex` that
//! is never held across an `.await`.

mod cart;
mod session;

pub use cart::CartStore;
pub use session::{SessionError, SessionStatus, SessionStore};
