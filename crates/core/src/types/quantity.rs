//! Requested quantity of a cart line.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantity was zero.
    #[error("quantity must be at least 1")]
    Zero,
}

/// A positive number of units.
///
/// Zero is unrepresentable: a cart line whose quantity would drop to zero
/// must be removed instead. Deserializing `0` fails, so a persisted snapshot
/// containing a zero quantity is rejected as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] if `n` is zero.
    pub fn new(n: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(n).map(Self).ok_or(QuantityError::Zero)
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Largest quantity a shopper may select for an item.
    ///
    /// Equal to the available stock when the item is in stock, otherwise
    /// the configured `fallback` ceiling (never below one).
    #[must_use]
    pub fn ceiling(stock: u32, fallback: u32) -> Self {
        let max = if stock > 0 { stock } else { fallback };
        Self::new(max).unwrap_or(Self::ONE)
    }

    /// Clamp a requested quantity into `[1, ceiling(stock, fallback)]`.
    #[must_use]
    pub fn clamp(requested: u32, stock: u32, fallback: u32) -> Self {
        let max = Self::ceiling(stock, fallback);
        Self::new(requested.min(max.get())).unwrap_or(Self::ONE)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}
