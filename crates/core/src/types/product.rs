//! Products and stock levels.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product, optionally carrying the quantity held in a cart.
///
/// The catalog payload has no `amount` field; it deserializes with
/// `amount = 0` and only becomes a cart line once an amount is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identity.
    pub id: ProductId,
    /// Display title.
    #[serde(alias = "name")]
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Quantity of this product in the cart.
    #[serde(default)]
    pub amount: u32,
}

impl Product {
    /// Return this product with the given cart quantity.
    #[must_use]
    pub fn with_amount(self, amount: u32) -> Self {
        Self { amount, ..self }
    }

    /// Unit price multiplied by the cart quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.amount
    }
}

/// Available inventory for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product the stock level refers to.
    pub id: ProductId,
    /// Units available.
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be covered by this stock level.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}
