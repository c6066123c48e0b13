//! The cart: an ordered, unique-by-id list of products with quantities.
//!
//! A [`Cart`] is an immutable value. Every transition returns a new cart, so
//! a snapshot handed out earlier never changes underneath its holder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Reasons a list of products cannot form a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCart {
    /// The same product id appears more than once.
    #[error("duplicate cart entry for product {0}")]
    DuplicateProduct(ProductId),
    /// A line holds zero units.
    #[error("cart entry for product {0} has zero amount")]
    ZeroAmount(ProductId),
}

/// Cart line items in display order.
///
/// Serializes as a plain JSON array of products. Deserializing rejects
/// duplicate ids and zero amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Iterate over line items in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.items.iter()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the cart has a line for a product.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity of a product in the cart, zero if absent.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(Product::line_total).sum()
    }

    /// Return a cart holding `product`.
    ///
    /// An existing line with the same id is replaced in place; otherwise the
    /// product is appended.
    #[must_use]
    pub fn with_product(&self, product: Product) -> Self {
        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.id == product.id) {
            Some(existing) => *existing = product,
            None => items.push(product),
        }
        Self { items }
    }

    /// Return a cart without the line for `id`, or `None` if there is no such line.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }

        Some(Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id != id)
                .cloned()
                .collect(),
        })
    }

    /// Return a cart with the line for `id` set to `amount`, or `None` if
    /// there is no such line.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        let existing = self.get(id)?;
        Some(self.with_product(existing.clone().with_amount(amount)))
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<Product>) -> Result<Self, Self::Error> {
        for (index, item) in items.iter().enumerate() {
            if item.amount == 0 {
                return Err(InvalidCart::ZeroAmount(item.id));
            }
            if items.iter().skip(index + 1).any(|other| other.id == item.id) {
                return Err(InvalidCart::DuplicateProduct(item.id));
            }
        }

        Ok(Self { items })
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
