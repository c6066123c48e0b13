//! Cart operation errors.
//!
//! Every [`CartStore`](crate::CartStore) mutation returns
//! `Result<_, CartError>`. A failed mutation never touches the in-memory cart
//! or storage.

use std::fmt;

use rocket_shoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// The cart operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add product"),
            Self::Remove => write!(f, "remove product"),
            Self::UpdateAmount => write!(f, "update product amount"),
        }
    }
}

/// Errors returned by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A product or stock lookup failed.
    #[error("Lookup failed during {operation}: {source}")]
    Lookup {
        operation: CartOperation,
        #[source]
        source: CatalogError,
    },

    /// Adding one more unit would exceed available stock.
    #[error("Product {product_id} out of stock: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// No cart line for the product.
    #[error("Product {product_id} is not in the cart ({operation})")]
    NotFound {
        operation: CartOperation,
        product_id: ProductId,
    },

    /// Requested amount is zero or exceeds available stock.
    #[error(
        "Invalid quantity {requested} for product {product_id}{}",
        format_available(.available)
    )]
    InvalidQuantity {
        product_id: ProductId,
        requested: u32,
        /// Stock level, when the check got as far as fetching it.
        available: Option<u32>,
    },

    /// The new cart could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// The operation this error came from, where it is not implied by the variant.
    #[must_use]
    pub const fn operation(&self) -> Option<CartOperation> {
        match self {
            Self::Lookup { operation, .. } | Self::NotFound { operation, .. } => Some(*operation),
            Self::OutOfStock { .. } => Some(CartOperation::Add),
            Self::InvalidQuantity { .. } => Some(CartOperation::UpdateAmount),
            Self::Storage(_) => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn format_available(available: &Option<u32>) -> String {
    available.map_or_else(String::new, |n| format!(" (available {n})"))
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
