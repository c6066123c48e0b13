//! Catalog lookups: product details and live stock levels.
//!
//! # Architecture
//!
//! - [`Catalog`] is the seam the cart store depends on
//! - [`HttpCatalog`] talks to a REST API (`GET products/{id}`, `GET stock/{id}`)
//! - Product details are cached in memory via `moka`; stock is always fetched
//!   live because it guards every cart mutation
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_shoes_cart::catalog::{Catalog, HttpCatalog};
//!
//! let catalog = HttpCatalog::new(&config.api)?;
//! let product = catalog.product(ProductId::new(1)).await?;
//! let stock = catalog.stock(ProductId::new(1)).await?;
//! ```

mod http;

pub use http::HttpCatalog;

use std::sync::Arc;

use async_trait::async_trait;
use rocket_shoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when looking up catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read-only source of product details and stock levels.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch product details. The returned product has `amount == 0`.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Fetch the current stock level for a product.
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError>;
}

#[async_trait]
impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        (**self).product(id).await
    }

    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        (**self).stock(id).await
    }
}
