//! Integration tests for Rocket Shoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-shoes-integration-tests
//! ```
//!
//! No external services are needed: the catalog API is served by a local
//! `mockito` server and storage lives in a temporary directory.
//!
//! # Test Categories
//!
//! - `cart_store` - Cart mutations against the HTTP catalog and file storage
//! - `cart_persistence` - Restart round-trips and storage file format

use std::path::Path;

use mockito::{Mock, ServerGuard};
use rocket_shoes_cart::{CartStore, CatalogConfig, DEFAULT_STORAGE_KEY, FileStorage, HttpCatalog};

/// A local catalog API serving `products/{id}` and `stock/{id}`.
pub struct CatalogFixture {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl CatalogFixture {
    /// Start an empty catalog server. Unknown paths answer 501.
    pub async fn start() -> Self {
        Self {
            server: mockito::Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    /// Serve a product and its stock level.
    pub async fn with_product(self, id: i32, title: &str, price: f64, stock: u32) -> Self {
        self.with_product_details(id, title, price)
            .await
            .with_stock(id, stock)
            .await
    }

    /// Serve only product details.
    pub async fn with_product_details(mut self, id: i32, title: &str, price: f64) -> Self {
        let product = serde_json::json!({
            "id": id,
            "title": title,
            "price": price,
            "image": format!("https://rocketseat-cdn.s3.amazonaws.com/{id}.jpg"),
        });
        self.mock_json(&format!("/products/{id}"), 200, &product.to_string())
            .await;
        self
    }

    /// Serve only a stock level.
    pub async fn with_stock(mut self, id: i32, amount: u32) -> Self {
        let stock = serde_json::json!({ "id": id, "amount": amount });
        self.mock_json(&format!("/stock/{id}"), 200, &stock.to_string())
            .await;
        self
    }

    /// Answer `path` with an error status.
    pub async fn with_error(mut self, path: &str, status: usize) -> Self {
        self.mock_json(path, status, r#"{"error": "unavailable"}"#)
            .await;
        self
    }

    /// Catalog client pointed at this server.
    ///
    /// # Errors
    ///
    /// Returns error if the server URL is rejected or the HTTP client fails
    /// to build.
    pub fn catalog(&self) -> Result<HttpCatalog, Box<dyn std::error::Error>> {
        let config = CatalogConfig::new(&self.server.url())?;
        Ok(HttpCatalog::new(&config)?)
    }

    /// Cart store over this server and the storage file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the catalog client cannot be built.
    pub fn store_in(
        &self,
        dir: &Path,
    ) -> Result<CartStore<HttpCatalog, FileStorage>, Box<dyn std::error::Error>> {
        Ok(CartStore::load(self.catalog()?, storage_in(dir), DEFAULT_STORAGE_KEY))
    }

    async fn mock_json(&mut self, path: &str, status: usize, body: &str) {
        let mock = self
            .server
            .mock("GET", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
    }
}

/// File storage inside `dir`.
#[must_use]
pub fn storage_in(dir: &Path) -> FileStorage {
    FileStorage::new(dir.join("storage.json"))
}
