//! The cart store.
//!
//! [`CartStore`] owns the current cart, validates every quantity change
//! against live stock, and writes the full cart to storage before the new
//! state becomes visible. Reads hand out immutable [`Arc<Cart>`] snapshots.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut store = CartStore::load(catalog, storage, DEFAULT_STORAGE_KEY);
//!
//! store.add_product(ProductId::new(1)).await?;
//! store.update_product_amount(UpdateProductAmount {
//!     product_id: ProductId::new(1),
//!     amount: 3,
//! }).await?;
//! store.remove_product(ProductId::new(1))?;
//! ```

use std::sync::Arc;

use rocket_shoes_core::{Cart, Product, ProductId, Stock};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::catalog::Catalog;
use crate::error::{CartError, CartOperation, Result};
use crate::storage::{CartStorage, StorageError};

/// Request to set a cart line to an exact quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: u32,
}

/// Owner of the cart state.
///
/// Mutations take `&mut self`, so two mutations on one store can never
/// interleave.
pub struct CartStore<C, S> {
    catalog: C,
    storage: S,
    key: String,
    cart: Arc<Cart>,
}

impl<C, S> CartStore<C, S>
where
    C: Catalog,
    S: CartStorage,
{
    /// Create a store, loading the cart persisted under `key`.
    ///
    /// A missing, unreadable or unparsable value yields an empty cart.
    pub fn load(catalog: C, storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = read_cart(&storage, &key);

        Self {
            catalog,
            storage,
            key,
            cart: Arc::new(cart),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        Arc::clone(&self.cart)
    }

    /// The catalog used for lookups.
    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The storage the cart is persisted to.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// The storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Add one unit of a product.
    ///
    /// Appends a new line with amount 1, or raises an existing line by one.
    ///
    /// # Errors
    ///
    /// - `CartError::Lookup` if the product or its stock cannot be fetched
    /// - `CartError::OutOfStock` if stock cannot cover the new amount
    /// - `CartError::Storage` if the new cart cannot be persisted
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<Arc<Cart>> {
        let (product, stock) = self.lookup(product_id, CartOperation::Add).await?;

        let requested = self.cart.amount_of(product_id).saturating_add(1);
        if !stock.covers(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let next = self.cart.with_product(product.with_amount(requested));
        self.commit(next)
    }

    /// Remove a product's line entirely.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the cart has no line for the product
    /// - `CartError::Storage` if the new cart cannot be persisted
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&mut self, product_id: ProductId) -> Result<Arc<Cart>> {
        let next = self
            .cart
            .without(product_id)
            .ok_or(CartError::NotFound {
                operation: CartOperation::Remove,
                product_id,
            })?;

        self.commit(next)
    }

    /// Set a product's line to an exact amount.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidQuantity` if `amount` is zero or exceeds stock
    /// - `CartError::Lookup` if the product or its stock cannot be fetched
    /// - `CartError::NotFound` if the cart has no line for the product
    /// - `CartError::Storage` if the new cart cannot be persisted
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(
        &mut self,
        update: UpdateProductAmount,
    ) -> Result<Arc<Cart>> {
        let UpdateProductAmount { product_id, amount } = update;

        if amount < 1 {
            return Err(CartError::InvalidQuantity {
                product_id,
                requested: amount,
                available: None,
            });
        }

        // The product lookup only confirms the product still exists.
        let (_, stock) = self
            .lookup(product_id, CartOperation::UpdateAmount)
            .await?;

        if !stock.covers(amount) {
            return Err(CartError::InvalidQuantity {
                product_id,
                requested: amount,
                available: Some(stock.amount),
            });
        }

        let next = self
            .cart
            .with_amount(product_id, amount)
            .ok_or(CartError::NotFound {
                operation: CartOperation::UpdateAmount,
                product_id,
            })?;

        self.commit(next)
    }

    /// Fetch product details and stock concurrently.
    async fn lookup(
        &self,
        product_id: ProductId,
        operation: CartOperation,
    ) -> Result<(Product, Stock)> {
        tokio::try_join!(
            self.catalog.product(product_id),
            self.catalog.stock(product_id)
        )
        .map_err(|source| CartError::Lookup { operation, source })
    }

    /// Persist `next`, then make it the current cart.
    fn commit(&mut self, next: Cart) -> Result<Arc<Cart>> {
        let serialized = serde_json::to_string(&next).map_err(StorageError::from)?;
        self.storage.set(&self.key, &serialized)?;

        self.cart = Arc::new(next);
        info!(
            lines = self.cart.len(),
            quantity = self.cart.total_quantity(),
            "Cart saved"
        );

        Ok(Arc::clone(&self.cart))
    }
}

/// Read the persisted cart, falling back to an empty one.
fn read_cart<S: CartStorage>(storage: &S, key: &str) -> Cart {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, key = %key, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(error = %e, key = %key, "Stored cart is unparsable, starting empty");
        Cart::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rocket_shoes_core::Price;

    use super::*;
    use crate::catalog::CatalogError;
    use crate::config::DEFAULT_STORAGE_KEY;
    use crate::storage::MemoryStorage;

    // =========================================================================
    // Test doubles
    // =========================================================================

    #[derive(Default)]
    struct StubCatalog {
        stock: Mutex<HashMap<ProductId, u32>>,
        fail_product: Mutex<bool>,
        fail_stock: Mutex<bool>,
        lookups: AtomicUsize,
    }

    impl StubCatalog {
        fn with_stock(levels: &[(i32, u32)]) -> Self {
            let catalog = Self::default();
            for (id, amount) in levels {
                catalog.set_stock(*id, *amount);
            }
            catalog
        }

        fn set_stock(&self, id: i32, amount: u32) {
            self.stock
                .lock()
                .unwrap()
                .insert(ProductId::new(id), amount);
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Catalog for StubCatalog {
        async fn product(&self, id: ProductId) -> std::result::Result<Product, CatalogError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if *self.fail_product.lock().unwrap() {
                return Err(CatalogError::Api {
                    status: 500,
                    message: "unavailable".to_string(),
                });
            }
            Ok(Product {
                id,
                title: format!("Shoe {id}"),
                price: Price::from_cents(13990),
                image: format!("https://example.com/{id}.jpg"),
                amount: 0,
            })
        }

        async fn stock(&self, id: ProductId) -> std::result::Result<Stock, CatalogError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if *self.fail_stock.lock().unwrap() {
                return Err(CatalogError::RateLimited(1));
            }
            self.stock
                .lock()
                .unwrap()
                .get(&id)
                .map(|amount| Stock {
                    id,
                    amount: *amount,
                })
                .ok_or_else(|| CatalogError::NotFound(format!("stock/{id}")))
        }
    }

    struct FailingStorage;

    impl CartStorage for FailingStorage {
        fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
    }

    fn store(levels: &[(i32, u32)]) -> CartStore<StubCatalog, MemoryStorage> {
        CartStore::load(
            StubCatalog::with_stock(levels),
            MemoryStorage::new(),
            DEFAULT_STORAGE_KEY,
        )
    }

    fn pid(id: i32) -> ProductId {
        ProductId::new(id)
    }

    fn amounts(cart: &Cart) -> Vec<(i32, u32)> {
        cart.iter().map(|p| (p.id.as_i32(), p.amount)).collect()
    }

    fn persisted<C: Catalog>(store: &CartStore<C, MemoryStorage>) -> Option<Cart> {
        store
            .storage()
            .get(store.key())
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = store(&[]);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_load_unparsable_value_is_empty() {
        let store = CartStore::load(
            StubCatalog::default(),
            MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "{not a cart"),
            DEFAULT_STORAGE_KEY,
        );
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_load_existing_cart() {
        let raw = r#"[{"id":3,"title":"Runner","price":99.5,"image":"x.jpg","amount":2}]"#;
        let store = CartStore::load(
            StubCatalog::default(),
            MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, raw),
            DEFAULT_STORAGE_KEY,
        );
        assert_eq!(amounts(&store.cart()), vec![(3, 2)]);
    }

    // =========================================================================
    // add_product
    // =========================================================================

    #[tokio::test]
    async fn test_add_new_product() {
        let mut store = store(&[(1, 5)]);

        let cart = store.add_product(pid(1)).await.unwrap();

        assert_eq!(amounts(&cart), vec![(1, 1)]);
        assert_eq!(cart.items()[0].title, "Shoe 1");
        assert_eq!(persisted(&store).unwrap(), *cart);
    }

    #[tokio::test]
    async fn test_add_existing_product_increments() {
        let mut store = store(&[(1, 5), (2, 5)]);

        store.add_product(pid(1)).await.unwrap();
        store.add_product(pid(2)).await.unwrap();
        let cart = store.add_product(pid(1)).await.unwrap();

        assert_eq!(amounts(&cart), vec![(1, 2), (2, 1)]);
    }

    #[tokio::test]
    async fn test_add_out_of_stock() {
        let mut store = store(&[(1, 1)]);
        store.add_product(pid(1)).await.unwrap();
        let before = store.cart();

        let err = store.add_product(pid(1)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::OutOfStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(*store.cart(), *before);
        assert_eq!(persisted(&store).unwrap(), *before);
    }

    #[tokio::test]
    async fn test_add_with_zero_stock() {
        let mut store = store(&[(1, 0)]);

        let err = store.add_product(pid(1)).await.unwrap_err();

        assert!(matches!(err, CartError::OutOfStock { requested: 1, .. }));
        assert!(store.cart().is_empty());
        assert!(persisted(&store).is_none());
    }

    #[tokio::test]
    async fn test_add_lookup_failure() {
        let mut store = store(&[(1, 5)]);
        *store.catalog().fail_product.lock().unwrap() = true;

        let err = store.add_product(pid(1)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::Lookup {
                operation: CartOperation::Add,
                ..
            }
        ));
        assert!(store.cart().is_empty());
        assert!(persisted(&store).is_none());
    }

    #[tokio::test]
    async fn test_add_unknown_stock() {
        let mut store = store(&[]);

        let err = store.add_product(pid(7)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::Lookup {
                source: CatalogError::NotFound(_),
                ..
            }
        ));
    }

    // =========================================================================
    // remove_product
    // =========================================================================

    #[tokio::test]
    async fn test_remove_present_product() {
        let mut store = store(&[(1, 5), (2, 5)]);
        store.add_product(pid(1)).await.unwrap();
        store.add_product(pid(2)).await.unwrap();

        let cart = store.remove_product(pid(1)).unwrap();

        assert_eq!(amounts(&cart), vec![(2, 1)]);
        assert_eq!(persisted(&store).unwrap(), *cart);
    }

    #[tokio::test]
    async fn test_remove_absent_product() {
        let mut store = store(&[(1, 5)]);
        store.add_product(pid(1)).await.unwrap();
        let before = store.cart();

        let err = store.remove_product(pid(9)).unwrap_err();

        assert!(matches!(
            err,
            CartError::NotFound {
                operation: CartOperation::Remove,
                ..
            }
        ));
        assert_eq!(*store.cart(), *before);
    }

    #[test]
    fn test_remove_needs_no_lookups() {
        let mut store = store(&[]);
        assert!(store.remove_product(pid(1)).is_err());
        assert_eq!(store.catalog().lookups(), 0);
    }

    // =========================================================================
    // update_product_amount
    // =========================================================================

    #[tokio::test]
    async fn test_update_amount() {
        let mut store = store(&[(1, 5)]);
        store.add_product(pid(1)).await.unwrap();

        let cart = store
            .update_product_amount(UpdateProductAmount {
                product_id: pid(1),
                amount: 4,
            })
            .await
            .unwrap();

        assert_eq!(amounts(&cart), vec![(1, 4)]);
        assert_eq!(persisted(&store).unwrap(), *cart);
    }

    #[tokio::test]
    async fn test_update_amount_zero() {
        let mut store = store(&[(1, 5)]);
        store.add_product(pid(1)).await.unwrap();
        let lookups = store.catalog().lookups();

        let err = store
            .update_product_amount(UpdateProductAmount {
                product_id: pid(1),
                amount: 0,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CartError::InvalidQuantity {
                requested: 0,
                available: None,
                ..
            }
        ));
        assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
        assert_eq!(store.catalog().lookups(), lookups);
    }

    #[tokio::test]
    async fn test_update_amount_over_stock() {
        let mut store = store(&[(1, 5)]);
        store.add_product(pid(1)).await.unwrap();

        let err = store
            .update_product_amount(UpdateProductAmount {
                product_id: pid(1),
                amount: 6,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CartError::InvalidQuantity {
                requested: 6,
                available: Some(5),
                ..
            }
        ));
        assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_update_amount_absent_line() {
        let mut store = store(&[(1, 5)]);

        let err = store
            .update_product_amount(UpdateProductAmount {
                product_id: pid(1),
                amount: 2,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CartError::NotFound {
                operation: CartOperation::UpdateAmount,
                ..
            }
        ));
        assert!(store.cart().is_empty());
        assert!(persisted(&store).is_none());
    }

    #[tokio::test]
    async fn test_update_amount_stock_lookup_failure() {
        let mut store = store(&[(1, 5)]);
        store.add_product(pid(1)).await.unwrap();
        *store.catalog().fail_stock.lock().unwrap() = true;

        let err = store
            .update_product_amount(UpdateProductAmount {
                product_id: pid(1),
                amount: 2,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CartError::Lookup {
                operation: CartOperation::UpdateAmount,
                source: CatalogError::RateLimited(1),
            }
        ));
        assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_stock_checked_at_mutation_time_only() {
        let mut store = store(&[(1, 5)]);
        store.add_product(pid(1)).await.unwrap();
        store.add_product(pid(1)).await.unwrap();

        // Stock drops below the held amount; the cart keeps it until the next mutation.
        store.catalog().set_stock(1, 1);
        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);

        let err = store.add_product(pid(1)).await.unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { available: 1, .. }));
        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
    }

    // =========================================================================
    // Snapshots and persistence
    // =========================================================================

    #[tokio::test]
    async fn test_snapshots_are_immutable() {
        let mut store = store(&[(1, 5)]);
        store.add_product(pid(1)).await.unwrap();
        let snapshot = store.cart();

        store.add_product(pid(1)).await.unwrap();

        assert_eq!(amounts(&snapshot), vec![(1, 1)]);
        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_state_unchanged() {
        let mut store = CartStore::load(
            StubCatalog::with_stock(&[(1, 5)]),
            FailingStorage,
            DEFAULT_STORAGE_KEY,
        );

        let err = store.add_product(pid(1)).await.unwrap_err();

        assert!(matches!(err, CartError::Storage(StorageError::Io(_))));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_reload_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        let catalog = Arc::new(StubCatalog::with_stock(&[(1, 5), (2, 5), (3, 5)]));

        let mut store = CartStore::load(
            Arc::clone(&catalog),
            Arc::clone(&storage),
            DEFAULT_STORAGE_KEY,
        );
        store.add_product(pid(2)).await.unwrap();
        store.add_product(pid(1)).await.unwrap();
        store.add_product(pid(2)).await.unwrap();
        store.add_product(pid(3)).await.unwrap();
        store.remove_product(pid(1)).unwrap();
        let before = store.cart();
        drop(store);

        let restarted = CartStore::load(catalog, storage, DEFAULT_STORAGE_KEY);
        assert_eq!(amounts(&restarted.cart()), amounts(&before));
        assert_eq!(amounts(&restarted.cart()), vec![(2, 2), (3, 1)]);
    }

    #[tokio::test]
    async fn test_add_add_then_update_over_stock() {
        let mut store = store(&[(1, 5)]);

        let cart = store.add_product(pid(1)).await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 1)]);
        let cart = store.add_product(pid(1)).await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 2)]);

        let result = store
            .update_product_amount(UpdateProductAmount {
                product_id: pid(1),
                amount: 10,
            })
            .await;

        assert!(matches!(result, Err(CartError::InvalidQuantity { .. })));
        assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
    }

    #[test]
    fn test_update_request_serde() {
        let update: UpdateProductAmount =
            serde_json::from_str(r#"{"productId": 1, "amount": 3}"#).unwrap();
        assert_eq!(update.product_id, pid(1));
        assert_eq!(update.amount, 3);
    }
}
