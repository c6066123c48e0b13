//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! rs-cart show
//! rs-cart add 1
//! rs-cart update 1 3
//! rs-cart remove 1
//! ```
//!
//! # Environment Variables
//!
//! - `CART_API_URL` - Catalog API base URL
//! - `CART_STORAGE_PATH` - Storage file (default: .rocketshoes/storage.json)

use rocket_shoes_cart::{
    CartConfig, CartStore, FileStorage, HttpCatalog, Notice, Notifier, TracingNotifier,
    UpdateProductAmount, report,
};
use rocket_shoes_core::{Cart, ProductId};
use tracing::info;

use super::CliError;

type Store = CartStore<HttpCatalog, FileStorage>;

/// Build a store from environment configuration.
fn open_store() -> Result<Store, CliError> {
    let config = CartConfig::from_env()?;
    let catalog = HttpCatalog::new(&config.api)?;
    let storage = FileStorage::new(&config.storage_path);

    info!(path = %storage.path().display(), "Opening cart storage");
    Ok(CartStore::load(catalog, storage, config.storage_key))
}

/// Show the cart.
///
/// Only reads storage; the catalog is never contacted.
pub fn show() -> Result<(), CliError> {
    let store = open_store()?;
    log_cart(&store.cart());
    Ok(())
}

/// Add one unit of a product.
pub async fn add(product_id: ProductId) -> Result<(), CliError> {
    let mut store = open_store()?;
    let cart = report(store.add_product(product_id).await, &TracingNotifier)?;

    TracingNotifier.notify(Notice::success("Product added to cart"));
    log_cart(&cart);
    Ok(())
}

/// Remove a product's line.
pub fn remove(product_id: ProductId) -> Result<(), CliError> {
    let mut store = open_store()?;
    let cart = report(store.remove_product(product_id), &TracingNotifier)?;

    TracingNotifier.notify(Notice::success("Product removed from cart"));
    log_cart(&cart);
    Ok(())
}

/// Set a product's line to an exact amount.
pub async fn update(product_id: ProductId, amount: u32) -> Result<(), CliError> {
    let mut store = open_store()?;
    let update = UpdateProductAmount { product_id, amount };
    let cart = report(store.update_product_amount(update).await, &TracingNotifier)?;

    TracingNotifier.notify(Notice::success("Product amount updated"));
    log_cart(&cart);
    Ok(())
}

fn log_cart(cart: &Cart) {
    if cart.is_empty() {
        TracingNotifier.notify(Notice::info("Your cart is empty"));
        return;
    }

    for item in cart.iter() {
        info!(
            "  #{} {} - {} x {} = {}",
            item.id,
            item.title,
            item.amount,
            item.price,
            item.line_total()
        );
    }
    info!(
        "Items: {} ({} units)  Subtotal: {}",
        cart.len(),
        cart.total_quantity(),
        cart.subtotal()
    );
}
